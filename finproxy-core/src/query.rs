use std::collections::HashMap;
use std::num::IntErrorKind;

use crate::record::{FieldError, Record};

pub const START_DATE_PARAM: &str = "startDate";
pub const END_DATE_PARAM: &str = "endDate";
pub const MIN_REVENUE_PARAM: &str = "minRevenue";
pub const MAX_REVENUE_PARAM: &str = "maxRevenue";
pub const MIN_NET_INCOME_PARAM: &str = "minNetIncome";
pub const MAX_NET_INCOME_PARAM: &str = "maxNetIncome";

/// Inclusive range bounds over the date, revenue and net income of a
/// [`Record`]. A bound that is `None` does not constrain its dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_revenue: Option<i64>,
    pub max_revenue: Option<i64>,
    pub min_net_income: Option<i64>,
    pub max_net_income: Option<i64>,
}

impl Query {
    /// Builds a query from decoded URL query parameters.
    ///
    /// The first occurrence of a parameter wins. Empty date bounds and numeric
    /// bounds that do not parse as integers are treated as absent. Integers
    /// outside the `i64` range saturate rather than disappear.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params: HashMap<String, String> = HashMap::new();
        for (name, value) in pairs {
            params
                .entry(name.as_ref().to_string())
                .or_insert_with(|| value.as_ref().to_string());
        }

        let date = |name: &str| params.get(name).filter(|v| !v.is_empty()).cloned();
        let integer = |name: &str| {
            params.get(name).and_then(|v| {
                let bound = parse_bound(v);
                if bound.is_none() {
                    tracing::debug!(param = name, value = v.as_str(), "ignoring non-integer bound");
                }
                bound
            })
        };

        Self {
            start_date: date(START_DATE_PARAM),
            end_date: date(END_DATE_PARAM),
            min_revenue: integer(MIN_REVENUE_PARAM),
            max_revenue: integer(MAX_REVENUE_PARAM),
            min_net_income: integer(MIN_NET_INCOME_PARAM),
            max_net_income: integer(MAX_NET_INCOME_PARAM),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks every bound against `record`, stopping at the first one that
    /// fails. A field is only read when a bound on it is set.
    pub fn matches(&self, record: &Record) -> Result<bool, FieldError> {
        if let Some(start) = &self.start_date {
            if record.date()? < start.as_str() {
                return Ok(false);
            }
        }
        if let Some(end) = &self.end_date {
            if record.date()? > end.as_str() {
                return Ok(false);
            }
        }
        if !within(|| record.revenue(), self.min_revenue, self.max_revenue)? {
            return Ok(false);
        }
        within(
            || record.net_income(),
            self.min_net_income,
            self.max_net_income,
        )
    }
}

fn parse_bound(value: &str) -> Option<i64> {
    match value.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

fn within<F>(value: F, min: Option<i64>, max: Option<i64>) -> Result<bool, FieldError>
where
    F: Fn() -> Result<i64, FieldError>,
{
    if let Some(min) = min {
        if value()? < min {
            return Ok(false);
        }
    }
    if let Some(max) = max {
        if value()? > max {
            return Ok(false);
        }
    }
    Ok(true)
}
