use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const DATE_FIELD: &str = "date";
pub const REVENUE_FIELD: &str = "revenue";
pub const NET_INCOME_FIELD: &str = "netIncome";

/// One reporting period for an entity, as returned by the upstream API.
///
/// Only `date`, `revenue` and `netIncome` are ever read. Every other field is
/// carried through verbatim, in the order the upstream sent it, so that the
/// proxy never imposes a schema the upstream may not follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("missing `{0}` field")]
    Missing(&'static str),
    #[error("`{field}` field is not {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

impl Record {
    /// Reporting date, compared as a plain string.
    pub fn date(&self) -> Result<&str, FieldError> {
        self.field(DATE_FIELD)?
            .as_str()
            .ok_or(FieldError::WrongType {
                field: DATE_FIELD,
                expected: "a string",
            })
    }

    pub fn revenue(&self) -> Result<i64, FieldError> {
        self.integer(REVENUE_FIELD)
    }

    pub fn net_income(&self) -> Result<i64, FieldError> {
        self.integer(NET_INCOME_FIELD)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    fn field(&self, name: &'static str) -> Result<&Value, FieldError> {
        self.0.get(name).ok_or(FieldError::Missing(name))
    }

    fn integer(&self, name: &'static str) -> Result<i64, FieldError> {
        self.field(name)?.as_i64().ok_or(FieldError::WrongType {
            field: name,
            expected: "an integer",
        })
    }
}
