use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::{FromRequest, RequestParts};
use axum::Extension;
use finproxy_core::{Query, Record};
use url::form_urlencoded;

use crate::api::{ApiError, Json};
use crate::integrations::upstream::Fetcher;

/// Range bounds taken from the request's query string.
///
/// Never rejects: a bound that cannot be parsed is treated as absent, so a
/// malformed query string filters less rather than failing the request.
#[derive(Debug, Clone, Default)]
pub struct FinancialDataQuery(pub Query);

#[async_trait]
impl<B> FromRequest<B> for FinancialDataQuery
where
    B: Send,
{
    type Rejection = Infallible;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let raw = req.uri().query().unwrap_or_default();
        Ok(Self(Query::from_pairs(form_urlencoded::parse(
            raw.as_bytes(),
        ))))
    }
}

/// Handler for `GET /financial-data`
pub async fn read_all(
    FinancialDataQuery(query): FinancialDataQuery,
    Extension(fetcher): Extension<Fetcher>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let records = fetcher.fetch().await?;
    let total = records.len();

    let records = finproxy_core::apply(records, &query)?;

    tracing::debug!(
        total = total,
        matched = records.len(),
        query = ?query,
        "financial data filtered"
    );

    Ok(records.into())
}
