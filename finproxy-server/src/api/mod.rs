use axum::{
    handler::Handler,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::integrations::upstream::{FetchError, Fetcher};

mod json;

pub mod financial_data;

pub use json::Json;

pub const FINANCIAL_DATA_URI: &str = "/financial-data";
pub const HEALTH_URI: &str = "/health";

#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("upstream error")]
    #[diagnostic(code(finproxy::error::upstream))]
    Upstream(#[from] FetchError),
    #[error("malformed financial data")]
    #[diagnostic(code(finproxy::error::record))]
    Record(#[from] finproxy_core::Error),
}

pub fn build(fetcher: Fetcher) -> Router {
    Router::new()
        .route(FINANCIAL_DATA_URI, get(financial_data::read_all))
        .route(HEALTH_URI, get(health_handler))
        .fallback(not_found_handler.into_service())
        .layer(Extension(fetcher))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health_handler() -> &'static str {
    "UP"
}

async fn not_found_handler(uri: Uri) -> impl IntoResponse {
    json::json_response(
        StatusCode::NOT_FOUND,
        json!({
            "result": "failure",
            "message": "not found",
            "uri": uri.to_string()
        }),
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Upstream(e) => (StatusCode::BAD_GATEWAY, format!("{}: {}", self, e)),
            ApiError::Record(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{}: {}", self, e),
            ),
        };

        tracing::error!(
            status = status.as_u16(),
            err = format!("{:?}", self),
            "{}",
            message
        );

        json::json_response(
            status,
            json!({
                "result": "failure",
                "message": message
            }),
        )
    }
}
