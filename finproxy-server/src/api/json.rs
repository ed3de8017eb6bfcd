use axum::body::{boxed, Full};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use hyper::header::CONTENT_TYPE;
use mime_guess::mime;
use serde::Serialize;
use serde_json::Value;

/// JSON response body. Serialization failures become a plain-text 500 rather
/// than a panic.
pub struct Json<T>(pub T);

impl<T> From<T> for Json<T> {
    fn from(inner: T) -> Self {
        Self(inner)
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.0) {
            Ok(bytes) => (
                [(
                    CONTENT_TYPE,
                    HeaderValue::from_static(mime::APPLICATION_JSON.as_ref()),
                )],
                bytes,
            )
                .into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(
                    CONTENT_TYPE,
                    HeaderValue::from_static(mime::TEXT_PLAIN_UTF_8.as_ref()),
                )],
                err.to_string(),
            )
                .into_response(),
        }
    }
}

pub(crate) fn json_response(status: StatusCode, body: Value) -> Response {
    match serde_json::to_vec(&body) {
        Ok(buf) => Response::builder()
            .status(status)
            .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(boxed(Full::from(buf)))
            .unwrap_or_else(|_| status.into_response()),
        Err(_) => status.into_response(),
    }
}
