use std::time::Duration;

use finproxy_core::Record;
use miette::Diagnostic;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::mask;

pub type Result<T> = miette::Result<T, FetchError>;

pub const API_URL_ENV: &str = "API_URL";
pub const API_KEY_ENV: &str = "API_KEY";

/// Where the financial data comes from. Built once at startup.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Option<Duration>,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The request URL: the base URL with the API key appended as-is.
    pub fn url(&self) -> std::result::Result<Url, url::ParseError> {
        format!("{}{}", self.base_url, self.api_key).parse()
    }

    pub fn masked_url(&self) -> String {
        mask::upstream_url(&self.base_url, &self.api_key)
    }
}

#[derive(Clone)]
pub struct Fetcher {
    url: Url,
    masked_url: String,
    client: reqwest::Client,
}

#[derive(Error, Diagnostic, Debug)]
pub enum FetchError {
    #[error("failed to create HTTP client: {0}")]
    #[diagnostic(code(finproxy::upstream::client))]
    ClientBuildError(reqwest::Error),
    #[error("failed to parse upstream URL: {0}")]
    #[diagnostic(code(finproxy::config::invalid))]
    UrlParsingError(url::ParseError),
    #[error("failed to execute upstream request: {0}")]
    #[diagnostic(code(finproxy::upstream::request))]
    RequestError(reqwest::Error),
    #[error("failed to parse upstream response: {0}")]
    #[diagnostic(code(finproxy::upstream::response))]
    ResponseParseError(serde_json::Error),
}

impl Fetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let url = config.url().map_err(FetchError::UrlParsingError)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::ClientBuildError)?;

        Ok(Self {
            url,
            masked_url: config.masked_url(),
            client,
        })
    }

    /// Fetches every record the upstream has. A response other than
    /// `200 OK` yields no records rather than an error.
    pub async fn fetch(&self) -> Result<Vec<Record>> {
        tracing::debug!(url = self.masked_url.as_str(), "fetching financial data");

        // reqwest errors carry the request URL, which contains the API key.
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| FetchError::RequestError(e.without_url()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            tracing::warn!(
                url = self.masked_url.as_str(),
                status = status.as_u16(),
                "upstream did not return financial data"
            );
            return Ok(Vec::new());
        }

        let response_body_bytes = resp
            .bytes()
            .await
            .map_err(|e| FetchError::RequestError(e.without_url()))?;

        let records: Vec<Record> = serde_json::from_slice(&response_body_bytes)
            .map_err(FetchError::ResponseParseError)?;

        tracing::debug!(count = records.len(), "financial data received");

        Ok(records)
    }
}
