use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{
    error::Error,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpListener},
    time::Duration,
};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::Level;
use url::Url;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use finproxy_server::app::{App, Args};

pub const TEST_API_KEY: &str = "0123456789abcdef0123456789abcdef";
pub const UPSTREAM_PATH: &str = "/api/v3/income-statement/AAPL";

pub mod api;

pub struct TestApp {
    url: Url,
    server: JoinHandle<miette::Result<()>>,
}

#[derive(Error, Debug)]
pub enum TestError {
    #[error("failed to connect to test server: {0}")]
    ConnectError(#[source] reqwest::Error),
    #[error("failed to check test server health")]
    HealthCheckError,
    #[error("failed to parse URL: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("failed to execute request: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("failed to serialize/deserialize JSON: {0}")]
    JSONSerializationError(#[from] serde_json::Error),
}

/// Base URL the test API key is appended to, shaped like a real upstream URL.
pub fn upstream_base_url(upstream: &MockServer) -> String {
    format!("{}{}?period=annual&apikey=", upstream.uri(), UPSTREAM_PATH)
}

/// Serves `records` for requests carrying the test API key.
pub async fn mount_records(upstream: &MockServer, records: Value) {
    Mock::given(method("GET"))
        .and(path(UPSTREAM_PATH))
        .and(query_param("apikey", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(records))
        .expect(1)
        .mount(upstream)
        .await;
}

pub async fn mount_response(upstream: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(UPSTREAM_PATH))
        .respond_with(response)
        .mount(upstream)
        .await;
}

impl TestApp {
    pub async fn start_and_connect(upstream: &MockServer) -> (Self, TestClient) {
        let app = Self::start(upstream_base_url(upstream)).await;
        let client = app.connect().await.unwrap();
        (app, client)
    }

    pub async fn start(upstream_base_url: String) -> Self {
        let port = next_available_port();
        let listen_address = SocketAddr::from(([127, 0, 0, 1], port));

        let app = App::with_args(Args {
            listen_address,
            api_url: Some(upstream_base_url),
            api_key: Some(TEST_API_KEY.to_string()),
            upstream_timeout_secs: Some(5),
            ..Args::default()
        });

        let server = tokio::spawn(async move { app.run().await });

        let url =
            Url::parse(&format!("http://127.0.0.1:{}", port)).expect("failed to generate URL");

        Self { url, server }
    }

    pub async fn connect(&self) -> Result<TestClient, TestError> {
        let mut remaining_tries = 50;
        let client = reqwest::Client::new();

        while remaining_tries > 0 {
            let result = client
                .request(reqwest::Method::GET, self.url.join("/health")?)
                .send()
                .await;
            match result {
                Ok(res) => {
                    if res.text().await?.trim() == "UP" {
                        break;
                    } else {
                        return Err(TestError::HealthCheckError);
                    }
                }
                Err(e) => {
                    if let Some(source) = e.source() {
                        if let Some(hyper_error) = source.downcast_ref::<hyper::Error>() {
                            if hyper_error.is_connect() {
                                tokio::time::sleep(Duration::from_millis(20)).await;
                                remaining_tries -= 1;
                                continue;
                            }
                        }
                    }
                    return Err(TestError::ConnectError(e));
                }
            }
        }

        Ok(TestClient(client, self.url.clone()))
    }
}

pub struct TestClient(reqwest::Client, Url);

pub type TestResult<T> = Result<T, TestError>;

impl TestClient {
    pub fn request(&self, path: &str) -> TestResult<reqwest::RequestBuilder> {
        Ok(self.0.request(reqwest::Method::GET, self.1.join(path)?))
    }

    pub async fn get_response(&self, path: &str) -> TestResult<reqwest::Response> {
        Ok(self.request(path)?.send().await?)
    }

    pub async fn get_string(&self, path: &str) -> TestResult<String> {
        Ok(self.get_response(path).await?.text().await?)
    }

    pub async fn get<RS: DeserializeOwned>(&self, path: &str) -> TestResult<RS> {
        let response = self.get_response(path).await?;
        response
            .error_for_status_ref()
            .map_err(TestError::RequestError)?;
        let bytes = response.bytes().await?;
        if tracing::event_enabled!(Level::DEBUG) {
            tracing::debug!(
                body = String::from_utf8_lossy(&bytes).as_ref(),
                "received response"
            );
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server.abort();
        tracing::trace!("test server on {} stopped", self.url);
    }
}

pub fn next_available_port() -> u16 {
    for _ in 0..10 {
        if let Some(port) = bind_os_available_port() {
            return port;
        }
    }

    panic!("no port available")
}

fn bind_os_available_port() -> Option<u16> {
    TcpListener::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))
        .and_then(|l| l.local_addr())
        .map(|a| a.port())
        .ok()
}
