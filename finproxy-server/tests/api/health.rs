use reqwest::StatusCode;
use serde_json::Value;
use wiremock::MockServer;

use crate::TestApp;

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn health_check() {
    let upstream = MockServer::start().await;
    let (_app, client) = TestApp::start_and_connect(&upstream).await;

    let response = client
        .get_string("/health")
        .await
        .expect("failed to perform health check");

    assert_eq!("UP", response);
}

#[test_log::test(tokio::test(flavor = "multi_thread"))]
pub async fn unknown_path_is_not_found() {
    let upstream = MockServer::start().await;
    let (_app, client) = TestApp::start_and_connect(&upstream).await;

    let response = client
        .get_response("/financial-data/AAPL")
        .await
        .expect("failed to send request");

    assert_eq!(StatusCode::NOT_FOUND, response.status());
    let body: Value = response.json().await.unwrap();
    assert_eq!("failure", body["result"]);
    assert_eq!("not found", body["message"]);
}
