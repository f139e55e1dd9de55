//! Mock Sight service built on wiremock

use std::time::Duration;

use serde_json::Value;
use sight::{ClientConfig, SightClient};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::API_KEY;

/// Path the initial request is POSTed to
pub const SUBMIT_PATH: &str = "/api/sight/";
/// Path of the polling resource handed out by the mock
pub const POLL_PATH: &str = "/api/sight/poll/job-1";

/// Client pointed at the mock with a short poll interval
pub fn client_for(server: &MockServer) -> SightClient {
    let config = ClientConfig {
        endpoint: format!("{}{}", server.uri(), SUBMIT_PATH),
        poll_interval: Duration::from_millis(10),
        ..Default::default()
    };
    SightClient::with_config(API_KEY, config).expect("Failed to create client")
}

/// Answer the initial POST with `status` and `body`
pub async fn mount_submit(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .and(header("Authorization", format!("Basic {API_KEY}").as_str()))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Answer the initial POST with a polling handle
pub async fn mount_async_submit(server: &MockServer) {
    let body = serde_json::json!({ "PollingURL": format!("{}{}", server.uri(), POLL_PATH) });
    mount_submit(server, 200, body).await;
}

/// Queue one poll reply; replies are served in the order they are mounted
pub async fn mount_poll_once(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .and(header("Authorization", format!("Basic {API_KEY}").as_str()))
        .respond_with(response)
        .up_to_n_times(1)
        .mount(server)
        .await;
}

/// Serve `response` for every poll not matched by a queued reply
pub async fn mount_poll_fallback(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(response)
        .with_priority(10)
        .mount(server)
        .await;
}

/// Number of GET requests the mock has received for the polling resource
pub async fn poll_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "GET" && r.url.path() == POLL_PATH)
        .count()
}
