//! Integration tests using WireMock
//!
//! These tests run the client against a mock HTTP server and cover the full
//! request/response cycle: URL building, payload encoding, authentication,
//! error classification and the conversion job lifecycle.

mod convert;
mod dispatcher;

use integrations_doccloud::{DocCloudClient, Protocol};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

/// Access token used by every test client.
pub const TEST_TOKEN: &str = "dc_test_token";

/// Helper to start a mock server
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Helper to create a client whose endpoint is the mock server
pub fn client_for(server: &MockServer) -> DocCloudClient {
    DocCloudClient::builder()
        .access_token(TEST_TOKEN)
        .endpoint(server.address().to_string())
        .protocol(Protocol::Http)
        .build()
        .expect("Failed to build client")
}

/// Protocol-relative URL on the mock server, as the service returns them
pub fn service_url(server: &MockServer, path: &str) -> String {
    format!("//{}{}", server.address(), path)
}

/// Helper to create an authenticated mock
pub fn mock_with_auth(path_matcher: &str, method_matcher: &str) -> MockBuilder {
    Mock::given(method(method_matcher))
        .and(path(path_matcher))
        .and(header("Authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
}

/// Helper to create error response templates
pub fn error_response(status: u16, error_body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(error_body)
}

/// Helper to create success response templates
pub fn success_response(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}
