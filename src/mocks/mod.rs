//! Mock implementations for testing.
//!
//! Provides a mock transport and auth provider for unit testing without
//! making real API calls.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use url::Url;

use crate::auth::AuthProvider;
use crate::errors::{DocCloudResult, TransportError};
use crate::transport::{
    ByteStream, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MultipartPart, RequestBody,
};

/// Mock HTTP transport for testing.
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<MockResponse, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    default_response: Mutex<Option<MockResponse>>,
}

/// A recorded request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Full request URL.
    pub url: Url,
    /// Request body; streamed uploads are collected.
    pub body: Option<Vec<u8>>,
    /// Multipart parts, when the body was a form.
    pub parts: Vec<MultipartPart>,
    /// Request headers.
    pub headers: HashMap<String, String>,
}

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl MockResponse {
    /// Creates a successful JSON response.
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        Self::bytes(200, "application/json", body)
    }

    /// Creates an error response in the service's `{"error": ...}` shape.
    pub fn error(status: u16, message: &str) -> Self {
        let body = serde_json::to_vec(&serde_json::json!({ "error": message })).unwrap_or_default();
        Self::bytes(status, "application/json", body)
    }

    /// Creates a response with a raw body and content type.
    pub fn bytes(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());

        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Creates a response with custom status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_response: Mutex::new(None),
        }
    }

    /// Queues a response.
    pub fn queue(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queues a JSON response.
    pub fn queue_json<T: serde::Serialize>(&self, value: &T) {
        self.queue(MockResponse::json(value));
    }

    /// Queues an error response.
    pub fn queue_error(&self, status: u16, message: &str) {
        self.queue(MockResponse::error(status, message));
    }

    /// Queues a transport failure; no response is received.
    pub fn queue_failure(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Sets the default response.
    pub fn set_default(&self, response: MockResponse) {
        *self.default_response.lock().unwrap() = Some(response);
    }

    /// Gets all recorded requests.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Gets the last recorded request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Returns the number of requests made.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_response(&self) -> Result<MockResponse, TransportError> {
        if let Some(response) = self.responses.lock().unwrap().pop_front() {
            return response;
        }

        Ok(self
            .default_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| MockResponse::error(500, "No mock response configured")))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let (body, parts) = match request.body {
            RequestBody::Empty => (None, Vec::new()),
            RequestBody::Bytes(bytes) => (Some(bytes.to_vec()), Vec::new()),
            RequestBody::Stream(stream) => (Some(stream.collect_bytes().await?.to_vec()), Vec::new()),
            RequestBody::Multipart(parts) => (None, parts),
        };

        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method,
            url: request.url,
            body,
            parts,
            headers: request.headers,
        });

        let response = self.next_response()?;
        Ok(HttpResponse::new(
            response.status,
            response.headers,
            ByteStream::from_bytes(response.body),
        ))
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("request_count", &self.request_count())
            .finish()
    }
}

/// Mock auth provider for testing.
pub struct MockAuth {
    access_token: String,
}

impl MockAuth {
    /// Creates a new mock auth provider.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

impl Default for MockAuth {
    fn default() -> Self {
        Self::new("dc_mock_test_token")
    }
}

impl AuthProvider for MockAuth {
    fn apply_auth(&self, headers: &mut HashMap<String, String>) {
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.access_token),
        );
    }

    fn scheme(&self) -> &str {
        "Bearer"
    }

    fn validate(&self) -> DocCloudResult<()> {
        Ok(())
    }
}

impl std::fmt::Debug for MockAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockAuth").finish()
    }
}
