//! Request executor: URL building, payload encoding, auth and error mapping.

use bytes::Bytes;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use url::Url;

use crate::auth::AuthProvider;
use crate::config::DocCloudConfig;
use crate::errors::{DocCloudError, DocCloudResult, TransportError};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, MultipartPart, RequestBody};
use crate::types::{ApiResponse, FilePart, RequestContent};

/// Content type of JSON request bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Request executor that builds, signs, sends and interprets API requests.
///
/// This is the core component that:
/// - Resolves relative paths, protocol-relative and absolute URLs
/// - Encodes the request payload according to its [`RequestContent`] variant
/// - Adds the bearer token to authenticated requests
/// - Classifies HTTP error responses into [`DocCloudError`] kinds
///
/// The executor holds no per-request state and can be shared across tasks.
pub struct RequestExecutor {
    config: DocCloudConfig,
    transport: Arc<dyn HttpTransport>,
    auth: Arc<dyn AuthProvider>,
}

impl RequestExecutor {
    /// Creates a new request executor.
    pub fn new(
        config: DocCloudConfig,
        transport: Arc<dyn HttpTransport>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            config,
            transport,
            auth,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DocCloudConfig {
        &self.config
    }

    /// Returns the HTTP transport.
    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Sends a GET request.
    pub async fn get(
        &self,
        path: &str,
        content: RequestContent,
        authenticated: bool,
    ) -> DocCloudResult<ApiResponse> {
        self.raw_call(HttpMethod::Get, path, content, authenticated).await
    }

    /// Sends a POST request.
    pub async fn post(
        &self,
        path: &str,
        content: RequestContent,
        authenticated: bool,
    ) -> DocCloudResult<ApiResponse> {
        self.raw_call(HttpMethod::Post, path, content, authenticated).await
    }

    /// Sends a PUT request.
    pub async fn put(
        &self,
        path: &str,
        content: RequestContent,
        authenticated: bool,
    ) -> DocCloudResult<ApiResponse> {
        self.raw_call(HttpMethod::Put, path, content, authenticated).await
    }

    /// Sends a DELETE request.
    pub async fn delete(
        &self,
        path: &str,
        content: RequestContent,
        authenticated: bool,
    ) -> DocCloudResult<ApiResponse> {
        self.raw_call(HttpMethod::Delete, path, content, authenticated).await
    }

    /// Builds, sends and interprets one request.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `path` - API path, protocol-relative URL (`//host/...`) or absolute URL
    /// * `content` - Request payload
    /// * `authenticated` - Whether to attach the bearer token
    ///
    /// # Returns
    ///
    /// The parsed JSON value for `application/json` responses, the open body
    /// stream otherwise.
    #[instrument(skip(self, content), fields(method = %method, path = %path))]
    pub async fn raw_call(
        &self,
        method: HttpMethod,
        path: &str,
        content: RequestContent,
        authenticated: bool,
    ) -> DocCloudResult<ApiResponse> {
        let mut url = self.build_url(path)?;

        let mut headers = HashMap::new();
        headers.insert("User-Agent".to_string(), self.config.user_agent.clone());

        let body = encode_content(method, content, &mut url, &mut headers).await?;

        if authenticated {
            self.auth.apply_auth(&mut headers);
        }

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: Some(self.config.timeout),
        };

        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(error = %e, "Transport failure");
            DocCloudError::from(e)
        })?;

        if !response.is_success() {
            let error = classify_response(response).await;
            tracing::debug!(error = %error, "Request failed");
            return Err(error);
        }

        interpret_response(response).await
    }

    /// Builds the full URL for a path.
    ///
    /// - `//host/path` gets the configured protocol: `<protocol>://host/path`
    /// - `http...` is used verbatim
    /// - anything else is appended to `<protocol>://<endpoint>`
    pub fn build_url(&self, path: &str) -> DocCloudResult<Url> {
        let raw = if path.starts_with("//") {
            format!("{}:{}", self.config.protocol, path)
        } else if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.config.base_url(), path)
        };

        Url::parse(&raw)
            .map_err(|e| DocCloudError::invalid_parameter(format!("Invalid URL '{}': {}", raw, e)))
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config)
            .finish()
    }
}

/// Encodes the payload into the request, by method and content variant.
async fn encode_content(
    method: HttpMethod,
    content: RequestContent,
    url: &mut Url,
    headers: &mut HashMap<String, String>,
) -> DocCloudResult<RequestBody> {
    match (method, content) {
        (_, RequestContent::Empty) => Ok(RequestBody::Empty),
        (HttpMethod::Get, RequestContent::JsonBody(Value::Object(params)))
        | (_, RequestContent::QueryParams(params)) => {
            append_query(url, &params);
            Ok(RequestBody::Empty)
        }
        (HttpMethod::Post, RequestContent::RawStream(stream)) => Ok(RequestBody::Stream(stream)),
        (HttpMethod::Post, RequestContent::MultipartFiles(files)) => {
            Ok(RequestBody::Multipart(read_file_parts(files).await?))
        }
        (_, RequestContent::JsonBody(value)) => {
            let body = serde_json::to_vec(&value).map_err(|e| {
                DocCloudError::invalid_parameter(format!("Failed to serialize request: {}", e))
            })?;
            headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
            Ok(RequestBody::Bytes(Bytes::from(body)))
        }
        (method, RequestContent::RawStream(_)) | (method, RequestContent::MultipartFiles(_)) => {
            Err(DocCloudError::invalid_parameter(format!(
                "File uploads require POST, got {}",
                method
            )))
        }
    }
}

/// Appends mapping entries as query parameters. Null values are skipped.
fn append_query(url: &mut Url, params: &Map<String, Value>) {
    let pairs: Vec<(&str, String)> = params
        .iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key.as_str(), s.clone())),
            other => Some((key.as_str(), other.to_string())),
        })
        .collect();

    if pairs.is_empty() {
        return;
    }

    url.query_pairs_mut()
        .extend_pairs(pairs.iter().map(|(key, value)| (*key, value.as_str())));
}

/// Reads upload files from disk into `files[<key>]` parts.
async fn read_file_parts(files: Vec<FilePart>) -> DocCloudResult<Vec<MultipartPart>> {
    let mut parts = Vec::with_capacity(files.len());

    for file in files {
        let data = tokio::fs::read(&file.path).await.map_err(|e| {
            DocCloudError::invalid_parameter(format!(
                "Cannot read upload file {}: {}",
                file.path.display(),
                e
            ))
        })?;

        parts.push(MultipartPart {
            name: file.field_name(),
            filename: file
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            data: Bytes::from(data),
        });
    }

    Ok(parts)
}

/// Interprets a successful response by its content type.
async fn interpret_response(response: HttpResponse) -> DocCloudResult<ApiResponse> {
    let is_json = response
        .header("content-type")
        .map(|value| value.starts_with("application/json"))
        .unwrap_or(false);

    if !is_json {
        return Ok(ApiResponse::Stream(response.body));
    }

    let body = response.bytes().await?;
    if body.is_empty() {
        return Ok(ApiResponse::Json(Value::Null));
    }

    serde_json::from_slice(&body)
        .map(ApiResponse::Json)
        .map_err(|e| DocCloudError::parse(format!("Failed to parse response: {}", e)))
}

/// Reads an error response body and classifies it.
async fn classify_response(response: HttpResponse) -> DocCloudError {
    let status = response.status;
    let retry_after = response
        .header("retry-after")
        .and_then(|value| value.trim().parse::<u64>().ok());

    match response.bytes().await {
        Ok(body) => classify_error(status, &body, retry_after),
        Err(e) => DocCloudError::Transport(e),
    }
}

/// Classifies an HTTP error response.
///
/// - body that is not JSON: [`DocCloudError::Parse`]
/// - JSON without `error` or `message`: the unrecognized HTTP failure,
///   [`TransportError::Status`]
/// - otherwise by status: 400, 422, 503, or a generic API error
pub fn classify_error(status: u16, body: &[u8], retry_after: Option<u64>) -> DocCloudError {
    let json: Value = match serde_json::from_slice(body) {
        Ok(json) => json,
        Err(_) => return DocCloudError::parse("Error parsing JSON response"),
    };

    let field = |name: &str| json.get(name).filter(|value| !value.is_null());

    match field("error").or_else(|| field("message")) {
        Some(message) => DocCloudError::from_status(status, message_text(message), retry_after),
        None => DocCloudError::Transport(TransportError::Status {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }),
    }
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(message) => message.clone(),
        Value::Object(map) => match map.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}
