//! Reqwest-based HTTP transport implementation.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, ClientBuilder};
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;

use super::{ByteStream, HttpRequest, HttpResponse, HttpTransport, RequestBody};
use crate::errors::TransportError;

/// HTTP transport implementation using reqwest.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport around an existing reqwest client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a transport with a default client and the given timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| TransportError::InvalidRequest {
                message: format!("Failed to create client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut req = self.client.request(request.method.into(), request.url);

        for (name, value) in &request.headers {
            req = req.header(name, value);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req = match request.body {
            RequestBody::Empty => req,
            RequestBody::Bytes(bytes) => req.body(bytes),
            RequestBody::Stream(stream) => req.body(Body::wrap_stream(stream)),
            RequestBody::Multipart(parts) => {
                let mut form = Form::new();
                for part in parts {
                    let mut file_part = Part::bytes(part.data.to_vec());
                    if let Some(filename) = part.filename {
                        file_part = file_part.file_name(filename);
                    }
                    form = form.part(part.name, file_part);
                }
                req.multipart(form)
            }
        };

        let response = req.send().await?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();

        tracing::debug!(status, "Response received");

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TransportError::from));

        Ok(HttpResponse::new(status, headers, ByteStream::new(body)))
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport").finish()
    }
}
