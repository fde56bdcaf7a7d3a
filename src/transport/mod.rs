//! HTTP transport layer for the DocCloud client.
//!
//! The transport is the only component that talks to the network. It returns
//! every HTTP response, successful or not, and leaves interpretation of the
//! status and body to the request executor.

mod http;

pub use http::ReqwestTransport;

use crate::errors::TransportError;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use pin_project::pin_project;
use std::collections::HashMap;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use url::Url;

/// HTTP transport abstraction for testability.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends an HTTP request and returns the response, whatever its status.
    ///
    /// Errors are reserved for failures where no response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET method.
    Get,
    /// POST method.
    Post,
    /// PUT method.
    Put,
    /// DELETE method.
    Delete,
}

impl HttpMethod {
    /// Returns the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP request representation.
#[derive(Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Fully qualified request URL, query string included.
    pub url: Url,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: RequestBody,
    /// Request timeout override.
    pub timeout: Option<Duration>,
}

/// Request body variants.
pub enum RequestBody {
    /// No body.
    Empty,
    /// Fixed-size bytes.
    Bytes(Bytes),
    /// Streaming upload body, sent unmodified.
    Stream(UploadStream),
    /// Multipart form body.
    Multipart(Vec<MultipartPart>),
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestBody::Empty => write!(f, "Empty"),
            RequestBody::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            RequestBody::Stream(_) => write!(f, "Stream"),
            RequestBody::Multipart(parts) => write!(f, "Multipart({} parts)", parts.len()),
        }
    }
}

/// A file part of a multipart form.
#[derive(Debug, Clone)]
pub struct MultipartPart {
    /// Form field name.
    pub name: String,
    /// File name reported to the server.
    pub filename: Option<String>,
    /// File contents.
    pub data: Bytes,
}

/// HTTP response representation.
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, keyed by lowercase name.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: ByteStream,
}

impl HttpResponse {
    /// Creates a new HTTP response. Header names are lowercased.
    pub fn new(status: u16, headers: HashMap<String, String>, body: ByteStream) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns true if the status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Looks up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Reads the whole body into memory.
    pub async fn bytes(self) -> Result<Bytes, TransportError> {
        self.body.collect_bytes().await
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish()
    }
}

/// Byte stream for response bodies.
#[pin_project]
pub struct ByteStream {
    #[pin]
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>,
}

impl ByteStream {
    /// Creates a new byte stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, TransportError>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Creates a stream yielding a single chunk.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self::new(futures::stream::once(async move { Ok(bytes) }))
    }

    /// Creates an empty stream.
    pub fn empty() -> Self {
        Self::new(futures::stream::empty())
    }

    /// Drains the stream into a single buffer.
    pub async fn collect_bytes(mut self) -> Result<Bytes, TransportError> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }
}

impl Stream for ByteStream {
    type Item = Result<Bytes, TransportError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        this.inner.poll_next(cx)
    }
}

impl std::fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ByteStream")
    }
}

/// Byte stream for raw upload bodies.
#[pin_project]
pub struct UploadStream {
    #[pin]
    inner: Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send + Sync>>,
}

impl UploadStream {
    /// Creates an upload stream from any byte stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, TransportError>> + Send + Sync + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// Creates an upload stream from an async reader, such as an open file.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        Self::new(ReaderStream::new(reader).map(|chunk| {
            chunk.map_err(|e| TransportError::Stream {
                message: e.to_string(),
            })
        }))
    }

    /// Creates an upload stream from in-memory bytes.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self::new(futures::stream::iter(std::iter::once(Ok(bytes))))
    }

    /// Drains the stream into a single buffer.
    pub async fn collect_bytes(mut self) -> Result<Bytes, TransportError> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }
}

impl Stream for UploadStream {
    type Item = Result<Bytes, TransportError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        this.inner.poll_next(cx)
    }
}

impl std::fmt::Debug for UploadStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UploadStream")
    }
}
