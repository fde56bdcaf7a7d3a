//! Interpreted API responses.

use serde_json::Value;

use crate::errors::{DocCloudError, DocCloudResult};
use crate::transport::ByteStream;

/// A successful API response.
#[derive(Debug)]
pub enum ApiResponse {
    /// Parsed body of an `application/json` response.
    Json(Value),
    /// Open body stream of any other response, such as a file download.
    Stream(ByteStream),
}

impl ApiResponse {
    /// Returns the JSON value, reading and parsing a stream body if needed.
    pub async fn into_json(self) -> DocCloudResult<Value> {
        match self {
            ApiResponse::Json(value) => Ok(value),
            ApiResponse::Stream(stream) => {
                let body = stream.collect_bytes().await?;
                if body.is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_slice(&body)
                    .map_err(|e| DocCloudError::parse(format!("Failed to parse response: {}", e)))
            }
        }
    }

    /// Returns the body as a stream; JSON values are re-serialized.
    pub fn into_stream(self) -> DocCloudResult<ByteStream> {
        match self {
            ApiResponse::Stream(stream) => Ok(stream),
            ApiResponse::Json(value) => serde_json::to_vec(&value)
                .map(ByteStream::from_bytes)
                .map_err(|e| DocCloudError::parse(format!("Failed to serialize response: {}", e))),
        }
    }

    /// Returns the JSON value without consuming a stream.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Stream(_) => None,
        }
    }
}
