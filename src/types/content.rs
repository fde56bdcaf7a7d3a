//! Request payloads.

use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::errors::{DocCloudError, DocCloudResult};
use crate::transport::UploadStream;

/// Payload of a single API request.
///
/// The variant selects the encoding; see
/// [`RequestExecutor`](crate::client::RequestExecutor) for how each variant is
/// sent for each HTTP method.
#[derive(Debug)]
pub enum RequestContent {
    /// No payload.
    Empty,
    /// Query string parameters.
    QueryParams(Map<String, Value>),
    /// JSON request body.
    JsonBody(Value),
    /// Multipart upload, one `files[<key>]` part per file.
    MultipartFiles(Vec<FilePart>),
    /// Raw upload body, sent unmodified.
    RawStream(UploadStream),
}

impl RequestContent {
    /// Builds a JSON body from any serializable value.
    pub fn json<T: serde::Serialize>(value: &T) -> DocCloudResult<Self> {
        serde_json::to_value(value)
            .map(RequestContent::JsonBody)
            .map_err(|e| DocCloudError::invalid_parameter(format!("Failed to serialize request: {}", e)))
    }

    /// Builds query parameters from key/value pairs.
    pub fn query<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        RequestContent::QueryParams(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Builds a multipart upload keyed by position (`files[0]`, `files[1]`, ...).
    pub fn files<P, I>(paths: I) -> Self
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = P>,
    {
        RequestContent::MultipartFiles(
            paths
                .into_iter()
                .enumerate()
                .map(|(index, path)| FilePart::new(index.to_string(), path))
                .collect(),
        )
    }

    /// Returns true when there is no payload.
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestContent::Empty)
    }
}

impl Default for RequestContent {
    fn default() -> Self {
        RequestContent::Empty
    }
}

impl From<Map<String, Value>> for RequestContent {
    fn from(map: Map<String, Value>) -> Self {
        RequestContent::JsonBody(Value::Object(map))
    }
}

impl From<Value> for RequestContent {
    fn from(value: Value) -> Self {
        RequestContent::JsonBody(value)
    }
}

/// A local file to upload as part of a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Key inside the `files[...]` field name.
    pub key: String,
    /// Path of the file on disk.
    pub path: PathBuf,
}

impl FilePart {
    /// Creates a new file part.
    pub fn new(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
        }
    }

    /// Form field name of this part.
    pub fn field_name(&self) -> String {
        format!("files[{}]", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_files_are_keyed_by_index() {
        let content = RequestContent::files(["a.docx", "b.docx"]);

        match content {
            RequestContent::MultipartFiles(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[0].field_name(), "files[0]");
                assert_eq!(parts[1].field_name(), "files[1]");
                assert_eq!(parts[1].path, PathBuf::from("b.docx"));
            }
            other => panic!("Expected multipart content, got {:?}", other),
        }
    }

    #[test]
    fn test_query_builder() {
        let content = RequestContent::query([("page", json!(2)), ("q", json!("report"))]);

        match content {
            RequestContent::QueryParams(params) => {
                assert_eq!(params.get("page"), Some(&json!(2)));
                assert_eq!(params.get("q"), Some(&json!("report")));
            }
            other => panic!("Expected query content, got {:?}", other),
        }
    }

    #[test]
    fn test_json_from_serializable() {
        #[derive(serde::Serialize)]
        struct Params {
            outputformat: &'static str,
        }

        let content = RequestContent::json(&Params { outputformat: "pdf" }).unwrap();
        assert!(matches!(
            content,
            RequestContent::JsonBody(ref value) if value == &json!({"outputformat": "pdf"})
        ));
        assert!(RequestContent::default().is_empty());
    }
}
