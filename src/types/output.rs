//! Conversion job output types.

use serde_json::Value;

/// Metadata about one file produced by a conversion job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputFile {
    /// File name of the output.
    pub filename: Option<String>,
    /// Download URL of the output.
    pub url: Option<String>,
    /// Size in bytes, when reported.
    pub size: Option<u64>,
}

impl OutputFile {
    /// Creates a descriptor for a named file.
    pub fn named(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
            ..Default::default()
        }
    }

    /// Reads a descriptor from a service value.
    ///
    /// Mappings are read field by field; a bare string is taken as the file name.
    /// Anything else yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(filename) => Some(Self::named(filename.clone())),
            Value::Object(map) => Some(Self {
                filename: map.get("filename").and_then(Value::as_str).map(str::to_owned),
                url: map.get("url").and_then(Value::as_str).map(str::to_owned),
                size: map.get("size").and_then(Value::as_u64),
            }),
            _ => None,
        }
    }
}

/// Remote content selected for a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFile {
    /// A file name below the job's output URL.
    Named(String),
    /// An output descriptor returned by the service.
    Output(OutputFile),
    /// Base64 encoded inline file content.
    Inline(String),
}

impl RemoteFile {
    /// File name of the remote content, when known.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            RemoteFile::Named(name) => Some(name),
            RemoteFile::Output(output) => output.filename.as_deref(),
            RemoteFile::Inline(_) => None,
        }
    }
}

impl From<OutputFile> for RemoteFile {
    fn from(output: OutputFile) -> Self {
        RemoteFile::Output(output)
    }
}

/// Lifecycle state of a conversion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertState {
    /// Created; no details fetched yet.
    Created,
    /// Details fetched, output not available yet.
    Processing,
    /// Output available for download.
    Completed,
    /// Deleted from the service.
    Deleted,
}
