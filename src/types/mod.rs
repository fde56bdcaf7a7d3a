//! Request and response types for the DocCloud API.

pub mod content;
pub mod output;
pub mod response;

pub use content::{FilePart, RequestContent};
pub use output::{ConvertState, OutputFile, RemoteFile};
pub use response::ApiResponse;
