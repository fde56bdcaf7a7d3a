//! DocCloud Client Library
//!
//! An async Rust client for the DocCloud document conversion service. Starts
//! conversion jobs from uploaded files or raw streams, follows them until the
//! output is ready and downloads single or multiple output files.
//!
//! # Features
//!
//! - **Request dispatch**: relative API paths and service-returned URLs,
//!   JSON / query / multipart / raw stream payloads, bearer authentication
//! - **Typed errors**: service failures classified into bad request,
//!   conversion failed, temporarily unavailable (with retry hint) and
//!   generic API errors
//! - **Conversion jobs**: lazy refresh, polling, file and stream downloads
//! - **Observability**: `tracing` spans on every request, token never logged
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use integrations_doccloud::{DocCloudClient, RequestContent};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DocCloudClient::builder()
//!         .access_token("dc_your_token")
//!         .build()?;
//!
//!     let mut job = client
//!         .create_convert(RequestContent::files(["report.docx"]))
//!         .await?;
//!
//!     job.wait(Duration::from_secs(2), 30).await?;
//!     for path in job.download_all(Some("out".as_ref())).await? {
//!         println!("Saved {}", path.display());
//!     }
//!
//!     job.delete().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! ```rust,no_run
//! use integrations_doccloud::{DocCloudClient, DocCloudError, RequestContent};
//!
//! # async fn run(client: DocCloudClient) {
//! match client.create_convert(RequestContent::files(["scan.tiff"])).await {
//!     Ok(job) => println!("Started {:?}", job.url()),
//!     Err(DocCloudError::ConversionFailed { message, .. }) => eprintln!("Rejected: {}", message),
//!     Err(e @ DocCloudError::TemporaryUnavailable { .. }) => {
//!         eprintln!("Try again in {:?}", e.retry_after());
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod resources;
pub mod services;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use auth::{AuthProvider, BearerTokenAuth};
pub use client::{DocCloudClient, DocCloudClientBuilder, RequestExecutor};
pub use config::{DocCloudConfig, DocCloudConfigBuilder, Protocol};
pub use errors::{DocCloudError, DocCloudResult, TransportError};
pub use resources::{ApiObject, Convert};
pub use services::ConvertService;
pub use transport::{ByteStream, HttpMethod, HttpTransport, UploadStream};
pub use types::{ApiResponse, ConvertState, FilePart, OutputFile, RemoteFile, RequestContent};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::{DocCloudClient, DocCloudClientBuilder};
    pub use crate::errors::{DocCloudError, DocCloudResult};
    pub use crate::resources::Convert;
    pub use crate::types::{RemoteFile, RequestContent};
}
