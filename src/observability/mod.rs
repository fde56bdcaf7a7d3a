//! Observability for the DocCloud client.
//!
//! Requests, refreshes and downloads emit `tracing` spans and events; the
//! access token and request bodies are never recorded. Applications install
//! a subscriber of their choice, or use [`init_logging`] for a ready-made
//! `tracing-subscriber` setup:
//!
//! ```rust,no_run
//! use integrations_doccloud::observability::{init_logging, LogFormat, LogLevel, LoggingConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! init_logging(
//!     LoggingConfig::new()
//!         .with_level(LogLevel::Debug)
//!         .with_format(LogFormat::Json),
//! )?;
//! # Ok(())
//! # }
//! ```

mod logging;

pub use logging::*;
