//! Service implementations for the DocCloud API.

mod convert;

pub use convert::ConvertService;
