//! Resources returned by the service.
//!
//! [`ApiObject`] holds a creation result and lazily fetched data;
//! [`Convert`] adds the conversion job lifecycle and downloads on top.

mod api_object;
mod convert;

pub use api_object::ApiObject;
pub use convert::Convert;
