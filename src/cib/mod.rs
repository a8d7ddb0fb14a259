//! CIB loading and decoding.

pub mod decode;
pub mod document;
pub mod error;
pub mod loader;

pub use decode::{DecodeContext, decode};
pub use document::Document;
pub use error::CibError;
pub use loader::{ProcessRunner, QueryCommand, Source};
