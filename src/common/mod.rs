//! Common types and utilities shared by the EMF and WMF decoders.

// Submodule declarations
pub mod binary;
pub mod encoding;
pub mod error;

// Re-exports for convenience
pub use error::{DecodeError, ErrorKind, Result};
