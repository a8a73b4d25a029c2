//! Error types for metafile decoding.
//!
//! Every failure carries a recoverability flag. Header failures are fatal
//! and let callers auto-sense the format by trial decoding; per-record
//! failures are recoverable and only skip the offending record.

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{DecodeError, ErrorKind, Result};
