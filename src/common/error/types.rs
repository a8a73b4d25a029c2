//! Unified error types for metafile transcoding.
use crate::common::binary::BinaryError;
use thiserror::Error;

/// What went wrong while decoding a metafile.
#[derive(Error, Debug)]
pub enum ErrorKind {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Field access past the end of a record payload
    #[error("Out of bounds: {width} bytes at offset {offset} exceed record size {size}")]
    OutOfBounds {
        offset: usize,
        width: usize,
        size: usize,
    },

    /// File header is missing, truncated or carries the wrong signature
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Record content is malformed
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// The output sink rejected a drawing call
    #[error("Output error: {0}")]
    Output(String),

    /// Raster decoding or encoding failed
    #[error("Image error: {0}")]
    Image(String),

    /// The caller raised the cancellation flag
    #[error("Transcode cancelled")]
    Cancelled,
}

/// Error returned by every fallible operation of the crate.
///
/// `recoverable` separates per-record failures, which the driver logs and
/// skips, from failures that abort the whole transcode.
#[derive(Debug)]
pub struct DecodeError {
    kind: ErrorKind,
    recoverable: bool,
}

impl DecodeError {
    /// Create an error that aborts the transcode.
    pub fn fatal(kind: ErrorKind) -> Self {
        Self {
            kind,
            recoverable: false,
        }
    }

    /// Create an error that only invalidates the current record.
    pub fn recoverable(kind: ErrorKind) -> Self {
        Self {
            kind,
            recoverable: true,
        }
    }

    /// Shorthand for a fatal [`ErrorKind::InvalidHeader`].
    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::fatal(ErrorKind::InvalidHeader(msg.into()))
    }

    /// Shorthand for a recoverable [`ErrorKind::InvalidFormat`].
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::recoverable(ErrorKind::InvalidFormat(msg.into()))
    }

    /// Shorthand for a recoverable [`ErrorKind::Unsupported`].
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::recoverable(ErrorKind::Unsupported(msg.into()))
    }

    /// Shorthand for a fatal [`ErrorKind::Output`].
    pub fn output(msg: impl Into<String>) -> Self {
        Self::fatal(ErrorKind::Output(msg.into()))
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn is_recoverable(&self) -> bool {
        self.recoverable
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        Self::fatal(ErrorKind::Io(err))
    }
}

impl From<BinaryError> for DecodeError {
    fn from(err: BinaryError) -> Self {
        match err {
            BinaryError::InsufficientData {
                offset,
                width,
                available,
            } => Self::recoverable(ErrorKind::OutOfBounds {
                offset,
                width,
                size: available,
            }),
        }
    }
}

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        Self::recoverable(ErrorKind::Image(err.to_string()))
    }
}

/// Result type for metafile operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_error_is_recoverable() {
        let err: DecodeError = BinaryError::InsufficientData {
            offset: 4,
            width: 4,
            available: 6,
        }
        .into();
        assert!(err.is_recoverable());
        assert!(matches!(
            err.kind(),
            ErrorKind::OutOfBounds {
                offset: 4,
                width: 4,
                size: 6
            }
        ));
    }

    #[test]
    fn test_header_error_is_fatal() {
        let err = DecodeError::invalid_header("bad signature");
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "Invalid header: bad signature");
    }
}
