//! Error taxonomy shared across the rasterpipe crates.

use std::io;
use thiserror::Error;

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The six error kinds the core contract exposes. Codec-library and
/// operating-system errors are coalesced into these at the adapter boundary;
/// nothing upstream of the core sees a raw `jpeg_decoder::Error` or similar.
#[derive(Debug, Error)]
pub enum Error {
    /// Unsupported format, corrupt header, or a size outside the supported range.
    #[error("bad input: {message}")]
    BadInput {
        /// Human-readable detail.
        message: String,
    },

    /// Nonsensical options: negative crop width, unknown scale-mode string, etc.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Human-readable detail.
        message: String,
    },

    /// Allocation failure or a buffer too large for available memory.
    #[error("resource exhausted: requested {requested} bytes")]
    ResourceExhausted {
        /// The allocation size that could not be satisfied.
        requested: usize,
    },

    /// The upstream channel's read or write failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The progress callback or a writer requested the operation stop.
    #[error("aborted: {reason}")]
    Aborted {
        /// Why the operation was aborted.
        reason: String,
    },

    /// An operation was attempted on a bitmap or Transformer in the wrong
    /// state (locked/unlocked, unconfigured, etc).
    #[error("invalid state: {message}")]
    InvalidState {
        /// Human-readable detail.
        message: String,
    },
}

impl Error {
    /// Build a [`Error::BadInput`].
    pub fn bad_input(message: impl Into<String>) -> Self {
        Error::BadInput { message: message.into() }
    }

    /// Build a [`Error::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument { message: message.into() }
    }

    /// Build a [`Error::ResourceExhausted`].
    pub fn resource_exhausted(requested: usize) -> Self {
        Error::ResourceExhausted { requested }
    }

    /// Build a [`Error::Aborted`].
    pub fn aborted(reason: impl Into<String>) -> Self {
        Error::Aborted { reason: reason.into() }
    }

    /// Build a [`Error::InvalidState`].
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Error::InvalidState { message: message.into() }
    }

    /// Whether this error is an I/O failure from the upstream channel.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Whether this error reflects an allocation/resource problem.
    pub fn is_resource_error(&self) -> bool {
        matches!(self, Error::ResourceExhausted { .. })
    }

    /// Whether this error means the pipeline was deliberately stopped rather
    /// than having failed.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Aborted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_match_variants() {
        assert!(Error::resource_exhausted(128).is_resource_error());
        assert!(Error::aborted("writer stopped").is_aborted());
        assert!(!Error::bad_input("x").is_io_error());
    }

    #[test]
    fn io_error_converts_via_from() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = io_err.into();
        assert!(err.is_io_error());
    }
}
