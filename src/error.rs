use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GribError {
    #[error("grid point {index} is out of range [0, {len})")]
    OutOfBounds { index: usize, len: usize },
    #[error(transparent)]
    DecodeError(#[from] DecodeError),
    #[error("read {len} bytes at offset {offset}: {source}")]
    Io {
        offset: u64,
        len: usize,
        #[source]
        source: io::Error,
    },
    #[error("operation cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("not supported: {0}")]
    NotSupported(String),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl GribError {
    /// Returns `true` if the error was caused by the caller giving up, either
    /// explicitly or through a deadline.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum DecodeError {
    #[error("data representation template 5.{0} is not supported")]
    TemplateNumberUnsupported(u16),
    #[error("{0} with value {1} is not supported")]
    NotSupported(&'static str, u16),
    #[error(
        "data truncated at bit {bit_offset}: {needed} bits needed but only {available} available"
    )]
    Truncated {
        bit_offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}
