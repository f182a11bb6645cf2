//! Errors reported by the binding layer.

use std::fmt;
use thiserror::Error;

/// The operation that was running when the codec failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Compress,
    Decompress,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Compress => write!(f, "compression"),
            Operation::Decompress => write!(f, "decompression"),
        }
    }
}

/// Separates failures that a bigger output buffer could fix from everything
/// else.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The codec rejected the input or failed internally.
    Stream,
    /// The decompressed output did not fit in the allowed capacity.
    OutputCapacity,
}

#[derive(Debug, Error)]
pub enum Error {
    /// A compression parameter is outside of its valid domain. Raised before
    /// any buffer is allocated or the codec is called.
    #[error("invalid {param} {value}: expected {expected}")]
    InvalidParameter {
        param: &'static str,
        value: i64,
        expected: String,
    },

    /// The native codec reported failure.
    #[error("{operation} failed{}", fmt_detail(.kind, .detail))]
    CodecFailure {
        operation: Operation,
        kind: FailureKind,
        detail: Option<String>,
    },

    /// Adaptive decompression ran out of budget before the output fit.
    #[error("maximum buffer size reached ({max_size} bytes)")]
    BufferLimitExceeded { max_size: usize },
}

fn fmt_detail(kind: &FailureKind, detail: &Option<String>) -> String {
    match (kind, detail) {
        (FailureKind::OutputCapacity, Some(d)) => {
            format!(" (output capacity exceeded: {})", d)
        }
        (FailureKind::OutputCapacity, None) => {
            String::from(" (output capacity exceeded)")
        }
        (FailureKind::Stream, Some(d)) => format!(" ({})", d),
        (FailureKind::Stream, None) => String::new(),
    }
}

impl Error {
    /// Returns true if the failure is caused by an undersized output buffer.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Error::CodecFailure {
                kind: FailureKind::OutputCapacity,
                ..
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
