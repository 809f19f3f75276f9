//! Error types for Courier core.

use thiserror::Error;

/// Errors raised by the pure channel primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checksum embedded in a locked message does not match its content.
    ///
    /// The checksum is two bytes wide, so roughly one tampered message in
    /// 65536 is accepted anyway.
    #[error("integrity check failed: expected {expected}, got {actual}")]
    Integrity { expected: String, actual: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("decoding error: {0}")]
    Decode(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid tag: {0}")]
    InvalidTag(String),
}

impl CoreError {
    /// True for checksum mismatches.
    pub fn is_integrity(&self) -> bool {
        matches!(self, CoreError::Integrity { .. })
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
