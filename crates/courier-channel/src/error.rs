//! Error types for channel discovery and reading.

use courier_core::CoreError;
use courier_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur while locating or reading a channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A channel primitive failed.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// A ledger lookup failed where there is no loop to retry it.
    #[error("ledger query failed: {0}")]
    TransientQuery(LedgerError),

    /// Invalid argument or configuration.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
