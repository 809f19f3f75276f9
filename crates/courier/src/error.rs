//! Error types for channel sessions.

use courier_channel::ChannelError;
use courier_core::CoreError;
use courier_ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Index discovery or history reading failed.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Locking or encoding the message failed.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// The ledger did not accept the bundle.
    ///
    /// Nothing is resubmitted; the session cursor stays on the slot that
    /// was attempted.
    #[error("submission failed: {0}")]
    Submission(LedgerError),
}

impl CourierError {
    /// True if the ledger rejected or failed to receive a bundle.
    pub fn is_submission(&self) -> bool {
        matches!(self, CourierError::Submission(_))
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, CourierError>;
