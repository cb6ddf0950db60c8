//! Errors the ledger reports to its callers.
//!
//! Only a rejected import and a failed save ever reach the user. A corrupt store and unknown
//! habit ids are recovered from where they happen and never show up here.

use thiserror::Error;

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Import document isn't JSON or its top level isn't a list of habits.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Ledger couldn't be written to disk.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Failed to encode ledger: {0}")]
    Encode(#[from] serde_json::Error),
}
