//! Error types raised by the ledger.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by document stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupted state document {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of a refused or failed ledger operation.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The caller dispensed too recently.
    #[error("cooldown active, {remaining_secs}s remaining")]
    RateLimited { remaining_secs: i64 },

    #[error("no active subscription")]
    NotEntitled,

    #[error("stock is empty")]
    OutOfStock,

    /// The change was not written. The live document is unchanged.
    #[error("failed to persist state: {0}")]
    Persistence(#[from] StoreError),

    /// A platform call the operation depends on failed.
    #[error("platform call failed: {0}")]
    External(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    pub(crate) fn external(err: anyhow::Error) -> Self {
        Self::External(err.into())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
