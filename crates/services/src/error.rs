//! Shared error types for the services crate.

use thiserror::Error;

use arcade_core::catalog::CatalogError;
use arcade_core::rules::RulesError;
use storage::repository::StorageError;

/// Errors raised while persisting progress.
///
/// The ledger never lets these escape an intent: it logs them and keeps the
/// in-memory state.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LedgerError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("progress document could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors emitted while assembling a game session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Rules(#[from] RulesError),
}
