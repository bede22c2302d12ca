//! SQLite-backed persistence: the generic store adapter and the catalogue
//! synchronizer reconciling the change cache against it.

pub mod adapter;
pub mod catalogue;

pub use adapter::{SqlFilter, StoreAdapter};
pub use catalogue::{Catalogue, CatalogueState, SaveOutcome, BULK_THRESHOLD, DATA_MODEL_VERSION};

/// Errors from the storage layer. Ordinary query failures are reported as
/// values; only a failed connection open is unrecoverable for callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("store data model version {stored} is newer than supported version {current}")]
    VersionTooNew { stored: i64, current: i64 },

    #[error(transparent)]
    Row(#[from] shelfmark_domain::RowError),
}
