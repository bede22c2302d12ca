//! Core library for the shelfmark reference catalogue.
//!
//! Ties the entry model to a SQLite store through a staged-change cache: adds,
//! edits and removals accumulate in pending queues and are reconciled with the
//! store on demand. Also hosts the arXiv metadata client and Atom parser used
//! to pull entry metadata from the network.

pub mod arxiv;
pub mod cache;
pub mod download;
pub mod filter;
pub mod http;
pub mod storage;

pub use arxiv::{ArxivClient, FetchedEntry, SearchField, SearchQuery, SourceError};
pub use cache::{CacheError, ChangeCache, SortOrder};
pub use download::FileDownloader;
pub use filter::EntryFilter;
pub use storage::{
    Catalogue, CatalogueState, SaveOutcome, SqlFilter, StoreAdapter, StoreError, BULK_THRESHOLD,
    DATA_MODEL_VERSION,
};
