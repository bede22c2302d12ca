//! arXiv metadata client and Atom feed parser.
//!
//! API docs: https://info.arxiv.org/help/api/user-manual.html
//! One round trip is one request/response; pagination is a new request with
//! an updated start index.

pub mod client;
pub mod parser;
pub mod query;
pub mod request;

pub use client::ArxivClient;
pub use parser::{parse_feed, FetchedEntry};
pub use query::{SearchField, SearchQuery, SortBy, SortOrder};
pub use request::{ArxivRequest, BASE_URL};

use crate::http::HttpError;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("{0}")]
    Parse(String),

    #[error("No entries found")]
    NoEntries,

    #[error("a request is already in flight")]
    RequestInFlight,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
