//! arXiv API client.
//!
//! One client holds at most one request in flight; a second call before the
//! first completes is rejected rather than silently racing. Completion is an
//! awaited future; there is no callback plumbing and no built-in retry.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use super::parser::{parse_feed, FetchedEntry};
use super::query::{SearchQuery, SortBy, SortOrder};
use super::request::ArxivRequest;
use super::SourceError;
use crate::http::{HttpClient, HttpError};

pub struct ArxivClient {
    http: HttpClient,
    in_flight: AtomicBool,
}

impl ArxivClient {
    pub fn new() -> Self {
        Self {
            http: HttpClient::new("shelfmark/0.1 (reference catalogue)"),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Search the metadata API. Paging is the caller's business: "load more"
    /// is a new call with an updated start index.
    pub async fn search(
        &self,
        query: &SearchQuery,
        start: u32,
        max_results: u32,
        sort_by: SortBy,
        sort_order: SortOrder,
    ) -> Result<Vec<FetchedEntry>, SourceError> {
        let request = ArxivRequest::new()
            .with_search(query)
            .with_start(start)
            .with_max_results(max_results)
            .with_sort_by(sort_by)
            .with_sort_order(sort_order);
        self.execute(request).await
    }

    /// Fetch metadata for specific arXiv ids.
    pub async fn fetch_by_ids(&self, ids: &[&str]) -> Result<Vec<FetchedEntry>, SourceError> {
        let clean: Vec<&str> = ids
            .iter()
            .map(|id| {
                id.trim_start_matches("arXiv:")
                    .trim_start_matches("arxiv:")
            })
            .collect();
        self.execute(ArxivRequest::new().with_id_list(&clean)).await
    }

    async fn execute(&self, request: ArxivRequest) -> Result<Vec<FetchedEntry>, SourceError> {
        let _guard = InFlightGuard::acquire(&self.in_flight)?;
        let url = request.url();
        debug!(%url, "sending metadata request");
        let response = self
            .http
            .get_with_headers(&url, &[("Accept", "application/atom+xml")])
            .await?;
        if response.status != 200 {
            return Err(SourceError::Http(HttpError::RequestFailed {
                message: format!("Status {}", response.status),
            }));
        }
        parse_feed(&response.body)
    }
}

impl Default for ArxivClient {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard enforcing the one-request-at-a-time precondition.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, SourceError> {
        if flag
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_err()
        {
            return Err(SourceError::RequestInFlight);
        }
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
