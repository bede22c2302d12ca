//! Request assembly for the arXiv query endpoint.
//!
//! Parameters are concatenated verbatim: the search fragment carries its own
//! percent escaping, and running it through a URL encoder again would mangle
//! it.

use urlencoding::encode;

use super::query::{SearchQuery, SortBy, SortOrder};

pub const BASE_URL: &str = "http://export.arxiv.org/api/query";

/// Query parameter names of the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryParam {
    Search,
    IdList,
    Start,
    MaxResults,
    SortBy,
    SortOrder,
}

impl QueryParam {
    fn as_str(self) -> &'static str {
        match self {
            QueryParam::Search => "search_query",
            QueryParam::IdList => "id_list",
            QueryParam::Start => "start",
            QueryParam::MaxResults => "max_results",
            QueryParam::SortBy => "sortBy",
            QueryParam::SortOrder => "sortOrder",
        }
    }
}

/// One GET request against the fixed base URL.
#[derive(Debug, Clone, Default)]
pub struct ArxivRequest {
    params: Vec<(QueryParam, String)>,
}

impl ArxivRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: &SearchQuery) -> Self {
        self.params
            .push((QueryParam::Search, query.as_str().to_string()));
        self
    }

    pub fn with_id_list(mut self, ids: &[&str]) -> Self {
        let joined = ids
            .iter()
            .map(|id| encode(id).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((QueryParam::IdList, joined));
        self
    }

    pub fn with_start(mut self, start: u32) -> Self {
        self.params.push((QueryParam::Start, start.to_string()));
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.params
            .push((QueryParam::MaxResults, max_results.to_string()));
        self
    }

    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.params
            .push((QueryParam::SortBy, sort_by.as_str().to_string()));
        self
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.params
            .push((QueryParam::SortOrder, sort_order.as_str().to_string()));
        self
    }

    pub fn url(&self) -> String {
        if self.params.is_empty() {
            return BASE_URL.to_string();
        }
        let query = self
            .params
            .iter()
            .map(|(key, value)| format!("{}={}", key.as_str(), value))
            .collect::<Vec<_>>()
            .join("&");
        format!("{BASE_URL}?{query}")
    }
}
