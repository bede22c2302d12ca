//! arXiv search query construction.
//!
//! A query fragment is rendered as a literal percent-escaped string the way
//! the API expects it: `+` for spaces, `%22` quotation marks, `%28`/`%29`
//! parentheses. Boolean composition is **not** associative across operators,
//! so every combinator wraps its result in parentheses. Repeated composition
//! is then safe regardless of nesting order.

use std::fmt;

/// Sort key accepted by the query interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Relevance,
    SubmittedDate,
    LastUpdatedDate,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::SubmittedDate => "submittedDate",
            SortBy::LastUpdatedDate => "lastUpdatedDate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

/// Field prefixes understood by the search interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    All,
    Title,
    Author,
    Abstract,
    Comment,
    Journal,
    Category,
    ReportNumber,
    Id,
}

impl SearchField {
    pub fn prefix(self) -> &'static str {
        match self {
            SearchField::All => "all",
            SearchField::Title => "ti",
            SearchField::Author => "au",
            SearchField::Abstract => "abs",
            SearchField::Comment => "co",
            SearchField::Journal => "jr",
            SearchField::Category => "cat",
            SearchField::ReportNumber => "rn",
            SearchField::Id => "id",
        }
    }
}

/// A composable search query fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    fragment: String,
}

impl SearchQuery {
    /// A single field-qualified term: `prefix:%22value%22`, spaces as `+`.
    /// An empty value yields an empty query.
    pub fn term(field: SearchField, value: &str) -> Self {
        if value.is_empty() {
            return Self::default();
        }
        Self {
            fragment: format!("{}:%22{}%22", field.prefix(), value.replace(' ', "+")),
        }
    }

    /// Wrap an already-escaped fragment.
    pub fn raw(fragment: &str) -> Self {
        Self {
            fragment: fragment.to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragment.is_empty()
    }

    pub fn and(self, other: SearchQuery) -> Self {
        Self {
            fragment: format!("%28{}+AND+{}%29", self.fragment, other.fragment),
        }
    }

    pub fn or(self, other: SearchQuery) -> Self {
        Self {
            fragment: format!("%28{}+OR+{}%29", self.fragment, other.fragment),
        }
    }

    pub fn and_not(self, other: SearchQuery) -> Self {
        Self {
            fragment: format!("%28{}+ANDNOT+{}%29", self.fragment, other.fragment),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.fragment
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragment)
    }
}
