//! Display filtering for the change cache.
//!
//! A filter is a predicate over entries: a pattern matched against the display
//! strings of selected fields (or every field when none are named), either as
//! a literal substring or as a regular expression. An invalid regex degrades
//! to match-everything instead of failing.

use regex::Regex;
use shelfmark_domain::Entry;
use tracing::warn;

#[derive(Debug, Clone)]
enum Matcher {
    Literal { needle: String, case_sensitive: bool },
    Pattern(Regex),
    MatchAll,
}

#[derive(Debug, Clone)]
pub struct EntryFilter {
    fields: Vec<String>,
    matcher: Matcher,
}

impl EntryFilter {
    /// Build a filter. `fields` empty means "search every field".
    pub fn new(pattern: &str, fields: Vec<String>, case_sensitive: bool, use_regex: bool) -> Self {
        let matcher = if pattern.is_empty() {
            Matcher::MatchAll
        } else if use_regex {
            let source = if case_sensitive {
                pattern.to_string()
            } else {
                format!("(?i){pattern}")
            };
            match Regex::new(&source) {
                Ok(re) => Matcher::Pattern(re),
                Err(err) => {
                    warn!(pattern, %err, "invalid filter pattern, matching everything");
                    Matcher::MatchAll
                }
            }
        } else {
            Matcher::Literal {
                needle: if case_sensitive {
                    pattern.to_string()
                } else {
                    pattern.to_lowercase()
                },
                case_sensitive,
            }
        };
        Self { fields, matcher }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        if matches!(self.matcher, Matcher::MatchAll) {
            return true;
        }
        if self.fields.is_empty() {
            entry
                .field_names()
                .iter()
                .any(|field| self.matches_text(&entry.display_field(field)))
        } else {
            self.fields
                .iter()
                .any(|field| self.matches_text(&entry.display_field(field)))
        }
    }

    fn matches_text(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::Literal {
                needle,
                case_sensitive,
            } => {
                if *case_sensitive {
                    text.contains(needle)
                } else {
                    text.to_lowercase().contains(needle)
                }
            }
            Matcher::Pattern(re) => re.is_match(text),
            Matcher::MatchAll => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfmark_domain::{Article, Author, Book};

    fn article(title: &str, author: &str) -> Entry {
        Entry::Article(Article::new(title, vec![Author::from_name(author)]))
    }

    #[test]
    fn literal_match_is_case_insensitive_by_default() {
        let filter = EntryFilter::new("dark matter", vec![], false, false);
        assert!(filter.matches(&article("Dark Matter Halos", "Jane Doe")));
        assert!(!filter.matches(&article("Stellar Populations", "Jane Doe")));
    }

    #[test]
    fn case_sensitive_literal() {
        let filter = EntryFilter::new("Dark", vec![], true, false);
        assert!(filter.matches(&article("Dark Matter", "Jane Doe")));
        assert!(!filter.matches(&article("darkness", "Jane Doe")));
    }

    #[test]
    fn field_targeted_match() {
        let filter = EntryFilter::new("Doe", vec!["authors".into()], false, false);
        assert!(filter.matches(&article("Dark Matter", "Jane Doe")));
        // Pattern occurs in the title but only authors is searched.
        assert!(!filter.matches(&article("Doe Elk and Deer", "Alan Smith")));
    }

    #[test]
    fn regex_match() {
        let filter = EntryFilter::new(r"^Dark .* Halos$", vec!["title".into()], false, true);
        assert!(filter.matches(&article("Dark Matter Halos", "Jane Doe")));
        assert!(!filter.matches(&article("Dark Matter", "Jane Doe")));
    }

    #[test]
    fn invalid_regex_matches_everything() {
        let filter = EntryFilter::new(r"([unclosed", vec![], false, true);
        assert!(filter.matches(&article("Anything", "Jane Doe")));
        assert!(filter.matches(&Entry::Book(Book::new("A Book", vec![]))));
    }

    #[test]
    fn empty_pattern_matches_everything() {
        let filter = EntryFilter::new("", vec!["title".into()], true, false);
        assert!(filter.matches(&article("Whatever", "Jane Doe")));
    }
}
