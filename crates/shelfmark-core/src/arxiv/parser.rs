//! Atom feed parsing for arXiv query responses.
//!
//! The feed is Atom-namespaced XML with an arXiv extension namespace carrying
//! DOI, journal reference, comment, category and author affiliation. Entries
//! without a title are skipped with a logged error; a response with zero
//! usable entries is a parse failure.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use shelfmark_domain::{Article, Author, Entry};
use tracing::error;

use super::SourceError;

lazy_static! {
    static ref VERSIONED_ID: Regex = Regex::new(r"^(.+?)v(\d+)$").unwrap();
}

/// One parsed feed entry plus the links that do not live on the entry itself.
#[derive(Debug, Clone)]
pub struct FetchedEntry {
    pub entry: Entry,
    /// Link with rel="related" and title="pdf": the downloadable file.
    pub pdf_url: Option<String>,
    /// Link with rel="related" and title="doi": the DOI resolver page.
    pub doi_url: Option<String>,
}

#[derive(Default)]
struct EntryDraft {
    id: String,
    title: String,
    summary: String,
    published: String,
    updated: String,
    doi: Option<String>,
    journal: Option<String>,
    comment: Option<String>,
    prime_category: Option<String>,
    page_url: Option<String>,
    pdf_url: Option<String>,
    doi_url: Option<String>,
    authors: Vec<Author>,
}

/// Parse an Atom feed into entries.
///
/// XML well-formedness failures are fatal for the whole request. An entry
/// missing a title is skipped with a logged error; if nothing usable remains
/// the result is [`SourceError::NoEntries`].
pub fn parse_feed(xml: &str) -> Result<Vec<FetchedEntry>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut results = Vec::new();
    let mut buf = Vec::new();

    let mut in_entry = false;
    let mut in_author = false;
    let mut current_element = String::new();
    let mut draft = EntryDraft::default();
    let mut author_name = String::new();
    let mut author_affiliation: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "entry" {
                    in_entry = true;
                    draft = EntryDraft::default();
                } else if name == "author" && in_entry {
                    in_author = true;
                    author_name.clear();
                    author_affiliation = None;
                } else if in_entry {
                    collect_attributes(&name, e, &mut draft);
                }
                current_element = name;
            }
            // Self-closing elements (<link .../>, <arxiv:primary_category .../>)
            // carry only attributes.
            Ok(Event::Empty(ref e)) => {
                if in_entry {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    collect_attributes(&name, e, &mut draft);
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "entry" {
                    in_entry = false;
                    if let Some(fetched) = finalize_entry(std::mem::take(&mut draft)) {
                        results.push(fetched);
                    }
                } else if name == "author" {
                    if in_author && !author_name.is_empty() {
                        let mut author = Author::from_name(&author_name);
                        author.affiliation = author_affiliation.take();
                        draft.authors.push(author);
                    }
                    in_author = false;
                }
                current_element.clear();
            }
            Ok(Event::Text(e)) => {
                if in_entry {
                    let text = e.unescape().unwrap_or_default().to_string();
                    match current_element.as_str() {
                        "id" => draft.id = text,
                        "title" => draft.title = clean_text(&text),
                        "summary" => draft.summary = clean_text(&text),
                        "published" => draft.published = text,
                        "updated" => draft.updated = text,
                        "name" if in_author => author_name = text,
                        "arxiv:affiliation" if in_author => author_affiliation = Some(text),
                        "arxiv:doi" => draft.doi = Some(text),
                        "arxiv:journal_ref" => draft.journal = Some(clean_text(&text)),
                        "arxiv:comment" => draft.comment = Some(clean_text(&text)),
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Parse(format!("XML parse error: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    if results.is_empty() {
        return Err(SourceError::NoEntries);
    }
    Ok(results)
}

fn collect_attributes(name: &str, element: &BytesStart<'_>, draft: &mut EntryDraft) {
    match name {
        "link" => {
            let mut href = None;
            let mut rel = None;
            let mut title = None;
            for attr in element.attributes().flatten() {
                let value = String::from_utf8_lossy(&attr.value).to_string();
                match attr.key.as_ref() {
                    b"href" => href = Some(value),
                    b"rel" => rel = Some(value),
                    b"title" => title = Some(value),
                    _ => {}
                }
            }
            let Some(href) = href else { return };
            match (rel.as_deref(), title.as_deref()) {
                (Some("alternate"), _) => draft.page_url = Some(href),
                (Some("related"), Some("pdf")) => draft.pdf_url = Some(href),
                (Some("related"), Some("doi")) => draft.doi_url = Some(href),
                _ => {}
            }
        }
        "arxiv:primary_category" => {
            for attr in element.attributes().flatten() {
                if attr.key.as_ref() == b"term" {
                    draft.prime_category =
                        Some(String::from_utf8_lossy(&attr.value).to_string());
                }
            }
        }
        _ => {}
    }
}

fn finalize_entry(draft: EntryDraft) -> Option<FetchedEntry> {
    if draft.title.is_empty() {
        error!("feed entry without a title skipped");
        return None;
    }

    let mut article = Article::new(&draft.title, draft.authors);
    if !draft.summary.is_empty() {
        article.entry.summary = Some(draft.summary);
    }
    article.entry.comment = draft.comment;

    let (arxiv_id, version) = split_versioned_id(&draft.id);
    article.arxiv_id = Some(arxiv_id);
    article.version = Some(version);

    article.date_uploaded = parse_timestamp(&draft.published);
    article.date_updated = parse_timestamp(&draft.updated);
    article.journal = draft.journal;
    article.prime_category = draft.prime_category;
    article.citation.doi = draft.doi;
    article.citation.link = draft.page_url;

    Some(FetchedEntry {
        entry: Entry::Article(article),
        pdf_url: draft.pdf_url,
        doi_url: draft.doi_url,
    })
}

/// Split a feed id like `http://arxiv.org/abs/1234.5678v2` into the arXiv id
/// and its version. The version defaults to 1 when the suffix is absent.
fn split_versioned_id(raw: &str) -> (String, i64) {
    let segment = raw.rsplit('/').next().unwrap_or(raw);
    if let Some(captures) = VERSIONED_ID.captures(segment) {
        let id = captures.get(1).map(|m| m.as_str()).unwrap_or(segment);
        let version = captures
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(1);
        (id.to_string(), version)
    } else {
        (segment.to_string(), 1)
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
