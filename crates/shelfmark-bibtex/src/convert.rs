//! Catalogue entry → BibTeX record conversion.

use chrono::Datelike;
use shelfmark_domain::{Author, Entry};

use crate::entry::{BibEntry, BibEntryType};

/// Format an author as "Last, First Middle" for BibTeX author lists.
fn bibtex_author(author: &Author) -> String {
    let mut given = vec![author.first_name.clone()];
    given.extend(author.middle_names.iter().cloned());
    let given = given.join(" ");
    if author.last_name.is_empty() {
        given
    } else if given.is_empty() {
        author.last_name.clone()
    } else {
        format!("{}, {}", author.last_name, given)
    }
}

fn author_list(entry: &Entry) -> Option<String> {
    if entry.authors().is_empty() {
        return None;
    }
    Some(
        entry
            .authors()
            .iter()
            .map(bibtex_author)
            .collect::<Vec<_>>()
            .join(" and "),
    )
}

/// Year for the citation label and the `year` field: publication year if
/// known, otherwise (for articles) the arXiv upload year.
fn entry_year(entry: &Entry) -> Option<i32> {
    if let Some(date) = entry.citation().date_published {
        return Some(date.year());
    }
    if let Entry::Article(article) = entry {
        if let Some(uploaded) = article.date_uploaded {
            return Some(uploaded.year());
        }
    }
    None
}

/// Base citation key: first author's last name + year, non-alphanumeric
/// characters stripped. Disambiguation against other keys in the same
/// composition is the composer's job.
pub fn citation_key_base(entry: &Entry) -> String {
    let name = entry
        .authors()
        .first()
        .map(|a| {
            if a.last_name.is_empty() {
                a.first_name.clone()
            } else {
                a.last_name.clone()
            }
        })
        .unwrap_or_default();
    let mut key: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if key.is_empty() {
        key.push_str("entry");
    }
    if let Some(year) = entry_year(entry) {
        key.push_str(&year.to_string());
    }
    key
}

/// Convert an entry to a BibTeX record under the given cite key.
pub fn to_bib_entry(entry: &Entry, cite_key: String) -> BibEntry {
    let entry_type = match entry {
        Entry::Article(_) => BibEntryType::Article,
        Entry::Book(_) => BibEntryType::Book,
        Entry::Lecture(_) => BibEntryType::Misc,
    };
    let mut bib = BibEntry::new(cite_key, entry_type);

    bib.add_field_opt("author", author_list(entry).as_deref());
    bib.add_field("title", entry.title());

    match entry {
        Entry::Article(article) => {
            bib.add_field_opt("journal", article.journal.as_deref());
            if let Some(arxiv_id) = &article.arxiv_id {
                bib.add_field("eprint", arxiv_id);
                bib.add_field("archiveprefix", "arXiv");
                bib.add_field_opt("primaryclass", article.prime_category.as_deref());
            }
        }
        Entry::Book(book) => {
            bib.add_field_opt("publisher", book.publisher.as_deref());
            bib.add_field_opt("edition", book.edition.map(|e| e.to_string()).as_deref());
            bib.add_field_opt("isbn", book.isbn.as_deref());
        }
        Entry::Lecture(lecture) => {
            let how = match (&lecture.school, &lecture.course) {
                (Some(school), Some(course)) => Some(format!("Lecture notes, {course}, {school}")),
                (Some(school), None) => Some(format!("Lecture notes, {school}")),
                (None, Some(course)) => Some(format!("Lecture notes, {course}")),
                (None, None) => None,
            };
            bib.add_field_opt("howpublished", how.as_deref());
        }
    }

    bib.add_field_opt("doi", entry.citation().doi.as_deref());
    bib.add_field_opt("url", entry.citation().link.as_deref());
    bib.add_field_opt(
        "year",
        entry_year(entry).map(|y| y.to_string()).as_deref(),
    );
    bib.add_field_opt("note", entry.fields().comment.as_deref());

    bib
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shelfmark_domain::{Article, Book};

    fn article() -> Entry {
        let mut a = Article::new(
            "On Things",
            vec![
                Author::from_name("Jane Mary Doe"),
                Author::from_name("John Smith"),
            ],
        );
        a.citation.date_published = NaiveDate::from_ymd_opt(2024, 5, 1);
        a.citation.doi = Some("10.1000/things".into());
        a.arxiv_id = Some("2405.00001".into());
        a.prime_category = Some("hep-th".into());
        a.journal = Some("JHEP".into());
        Entry::Article(a)
    }

    #[test]
    fn citation_key_is_lastname_year() {
        assert_eq!(citation_key_base(&article()), "Doe2024");
    }

    #[test]
    fn citation_key_without_authors_or_year() {
        let book = Entry::Book(Book::new("Anonymous Tract", vec![]));
        assert_eq!(citation_key_base(&book), "entry");
    }

    #[test]
    fn article_record_fields() {
        let bib = to_bib_entry(&article(), "Doe2024".into());
        assert_eq!(bib.entry_type, BibEntryType::Article);
        let get = |k: &str| {
            bib.fields
                .iter()
                .find(|f| f.key == k)
                .map(|f| f.value.clone())
        };
        assert_eq!(
            get("author").as_deref(),
            Some("Doe, Jane Mary and Smith, John")
        );
        assert_eq!(get("eprint").as_deref(), Some("2405.00001"));
        assert_eq!(get("archiveprefix").as_deref(), Some("arXiv"));
        assert_eq!(get("primaryclass").as_deref(), Some("hep-th"));
        assert_eq!(get("year").as_deref(), Some("2024"));
    }

    #[test]
    fn lecture_renders_as_misc() {
        let mut lecture = shelfmark_domain::Lecture::new("QFT I", vec![]);
        lecture.school = Some("ETH".into());
        lecture.course = Some("PHY501".into());
        let bib = to_bib_entry(&Entry::Lecture(lecture), "entry".into());
        assert_eq!(bib.entry_type, BibEntryType::Misc);
        assert!(bib
            .fields
            .iter()
            .any(|f| f.key == "howpublished" && f.value == "Lecture notes, PHY501, ETH"));
    }
}
