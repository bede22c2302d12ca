//! Authors and the organizations they are affiliated with.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schema::AUTHOR_COLUMNS;
use crate::value::{FieldValue, RowError};

/// An author of catalogued works. Authors are shared between entries via a
/// join table; deleting an entry never deletes its authors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: Option<i64>,
    pub first_name: String,
    pub middle_names: Vec<String>,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub bio: Option<String>,
    /// Weak reference into the organizations table. Not owned: the referenced
    /// row may be deleted independently, leaving the key dangling.
    pub affiliation_id: Option<i64>,
    /// Resolved organization name, populated on load or by metadata parsers.
    pub affiliation: Option<String>,
}

impl Author {
    /// Build an author from a space-separated name: first word is the first
    /// name, last word the last name, anything between are middle names.
    pub fn from_name(name: &str) -> Self {
        let mut parts = name.split_whitespace().map(str::to_string);
        let first_name = parts.next().unwrap_or_default();
        let rest: Vec<String> = parts.collect();
        let (middle_names, last_name) = match rest.split_last() {
            Some((last, middles)) => (middles.to_vec(), last.clone()),
            None => (Vec::new(), String::new()),
        };
        Self {
            first_name,
            middle_names,
            last_name,
            ..Default::default()
        }
    }

    /// Full name: first, middle and last names space-joined.
    pub fn full_name(&self) -> String {
        let mut parts = vec![self.first_name.as_str()];
        parts.extend(self.middle_names.iter().map(String::as_str));
        if !self.last_name.is_empty() {
            parts.push(&self.last_name);
        }
        parts.join(" ")
    }

    /// Short name: first and last names only.
    pub fn short_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    /// Name→value mapping for insert, aligned with [`AUTHOR_COLUMNS`].
    pub fn to_row(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("first_name", FieldValue::Text(self.first_name.clone())),
            (
                "middle_names",
                if self.middle_names.is_empty() {
                    // Empty text, not NULL: the name triple carries a UNIQUE
                    // constraint and NULLs never compare equal in SQLite.
                    FieldValue::Text(String::new())
                } else {
                    FieldValue::Text(self.middle_names.join(" "))
                },
            ),
            ("last_name", FieldValue::Text(self.last_name.clone())),
            ("birth_date", FieldValue::from_opt_date(self.birth_date)),
            ("death_date", FieldValue::from_opt_date(self.death_date)),
            ("bio", FieldValue::from_opt_text(self.bio.as_deref())),
            (
                "affiliation_id",
                FieldValue::from_opt_int(self.affiliation_id),
            ),
        ]
    }

    /// Deserialize from a positional row, consuming the author column prefix
    /// and returning the unconsumed remainder.
    pub fn take(row: &[FieldValue]) -> Result<(Self, &[FieldValue]), RowError> {
        let width = 1 + AUTHOR_COLUMNS.len();
        if row.len() < width {
            return Err(RowError::ShortRow {
                table: "authors",
                expected: width,
                got: row.len(),
            });
        }
        let (head, rest) = row.split_at(width);
        let middle_names = head[2]
            .text()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        let author = Self {
            id: head[0].int(),
            first_name: head[1].text().unwrap_or_default(),
            middle_names,
            last_name: head[3].text().unwrap_or_default(),
            birth_date: head[4].date(),
            death_date: head[5].date(),
            bio: head[6].text(),
            affiliation_id: head[7].int(),
            affiliation: None,
        };
        Ok((author, rest))
    }
}

/// An institute, university, company etc. Referenced weakly from authors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Option<i64>,
    pub name: String,
    pub short_name: String,
    pub address: Option<String>,
    pub info: Option<String>,
}

impl Organization {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            short_name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn to_row(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("name", FieldValue::Text(self.name.clone())),
            ("short_name", FieldValue::Text(self.short_name.clone())),
            ("address", FieldValue::from_opt_text(self.address.as_deref())),
            ("info", FieldValue::from_opt_text(self.info.as_deref())),
        ]
    }

    pub fn take(row: &[FieldValue]) -> Result<(Self, &[FieldValue]), RowError> {
        if row.len() < 5 {
            return Err(RowError::ShortRow {
                table: "organizations",
                expected: 5,
                got: row.len(),
            });
        }
        let (head, rest) = row.split_at(5);
        let org = Self {
            id: head[0].int(),
            name: head[1].text().unwrap_or_default(),
            short_name: head[2].text().unwrap_or_default(),
            address: head[3].text(),
            info: head[4].text(),
        };
        Ok((org, rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_splitting() {
        let a = Author::from_name("John Ronald Reuel Tolkien");
        assert_eq!(a.first_name, "John");
        assert_eq!(a.middle_names, vec!["Ronald", "Reuel"]);
        assert_eq!(a.last_name, "Tolkien");
        assert_eq!(a.full_name(), "John Ronald Reuel Tolkien");
        assert_eq!(a.short_name(), "John Tolkien");
    }

    #[test]
    fn single_word_name() {
        let a = Author::from_name("Plato");
        assert_eq!(a.first_name, "Plato");
        assert!(a.last_name.is_empty());
        assert!(a.middle_names.is_empty());
        assert_eq!(a.short_name(), "Plato");
    }

    #[test]
    fn row_round_trip() {
        let mut a = Author::from_name("Emmy Amalie Noether");
        a.id = Some(3);
        a.bio = Some("Mathematician".into());
        let mut row = vec![FieldValue::Int(3)];
        row.extend(a.to_row().into_iter().map(|(_, v)| v));
        let (back, rest) = Author::take(&row).unwrap();
        assert!(rest.is_empty());
        assert_eq!(back, a);
    }

    #[test]
    fn short_row_is_an_error() {
        let row = vec![FieldValue::Int(1), FieldValue::Text("A".into())];
        assert!(matches!(
            Author::take(&row),
            Err(RowError::ShortRow { table: "authors", .. })
        ));
    }
}
