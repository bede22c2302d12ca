//! BibTeX entry structure.

/// BibTeX entry types emitted by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BibEntryType {
    Article,
    Book,
    Misc,
}

impl BibEntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BibEntryType::Article => "article",
            BibEntryType::Book => "book",
            BibEntryType::Misc => "misc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BibField {
    pub key: String,
    pub value: String,
}

/// A single BibTeX record: type, cite key and ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct BibEntry {
    pub entry_type: BibEntryType,
    pub cite_key: String,
    pub fields: Vec<BibField>,
}

impl BibEntry {
    pub fn new(cite_key: String, entry_type: BibEntryType) -> Self {
        Self {
            entry_type,
            cite_key,
            fields: Vec::new(),
        }
    }

    pub fn add_field(&mut self, key: &str, value: &str) {
        self.fields.push(BibField {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// Add a field only when the value is non-empty.
    pub fn add_field_opt(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value {
            if !v.is_empty() {
                self.add_field(key, v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_skip_empty() {
        let mut e = BibEntry::new("Doe2024".into(), BibEntryType::Article);
        e.add_field_opt("journal", Some("Phys. Rev. D"));
        e.add_field_opt("doi", None);
        e.add_field_opt("note", Some(""));
        assert_eq!(e.fields.len(), 1);
        assert_eq!(e.fields[0].key, "journal");
    }
}
