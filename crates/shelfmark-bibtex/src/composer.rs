//! BibTeX export composer.
//!
//! Collects entries, assigns disambiguated citation keys and renders the
//! export artifact. The rendered text of an individual entry can be
//! overridden before composing, mirroring manual tweaks in an export dialog.

use std::fs;
use std::io;
use std::path::Path;

use shelfmark_domain::Entry;
use tracing::error;

use crate::convert::{citation_key_base, to_bib_entry};
use crate::formatter::format_entry;

struct ComposerItem {
    entry: Entry,
    bibtex: String,
}

/// Composes a BibTeX file from catalogue entries.
#[derive(Default)]
pub struct Composer {
    items: Vec<ComposerItem>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Entries already present (by equality) are skipped.
    /// The citation key is assigned on insertion: when the base key is
    /// already taken, a numeric suffix is appended.
    pub fn add_entry(&mut self, entry: &Entry) {
        if self.items.iter().any(|item| item.entry == *entry) {
            return;
        }
        let key = self.unique_key(&citation_key_base(entry));
        let bibtex = format_entry(&to_bib_entry(entry, key));
        self.items.push(ComposerItem {
            entry: entry.clone(),
            bibtex,
        });
    }

    pub fn remove_entry(&mut self, entry: &Entry) {
        match self.items.iter().position(|item| item.entry == *entry) {
            Some(idx) => {
                self.items.remove(idx);
            }
            None => error!(title = entry.title(), "entry not found in composer"),
        }
    }

    /// Override the rendered BibTeX of a previously added entry.
    pub fn set_bibtex(&mut self, entry: &Entry, bibtex: String) {
        match self.items.iter_mut().find(|item| item.entry == *entry) {
            Some(item) => item.bibtex = bibtex,
            None => error!(title = entry.title(), "entry not found in composer"),
        }
    }

    pub fn bibtex_for(&self, entry: &Entry) -> Option<&str> {
        self.items
            .iter()
            .find(|item| item.entry == *entry)
            .map(|item| item.bibtex.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Concatenate all rendered entries, blank-line separated.
    pub fn compose(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            out.push_str(&item.bibtex);
            out.push('\n');
            out.push('\n');
        }
        out.trim_end().to_string()
    }

    pub fn write(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.compose())
    }

    fn unique_key(&self, base: &str) -> String {
        let taken = |key: &str| {
            self.items
                .iter()
                .any(|item| cite_key_of(&item.bibtex) == Some(key))
        };
        if !taken(base) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Extract the cite key from a rendered record ("@type{key,").
fn cite_key_of(bibtex: &str) -> Option<&str> {
    let start = bibtex.find('{')? + 1;
    let end = bibtex[start..].find(',')? + start;
    Some(bibtex[start..end].trim())
}
