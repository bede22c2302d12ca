//! BibTeX formatting.
//!
//! Renders [`BibEntry`] records to text. Values are brace-delimited except for
//! purely numeric ones, which keeps years and editions unquoted.

use crate::entry::BibEntry;

/// Format a single BibTeX entry to string.
pub fn format_entry(entry: &BibEntry) -> String {
    let mut result = String::new();

    result.push('@');
    result.push_str(entry.entry_type.as_str());
    result.push('{');
    result.push_str(&entry.cite_key);
    result.push(',');
    result.push('\n');

    for field in &entry.fields {
        result.push_str("    ");
        result.push_str(&field.key);
        result.push_str(" = ");
        result.push_str(&format_field_value(&field.value));
        result.push(',');
        result.push('\n');
    }

    result.push('}');
    result
}

/// Format multiple entries to a single BibTeX string.
pub fn format_entries(entries: &[BibEntry]) -> String {
    entries
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_field_value(value: &str) -> String {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return value.to_string();
    }
    format!("{{{}}}", value)
}
