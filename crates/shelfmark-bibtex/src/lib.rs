//! BibTeX rendering for catalogue entries.
//!
//! Converts entries to BibTeX records with generated citation keys and
//! composes them into an export artifact. Keys that would collide within one
//! composition are disambiguated with a numeric suffix.

pub mod composer;
pub mod convert;
pub mod entry;
pub mod formatter;

pub use composer::Composer;
pub use convert::{citation_key_base, to_bib_entry};
pub use entry::{BibEntry, BibEntryType, BibField};
pub use formatter::{format_entries, format_entry};
