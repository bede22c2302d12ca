//! Domain types for the shelfmark reference catalogue.
//!
//! The entry model is a closed set of concrete record types (article, book,
//! lecture) sharing common field blocks, plus authors and the organizations
//! they are affiliated with. Each record type carries an ordered schema
//! descriptor used by the storage layer; records serialize to name/value rows
//! and deserialize from positional rows, each field block consuming a prefix
//! of the row.

pub mod author;
pub mod entry;
pub mod schema;
pub mod value;

pub use author::{Author, Organization};
pub use entry::{Article, Book, CitationFields, Entry, EntryFields, EntryKind, Lecture};
pub use schema::{
    ColumnDef, ColumnKind, TableSchema, ARTICLE_SCHEMA, AUTHOR_SCHEMA, BOOK_SCHEMA,
    LECTURE_SCHEMA, ORGANIZATION_SCHEMA,
};
pub use value::{FieldValue, RowError};
