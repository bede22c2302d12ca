//! Schema descriptors for the persisted tables.
//!
//! Each concrete record type composes its column list from a fixed ordered
//! sequence of shared blocks followed by its own columns. Descriptors are
//! built once at startup and passed by reference into the storage layer;
//! there is no mutable process-wide registry.

use lazy_static::lazy_static;

/// Semantic column type. Dates and timestamps are stored as ISO-8601 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
    Date,
    DateTime,
}

impl ColumnKind {
    /// SQL storage type for this column.
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Text | ColumnKind::Date | ColumnKind::DateTime => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
}

pub const fn col(name: &'static str, kind: ColumnKind) -> ColumnDef {
    ColumnDef { name, kind }
}

/// Descriptor for one persisted table. The first column is always the
/// `id INTEGER PRIMARY KEY` assigned by the store.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub table: &'static str,
    pub columns: Vec<ColumnDef>,
    /// Column groups with a table-level UNIQUE constraint.
    pub unique: &'static [&'static str],
}

impl TableSchema {
    fn compose(
        table: &'static str,
        blocks: &[&[ColumnDef]],
        unique: &'static [&'static str],
    ) -> Self {
        let mut columns = vec![col("id", ColumnKind::Integer)];
        for block in blocks {
            columns.extend_from_slice(block);
        }
        Self {
            table,
            columns,
            unique,
        }
    }

    /// Column names excluding the store-assigned id.
    pub fn data_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().skip(1).map(|c| c.name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }
}

/// Columns shared by every entry type.
pub const ENTRY_COLUMNS: [ColumnDef; 5] = [
    col("title", ColumnKind::Text),
    col("summary", ColumnKind::Text),
    col("file_name", ColumnKind::Text),
    col("comment", ColumnKind::Text),
    col("preview_page", ColumnKind::Integer),
];

/// Columns shared by citable entry types.
pub const CITATION_COLUMNS: [ColumnDef; 3] = [
    col("doi", ColumnKind::Text),
    col("link", ColumnKind::Text),
    col("date_published", ColumnKind::Date),
];

pub const ARTICLE_COLUMNS: [ColumnDef; 6] = [
    col("arxiv_id", ColumnKind::Text),
    col("version", ColumnKind::Integer),
    col("journal", ColumnKind::Text),
    col("date_uploaded", ColumnKind::DateTime),
    col("date_updated", ColumnKind::DateTime),
    col("prime_category", ColumnKind::Text),
];

pub const BOOK_COLUMNS: [ColumnDef; 3] = [
    col("isbn", ColumnKind::Text),
    col("publisher", ColumnKind::Text),
    col("edition", ColumnKind::Integer),
];

pub const LECTURE_COLUMNS: [ColumnDef; 2] = [
    col("school", ColumnKind::Text),
    col("course", ColumnKind::Text),
];

pub const AUTHOR_COLUMNS: [ColumnDef; 7] = [
    col("first_name", ColumnKind::Text),
    col("middle_names", ColumnKind::Text),
    col("last_name", ColumnKind::Text),
    col("birth_date", ColumnKind::Date),
    col("death_date", ColumnKind::Date),
    col("bio", ColumnKind::Text),
    col("affiliation_id", ColumnKind::Integer),
];

pub const ORGANIZATION_COLUMNS: [ColumnDef; 4] = [
    col("name", ColumnKind::Text),
    col("short_name", ColumnKind::Text),
    col("address", ColumnKind::Text),
    col("info", ColumnKind::Text),
];

lazy_static! {
    pub static ref ARTICLE_SCHEMA: TableSchema = TableSchema::compose(
        "articles",
        &[&ENTRY_COLUMNS, &CITATION_COLUMNS, &ARTICLE_COLUMNS],
        &[],
    );
    pub static ref BOOK_SCHEMA: TableSchema = TableSchema::compose(
        "books",
        &[&ENTRY_COLUMNS, &CITATION_COLUMNS, &BOOK_COLUMNS],
        &[],
    );
    pub static ref LECTURE_SCHEMA: TableSchema = TableSchema::compose(
        "lectures",
        &[&ENTRY_COLUMNS, &CITATION_COLUMNS, &LECTURE_COLUMNS],
        &[],
    );
    pub static ref AUTHOR_SCHEMA: TableSchema = TableSchema::compose(
        "authors",
        &[&AUTHOR_COLUMNS],
        &["first_name", "middle_names", "last_name"],
    );
    pub static ref ORGANIZATION_SCHEMA: TableSchema =
        TableSchema::compose("organizations", &[&ORGANIZATION_COLUMNS], &["name"]);
}
