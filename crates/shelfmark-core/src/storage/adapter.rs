//! Generic select/insert/update/delete helpers over rusqlite, parameterized
//! by table name and schema descriptor. Statements run in two phases (prepare,
//! then execute) and all values are bound, never interpolated.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection};
use shelfmark_domain::{ColumnDef, FieldValue, TableSchema};
use tracing::debug;

use super::StoreError;

/// A bound WHERE clause: expression text plus its parameters.
#[derive(Debug, Clone)]
pub struct SqlFilter {
    pub(crate) clause: String,
    pub(crate) params: Vec<FieldValue>,
}

impl SqlFilter {
    pub fn eq(column: &str, value: FieldValue) -> Self {
        Self {
            clause: format!("{column} = ?"),
            params: vec![value],
        }
    }

    pub fn id_in(ids: &[i64]) -> Self {
        let placeholders = vec!["?"; ids.len()].join(", ");
        Self {
            clause: format!("id IN ({placeholders})"),
            params: ids.iter().map(|&id| FieldValue::Int(id)).collect(),
        }
    }

    pub fn and(mut self, other: SqlFilter) -> Self {
        self.clause = format!("({}) AND ({})", self.clause, other.clause);
        self.params.extend(other.params);
        self
    }
}

/// Thin adapter over a SQLite connection.
pub struct StoreAdapter {
    conn: Connection,
}

impl StoreAdapter {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Open(e.to_string()))?;
        Self::init(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Open(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| StoreError::Open(format!("pragma: {e}")))?;
        Ok(Self { conn })
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create a table from its schema descriptor. The leading id column
    /// becomes the store-assigned primary key.
    pub fn create_table(
        &self,
        schema: &TableSchema,
        if_not_exists: bool,
    ) -> Result<(), StoreError> {
        let mut columns = Vec::with_capacity(schema.columns.len());
        for (i, column) in schema.columns.iter().enumerate() {
            if i == 0 {
                columns.push(format!(
                    "{} INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL",
                    column.name
                ));
            } else {
                columns.push(format!("{} {}", column.name, column.kind.sql_type()));
            }
        }
        if !schema.unique.is_empty() {
            columns.push(format!("UNIQUE({})", schema.unique.join(", ")));
        }
        let sql = format!(
            "CREATE TABLE {}{} ({})",
            if if_not_exists { "IF NOT EXISTS " } else { "" },
            schema.table,
            columns.join(", ")
        );
        self.conn
            .execute(&sql, [])
            .map_err(|e| StoreError::Query(format!("create {}: {e}", schema.table)))?;
        Ok(())
    }

    /// Run a raw statement batch (join tables, metadata table).
    pub fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| StoreError::Query(format!("batch: {e}")))
    }

    /// SELECT columns FROM table [WHERE filter]. Empty column list selects
    /// every column in table order.
    pub fn select(
        &self,
        table: &str,
        columns: &[&str],
        filter: Option<&SqlFilter>,
    ) -> Result<Vec<Vec<FieldValue>>, StoreError> {
        let column_list = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        };
        let mut sql = format!("SELECT {column_list} FROM {table}");
        if let Some(filter) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.clause);
        }
        let params = filter.map(|f| f.params.as_slice()).unwrap_or(&[]);
        self.query_rows(&sql, params)
    }

    /// SELECT table.columns FROM table JOIN ref_table ON table.id_col =
    /// ref_table.ref_col [WHERE filter]. Used for the entry–author joins.
    pub fn select_joined(
        &self,
        table: &str,
        ref_table: &str,
        id_col: &str,
        ref_col: &str,
        columns: &[&str],
        filter: Option<&SqlFilter>,
    ) -> Result<Vec<Vec<FieldValue>>, StoreError> {
        let column_list = if columns.is_empty() {
            format!("{table}.*")
        } else {
            columns
                .iter()
                .map(|c| format!("{table}.{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut sql = format!(
            "SELECT {column_list} FROM {table} JOIN {ref_table} ON {table}.{id_col} = {ref_table}.{ref_col}"
        );
        if let Some(filter) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.clause);
        }
        let params = filter.map(|f| f.params.as_slice()).unwrap_or(&[]);
        self.query_rows(&sql, params)
    }

    /// Insert one row; returns the assigned rowid. With `or_ignore`, a
    /// constraint conflict leaves the table unchanged and returns 0 changes,
    /// reported here as `Ok(None)`.
    pub fn insert_row(
        &self,
        table: &str,
        row: &[(&str, FieldValue)],
        or_ignore: bool,
    ) -> Result<Option<i64>, StoreError> {
        let sql = insert_sql(table, row, or_ignore);
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| StoreError::Query(format!("prepare insert {table}: {e}")))?;
        let changed = stmt
            .execute(params_from_iter(row.iter().map(|(_, v)| sql_value(v))))
            .map_err(|e| StoreError::Query(format!("insert {table}: {e}")))?;
        if changed == 0 {
            return Ok(None);
        }
        Ok(Some(self.conn.last_insert_rowid()))
    }

    /// Insert many rows of identical shape inside one transaction, reusing a
    /// single prepared statement. Returns the assigned rowid per row, read
    /// back after each execution; no assumption of gap-free id sequences.
    pub fn insert_many(
        &self,
        table: &str,
        rows: &[Vec<(&str, FieldValue)>],
        or_ignore: bool,
    ) -> Result<Vec<i64>, StoreError> {
        let Some(first) = rows.first() else {
            return Ok(Vec::new());
        };
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| StoreError::Query(format!("begin tx: {e}")))?;
        let sql = insert_sql(table, first, or_ignore);
        let mut ids = Vec::with_capacity(rows.len());
        {
            let mut stmt = tx
                .prepare(&sql)
                .map_err(|e| StoreError::Query(format!("prepare insert {table}: {e}")))?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter().map(|(_, v)| sql_value(v))))
                    .map_err(|e| StoreError::Query(format!("insert {table}: {e}")))?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()
            .map_err(|e| StoreError::Query(format!("commit: {e}")))?;
        debug!(table, rows = ids.len(), "bulk insert committed");
        Ok(ids)
    }

    /// UPDATE table SET fields WHERE filter; returns affected row count.
    pub fn update(
        &self,
        table: &str,
        fields: &[(&str, FieldValue)],
        filter: &SqlFilter,
    ) -> Result<usize, StoreError> {
        let assignments = fields
            .iter()
            .map(|(name, _)| format!("{name} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {table} SET {assignments} WHERE {}", filter.clause);
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| StoreError::Query(format!("prepare update {table}: {e}")))?;
        let values = fields
            .iter()
            .map(|(_, v)| sql_value(v))
            .chain(filter.params.iter().map(sql_value));
        stmt.execute(params_from_iter(values))
            .map_err(|e| StoreError::Query(format!("update {table}: {e}")))
    }

    /// DELETE FROM table WHERE filter; returns affected row count.
    pub fn delete(&self, table: &str, filter: &SqlFilter) -> Result<usize, StoreError> {
        let sql = format!("DELETE FROM {table} WHERE {}", filter.clause);
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| StoreError::Query(format!("prepare delete {table}: {e}")))?;
        stmt.execute(params_from_iter(filter.params.iter().map(sql_value)))
            .map_err(|e| StoreError::Query(format!("delete {table}: {e}")))
    }

    /// Live column names of a table, for schema-migration checks.
    pub fn table_info(&self, table: &str) -> Result<Vec<String>, StoreError> {
        let sql = format!("PRAGMA table_info({table})");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| StoreError::Query(format!("table_info {table}: {e}")))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .map_err(|e| StoreError::Query(format!("table_info {table}: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Query(format!("table_info {table}: {e}")))?;
        Ok(names)
    }

    /// Add a column to a live table. Existing columns are never removed or
    /// retyped.
    pub fn add_column(&self, table: &str, column: &ColumnDef) -> Result<(), StoreError> {
        let sql = format!(
            "ALTER TABLE {table} ADD COLUMN {} {}",
            column.name,
            column.kind.sql_type()
        );
        self.conn
            .execute(&sql, [])
            .map_err(|e| StoreError::Query(format!("add column {table}.{}: {e}", column.name)))?;
        Ok(())
    }

    pub fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    fn query_rows(
        &self,
        sql: &str,
        params: &[FieldValue],
    ) -> Result<Vec<Vec<FieldValue>>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| StoreError::Query(format!("prepare: {e} (sql: {sql})")))?;
        let width = stmt.column_count();
        let rows = stmt
            .query_map(params_from_iter(params.iter().map(sql_value)), |row| {
                let mut values = Vec::with_capacity(width);
                for i in 0..width {
                    values.push(field_value(row.get_ref(i)?));
                }
                Ok(values)
            })
            .map_err(|e| StoreError::Query(format!("query: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Query(format!("row: {e}")))?;
        Ok(rows)
    }
}

fn insert_sql(table: &str, row: &[(&str, FieldValue)], or_ignore: bool) -> String {
    let columns = row.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", ");
    let placeholders = vec!["?"; row.len()].join(", ");
    format!(
        "INSERT {}INTO {table} ({columns}) VALUES ({placeholders})",
        if or_ignore { "OR IGNORE " } else { "" }
    )
}

fn sql_value(value: &FieldValue) -> rusqlite::types::Value {
    match value {
        FieldValue::Null => rusqlite::types::Value::Null,
        FieldValue::Int(i) => rusqlite::types::Value::Integer(*i),
        FieldValue::Text(s) => rusqlite::types::Value::Text(s.clone()),
    }
}

fn field_value(value: ValueRef<'_>) -> FieldValue {
    match value {
        ValueRef::Null => FieldValue::Null,
        ValueRef::Integer(i) => FieldValue::Int(i),
        ValueRef::Real(f) => FieldValue::Text(f.to_string()),
        ValueRef::Text(t) => FieldValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => FieldValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfmark_domain::AUTHOR_SCHEMA;

    fn adapter_with_authors() -> StoreAdapter {
        let adapter = StoreAdapter::open_in_memory().unwrap();
        adapter.create_table(&AUTHOR_SCHEMA, true).unwrap();
        adapter
    }

    fn author_row(first: &str, last: &str) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("first_name", FieldValue::Text(first.into())),
            ("middle_names", FieldValue::Text(String::new())),
            ("last_name", FieldValue::Text(last.into())),
        ]
    }

    #[test]
    fn create_insert_select_round_trip() {
        let adapter = adapter_with_authors();
        let id = adapter
            .insert_row("authors", &author_row("Jane", "Doe"), false)
            .unwrap()
            .unwrap();
        assert!(id > 0);

        let rows = adapter
            .select(
                "authors",
                &["id", "first_name", "last_name"],
                Some(&SqlFilter::eq("last_name", "Doe".into())),
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], FieldValue::Int(id));
        assert_eq!(rows[0][1], FieldValue::Text("Jane".into()));
    }

    #[test]
    fn insert_or_ignore_reports_skipped_rows() {
        let adapter = adapter_with_authors();
        adapter
            .insert_row("authors", &author_row("Jane", "Doe"), false)
            .unwrap();
        // Unique name triple: second insert is ignored.
        let second = adapter
            .insert_row("authors", &author_row("Jane", "Doe"), true)
            .unwrap();
        assert_eq!(second, None);
        let rows = adapter.select("authors", &["id"], None).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn plain_insert_conflict_is_a_query_error() {
        let adapter = adapter_with_authors();
        adapter
            .insert_row("authors", &author_row("Jane", "Doe"), false)
            .unwrap();
        let err = adapter
            .insert_row("authors", &author_row("Jane", "Doe"), false)
            .unwrap_err();
        assert!(matches!(err, StoreError::Query(_)));
    }

    #[test]
    fn update_and_delete_by_filter() {
        let adapter = adapter_with_authors();
        let id = adapter
            .insert_row("authors", &author_row("Jane", "Doe"), false)
            .unwrap()
            .unwrap();
        let changed = adapter
            .update(
                "authors",
                &[("bio", FieldValue::Text("Physicist".into()))],
                &SqlFilter::eq("id", FieldValue::Int(id)),
            )
            .unwrap();
        assert_eq!(changed, 1);

        let deleted = adapter
            .delete("authors", &SqlFilter::eq("id", FieldValue::Int(id)))
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(adapter.select("authors", &[], None).unwrap().is_empty());
    }

    #[test]
    fn insert_many_returns_one_id_per_row() {
        let adapter = adapter_with_authors();
        let last_names: Vec<String> = (0..12).map(|i| format!("Doe{i}")).collect();
        let rows: Vec<_> = last_names
            .iter()
            .map(|last| author_row("Jane", last))
            .collect();
        let ids = adapter.insert_many("authors", &rows, false).unwrap();
        assert_eq!(ids.len(), 12);
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 12, "ids are distinct");
    }

    #[test]
    fn table_info_lists_live_columns() {
        let adapter = adapter_with_authors();
        let columns = adapter.table_info("authors").unwrap();
        assert!(columns.contains(&"first_name".to_string()));
        assert!(columns.contains(&"affiliation_id".to_string()));
    }

    #[test]
    fn add_column_extends_live_table() {
        let adapter = adapter_with_authors();
        adapter
            .add_column(
                "authors",
                &shelfmark_domain::schema::col("orcid", shelfmark_domain::ColumnKind::Text),
            )
            .unwrap();
        let columns = adapter.table_info("authors").unwrap();
        assert!(columns.contains(&"orcid".to_string()));
    }

    #[test]
    fn id_in_filter() {
        let adapter = adapter_with_authors();
        let mut ids = Vec::new();
        for i in 0..4 {
            let last = format!("Name{i}");
            let row = vec![
                ("first_name", FieldValue::Text("A".into())),
                ("middle_names", FieldValue::Text(String::new())),
                ("last_name", FieldValue::Text(last)),
            ];
            ids.push(adapter.insert_row("authors", &row, false).unwrap().unwrap());
        }
        let deleted = adapter
            .delete("authors", &SqlFilter::id_in(&ids[..2]))
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(adapter.select("authors", &[], None).unwrap().len(), 2);
    }
}
