//! Catalogue synchronizer: reconciles the change cache against the store.
//!
//! `load()` bulk-replaces the cache from the store; `save()` drains the three
//! pending queues in order add → delete → edit. Small queues are submitted
//! per entry; once a queue reaches [`BULK_THRESHOLD`] its entries are grouped
//! by concrete type and go through a bulk path per type. A failure on one
//! entry never blocks the rest of its queue.

use std::collections::HashMap;

use shelfmark_domain::{
    Author, Entry, EntryKind, FieldValue, AUTHOR_SCHEMA, ORGANIZATION_SCHEMA,
};
use std::path::Path;
use tracing::{error, info, warn};

use super::adapter::{SqlFilter, StoreAdapter};
use super::StoreError;
use crate::cache::ChangeCache;

/// Data model version of the running code. Stored in the metadata table and
/// checked on load.
pub const DATA_MODEL_VERSION: i64 = 1;

/// Queue size at which `save()` switches from per-entry to bulk submission.
pub const BULK_THRESHOLD: usize = 10;

const VERSION_KEY: &str = "data_model_version";

/// Lifecycle of a catalogue: `Dirty` is any state with a non-empty pending
/// queue; `load()` and `save()` both transition back toward `Loaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogueState {
    Uninitialized,
    Loaded,
    Dirty,
}

/// Result of one `save()` call: the conjunction of all individual outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    pub submitted: usize,
    pub failed: usize,
}

impl SaveOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// A catalogue: store adapter plus change cache.
pub struct Catalogue {
    store: StoreAdapter,
    cache: ChangeCache,
    loaded: bool,
}

impl Catalogue {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::with_store(StoreAdapter::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_store(StoreAdapter::open_in_memory()?)
    }

    /// Wrap an already-opened store: creates any missing tables and stamps
    /// the data model version on first creation.
    pub fn with_store(store: StoreAdapter) -> Result<Self, StoreError> {
        for kind in EntryKind::ALL {
            store.create_table(kind.schema(), true)?;
        }
        store.create_table(&AUTHOR_SCHEMA, true)?;
        store.create_table(&ORGANIZATION_SCHEMA, true)?;
        let mut batch = String::new();
        for kind in EntryKind::ALL {
            batch.push_str(&format!(
                "CREATE TABLE IF NOT EXISTS {join} (
                    {entry_col} INTEGER NOT NULL REFERENCES {table}(id) ON DELETE CASCADE,
                    author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
                    PRIMARY KEY ({entry_col}, author_id)
                );\n",
                join = kind.author_join_table(),
                entry_col = kind.join_entry_column(),
                table = kind.table(),
            ));
        }
        batch.push_str(
            "CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT
            );\n",
        );
        batch.push_str(&format!(
            "INSERT OR IGNORE INTO metadata (key, value) VALUES ('{VERSION_KEY}', '{DATA_MODEL_VERSION}');\n"
        ));
        store.execute_batch(&batch)?;
        Ok(Self {
            store,
            cache: ChangeCache::new(),
            loaded: false,
        })
    }

    pub fn cache(&self) -> &ChangeCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ChangeCache {
        &mut self.cache
    }

    pub fn store(&self) -> &StoreAdapter {
        &self.store
    }

    pub fn state(&self) -> CatalogueState {
        if !self.loaded {
            CatalogueState::Uninitialized
        } else if self.cache.is_diverged() {
            CatalogueState::Dirty
        } else {
            CatalogueState::Loaded
        }
    }

    /// Data model version recorded in the store.
    pub fn stored_version(&self) -> Result<i64, StoreError> {
        let rows = self.store.select(
            "metadata",
            &["value"],
            Some(&SqlFilter::eq("key", VERSION_KEY.into())),
        )?;
        Ok(rows
            .first()
            .and_then(|row| row.first())
            .and_then(FieldValue::int)
            .unwrap_or(DATA_MODEL_VERSION))
    }

    /// Bulk-load the store into the cache, replacing it wholesale.
    ///
    /// A store written by a newer data model is refused. An older store is
    /// read forward-compatibly after a best-effort column-add migration that
    /// never removes or retypes existing columns.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let stored = self.stored_version()?;
        if stored > DATA_MODEL_VERSION {
            return Err(StoreError::VersionTooNew {
                stored,
                current: DATA_MODEL_VERSION,
            });
        }
        if stored < DATA_MODEL_VERSION {
            warn!(stored, current = DATA_MODEL_VERSION, "database outdated");
            self.migrate_columns()?;
            self.store.update(
                "metadata",
                &[("value", FieldValue::Text(DATA_MODEL_VERSION.to_string()))],
                &SqlFilter::eq("key", VERSION_KEY.into()),
            )?;
        }

        let organizations = self.organization_names()?;
        let mut entries = Vec::new();
        for kind in EntryKind::ALL {
            let column_names: Vec<&str> = kind.schema().column_names().collect();
            let rows = self.store.select(kind.table(), &column_names, None)?;
            for row in rows {
                match Entry::from_row(kind, &row) {
                    Ok(mut entry) => {
                        entry.fields_mut().authors =
                            self.load_authors(kind, entry.id(), &organizations)?;
                        entries.push(entry);
                    }
                    Err(err) => {
                        warn!(table = kind.table(), %err, "skipping invalid row");
                    }
                }
            }
        }
        info!(count = entries.len(), "catalogue loaded");
        self.cache.replace_all(entries);
        self.loaded = true;
        Ok(())
    }

    /// Submit all pending changes, in order add → delete → edit. Entries that
    /// fail stay in their queue; the diverged flag clears only once every
    /// queue has fully drained.
    pub fn save(&mut self) -> SaveOutcome {
        let mut outcome = SaveOutcome::default();
        self.submit_adds(&mut outcome);
        self.submit_deletes(&mut outcome);
        self.submit_edits(&mut outcome);
        outcome
    }

    fn submit_adds(&mut self, outcome: &mut SaveOutcome) {
        let queue = self.cache.to_add.clone();
        if queue.is_empty() {
            return;
        }
        if use_bulk_path(queue.len()) {
            for kind in EntryKind::ALL {
                let group: Vec<Entry> =
                    queue.iter().filter(|e| e.kind() == kind).cloned().collect();
                if group.is_empty() {
                    continue;
                }
                let rows: Vec<Vec<(&str, FieldValue)>> =
                    group.iter().map(|e| e.to_row()).collect();
                match self.store.insert_many(kind.table(), &rows, false) {
                    Ok(ids) => {
                        for (entry, id) in group.iter().zip(ids) {
                            if let Err(err) = self.attach_authors(kind, id, entry.authors()) {
                                error!(title = entry.title(), %err, "failed to attach authors");
                                outcome.failed += 1;
                            } else {
                                outcome.submitted += 1;
                            }
                            self.cache.commit_added(entry, id);
                        }
                    }
                    Err(err) => {
                        error!(table = kind.table(), %err,
                            "bulk insert failed; entries are still in add cache");
                        outcome.failed += group.len();
                    }
                }
            }
        } else {
            for entry in queue {
                match self.insert_entry(&entry) {
                    Ok(id) => {
                        self.cache.commit_added(&entry, id);
                        outcome.submitted += 1;
                    }
                    Err(err) => {
                        error!(title = entry.title(), %err,
                            "failed to insert entry; it is still in add cache");
                        outcome.failed += 1;
                    }
                }
            }
        }
    }

    fn submit_deletes(&mut self, outcome: &mut SaveOutcome) {
        let queue = self.cache.to_delete.clone();
        if queue.is_empty() {
            return;
        }
        if use_bulk_path(queue.len()) {
            for kind in EntryKind::ALL {
                let group: Vec<Entry> =
                    queue.iter().filter(|e| e.kind() == kind).cloned().collect();
                if group.is_empty() {
                    continue;
                }
                let ids: Vec<i64> = group.iter().filter_map(Entry::id).collect();
                if ids.is_empty() {
                    for entry in &group {
                        warn!(title = entry.title(), "delete of entry without identifier");
                        self.cache.commit_deleted(entry);
                    }
                    continue;
                }
                match self.store.delete(kind.table(), &SqlFilter::id_in(&ids)) {
                    Ok(_) => {
                        for entry in &group {
                            self.cache.commit_deleted(entry);
                            outcome.submitted += 1;
                        }
                    }
                    Err(err) => {
                        error!(table = kind.table(), %err,
                            "bulk delete failed; entries are still in delete cache");
                        outcome.failed += group.len();
                    }
                }
            }
        } else {
            for entry in queue {
                match self.delete_entry(&entry) {
                    Ok(()) => {
                        self.cache.commit_deleted(&entry);
                        outcome.submitted += 1;
                    }
                    Err(err) => {
                        error!(title = entry.title(), %err,
                            "failed to delete entry; it is still in delete cache");
                        outcome.failed += 1;
                    }
                }
            }
        }
    }

    fn submit_edits(&mut self, outcome: &mut SaveOutcome) {
        // No bulk-update path: edits are always submitted individually.
        for entry in self.cache.to_edit.clone() {
            match self.update_entry(&entry) {
                Ok(()) => {
                    self.cache.commit_edited(&entry);
                    outcome.submitted += 1;
                }
                Err(err) => {
                    error!(title = entry.title(), %err,
                        "failed to update entry; it is still in edit cache");
                    outcome.failed += 1;
                }
            }
        }
    }

    /// Insert one entry with its author joins, atomically.
    fn insert_entry(&self, entry: &Entry) -> Result<i64, StoreError> {
        let kind = entry.kind();
        let tx = self
            .store
            .connection()
            .unchecked_transaction()
            .map_err(|e| StoreError::Query(format!("begin tx: {e}")))?;
        let id = self
            .store
            .insert_row(kind.table(), &entry.to_row(), false)?
            .ok_or_else(|| StoreError::Query(format!("insert into {} ignored", kind.table())))?;
        self.attach_authors(kind, id, entry.authors())?;
        tx.commit()
            .map_err(|e| StoreError::Query(format!("commit: {e}")))?;
        Ok(id)
    }

    fn delete_entry(&self, entry: &Entry) -> Result<(), StoreError> {
        let Some(id) = entry.id() else {
            // Never persisted; nothing to remove from the store.
            warn!(title = entry.title(), "delete of entry without identifier");
            return Ok(());
        };
        // Join rows go with the entry via ON DELETE CASCADE; authors stay.
        self.store
            .delete(entry.kind().table(), &SqlFilter::eq("id", FieldValue::Int(id)))?;
        Ok(())
    }

    /// Update one entry's columns and refresh its author joins, atomically.
    fn update_entry(&self, entry: &Entry) -> Result<(), StoreError> {
        let kind = entry.kind();
        let id = entry
            .id()
            .ok_or_else(|| StoreError::Query("entry has no identifier".into()))?;
        let tx = self
            .store
            .connection()
            .unchecked_transaction()
            .map_err(|e| StoreError::Query(format!("begin tx: {e}")))?;
        self.store.update(
            kind.table(),
            &entry.to_row(),
            &SqlFilter::eq("id", FieldValue::Int(id)),
        )?;
        self.store.delete(
            kind.author_join_table(),
            &SqlFilter::eq(kind.join_entry_column(), FieldValue::Int(id)),
        )?;
        self.attach_authors(kind, id, entry.authors())?;
        tx.commit()
            .map_err(|e| StoreError::Query(format!("commit: {e}")))?;
        Ok(())
    }

    fn attach_authors(
        &self,
        kind: EntryKind,
        entry_id: i64,
        authors: &[Author],
    ) -> Result<(), StoreError> {
        for author in authors {
            let author_id = self.ensure_author(author)?;
            self.store.insert_row(
                kind.author_join_table(),
                &[
                    (kind.join_entry_column(), FieldValue::Int(entry_id)),
                    ("author_id", FieldValue::Int(author_id)),
                ],
                true,
            )?;
        }
        Ok(())
    }

    /// Insert-or-find an author row. Authors are unique on the name triple;
    /// an existing row is reused so authors stay shared between entries.
    fn ensure_author(&self, author: &Author) -> Result<i64, StoreError> {
        let mut author = author.clone();
        if author.affiliation_id.is_none() {
            if let Some(name) = author.affiliation.clone() {
                author.affiliation_id = Some(self.ensure_organization(&name)?);
            }
        }
        let row = author.to_row();
        if let Some(id) = self.store.insert_row("authors", &row, true)? {
            return Ok(id);
        }
        let filter = SqlFilter::eq("first_name", row[0].1.clone())
            .and(SqlFilter::eq("middle_names", row[1].1.clone()))
            .and(SqlFilter::eq("last_name", row[2].1.clone()));
        let rows = self.store.select("authors", &["id"], Some(&filter))?;
        rows.first()
            .and_then(|r| r.first())
            .and_then(FieldValue::int)
            .ok_or_else(|| StoreError::Query("author lookup after insert failed".into()))
    }

    fn ensure_organization(&self, name: &str) -> Result<i64, StoreError> {
        let org = shelfmark_domain::Organization::new(name);
        if let Some(id) = self.store.insert_row("organizations", &org.to_row(), true)? {
            return Ok(id);
        }
        let rows = self.store.select(
            "organizations",
            &["id"],
            Some(&SqlFilter::eq("name", name.into())),
        )?;
        rows.first()
            .and_then(|r| r.first())
            .and_then(FieldValue::int)
            .ok_or_else(|| StoreError::Query("organization lookup after insert failed".into()))
    }

    fn load_authors(
        &self,
        kind: EntryKind,
        entry_id: Option<i64>,
        organizations: &HashMap<i64, String>,
    ) -> Result<Vec<Author>, StoreError> {
        let Some(entry_id) = entry_id else {
            return Ok(Vec::new());
        };
        let columns: Vec<&str> = AUTHOR_SCHEMA.column_names().collect();
        let filter = SqlFilter::eq(
            &format!("{}.{}", kind.author_join_table(), kind.join_entry_column()),
            FieldValue::Int(entry_id),
        );
        let rows = self.store.select_joined(
            "authors",
            kind.author_join_table(),
            "id",
            "author_id",
            &columns,
            Some(&filter),
        )?;
        let mut authors = Vec::with_capacity(rows.len());
        for row in rows {
            let (mut author, _) = Author::take(&row)?;
            // Weak reference: a dangling affiliation key resolves to nothing.
            author.affiliation = author
                .affiliation_id
                .and_then(|id| organizations.get(&id).cloned());
            authors.push(author);
        }
        Ok(authors)
    }

    fn organization_names(&self) -> Result<HashMap<i64, String>, StoreError> {
        let rows = self.store.select("organizations", &["id", "name"], None)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.first().and_then(FieldValue::int)?;
                let name = row.get(1).and_then(FieldValue::text)?;
                Some((id, name))
            })
            .collect())
    }

    /// Add any columns the running schema has that the live table lacks.
    fn migrate_columns(&self) -> Result<(), StoreError> {
        let mut schemas: Vec<&shelfmark_domain::TableSchema> =
            EntryKind::ALL.iter().map(|k| k.schema()).collect();
        schemas.push(&AUTHOR_SCHEMA);
        schemas.push(&ORGANIZATION_SCHEMA);
        for schema in schemas {
            let live = self.store.table_info(schema.table)?;
            for column in &schema.columns {
                if !live.iter().any(|name| name == column.name) {
                    info!(table = schema.table, column = column.name, "adding column");
                    self.store.add_column(schema.table, column)?;
                }
            }
        }
        Ok(())
    }
}

/// Queue-size gate between the per-entry and the bulk submission path.
pub(crate) fn use_bulk_path(queue_len: usize) -> bool {
    queue_len >= BULK_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfmark_domain::{Article, Book};

    fn article(title: &str, author: &str) -> Entry {
        Entry::Article(Article::new(title, vec![Author::from_name(author)]))
    }

    fn catalogue() -> Catalogue {
        let mut catalogue = Catalogue::open_in_memory().unwrap();
        catalogue.load().unwrap();
        catalogue
    }

    #[test]
    fn state_machine_transitions() {
        let mut catalogue = Catalogue::open_in_memory().unwrap();
        assert_eq!(catalogue.state(), CatalogueState::Uninitialized);
        catalogue.load().unwrap();
        assert_eq!(catalogue.state(), CatalogueState::Loaded);
        catalogue
            .cache_mut()
            .add(article("Paper", "Jane Doe"))
            .unwrap();
        assert_eq!(catalogue.state(), CatalogueState::Dirty);
        assert!(catalogue.save().is_complete());
        assert_eq!(catalogue.state(), CatalogueState::Loaded);
    }

    #[test]
    fn add_save_reload_round_trip() {
        let mut catalogue = catalogue();
        let mut entry = article("Dark Matter", "Jane Mary Doe");
        if let Entry::Article(a) = &mut entry {
            a.arxiv_id = Some("1234.5678".into());
            a.version = Some(2);
        }
        catalogue.cache_mut().add(entry).unwrap();
        catalogue
            .cache_mut()
            .add(Entry::Book(Book::new("SICP", vec![Author::from_name("Harold Abelson")])))
            .unwrap();

        let outcome = catalogue.save();
        assert_eq!(outcome, SaveOutcome { submitted: 2, failed: 0 });
        assert!(!catalogue.cache().is_diverged());
        // Identifiers were assigned by the store.
        assert!(catalogue.cache().entries().iter().all(|e| e.id().is_some()));

        catalogue.load().unwrap();
        assert_eq!(catalogue.cache().entries().len(), 2);
        let loaded = catalogue
            .cache()
            .entries()
            .iter()
            .find(|e| e.title() == "Dark Matter")
            .unwrap();
        assert_eq!(loaded.display_field("arxiv_id"), "1234.5678");
        assert_eq!(loaded.display_field("version"), "2");
        assert_eq!(loaded.authors().len(), 1);
        assert_eq!(loaded.authors()[0].full_name(), "Jane Mary Doe");
    }

    #[test]
    fn save_is_idempotent() {
        let mut catalogue = catalogue();
        catalogue
            .cache_mut()
            .add(article("Once", "Jane Doe"))
            .unwrap();
        let first = catalogue.save();
        assert_eq!(first.submitted, 1);

        let second = catalogue.save();
        assert_eq!(second, SaveOutcome::default());
        let rows = catalogue.store().select("articles", &["id"], None).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn bulk_threshold_gate() {
        assert!(!use_bulk_path(9));
        assert!(use_bulk_path(10));
        assert!(use_bulk_path(11));
    }

    #[test]
    fn per_entry_path_below_threshold() {
        let mut catalogue = catalogue();
        for i in 0..9 {
            catalogue
                .cache_mut()
                .add(article(&format!("Paper {i}"), "Jane Doe"))
                .unwrap();
        }
        let outcome = catalogue.save();
        assert_eq!(outcome.submitted, 9);
        assert!(catalogue.cache().pending_add().is_empty());
        let rows = catalogue.store().select("articles", &["id"], None).unwrap();
        assert_eq!(rows.len(), 9);
    }

    #[test]
    fn bulk_path_at_threshold() {
        let mut catalogue = catalogue();
        for i in 0..10 {
            let entry = if i % 2 == 0 {
                article(&format!("Paper {i}"), "Jane Doe")
            } else {
                Entry::Book(Book::new(&format!("Book {i}"), vec![Author::from_name("Jane Doe")]))
            };
            catalogue.cache_mut().add(entry).unwrap();
        }
        let outcome = catalogue.save();
        assert_eq!(outcome.submitted, 10);
        assert!(outcome.is_complete());
        assert_eq!(
            catalogue.store().select("articles", &[], None).unwrap().len(),
            5
        );
        assert_eq!(catalogue.store().select("books", &[], None).unwrap().len(), 5);
        // Distinct ids were assigned within each type.
        let ids: Vec<_> = catalogue
            .cache()
            .entries()
            .iter()
            .map(|e| (e.kind(), e.id().unwrap()))
            .collect();
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn deleting_entry_keeps_authors() {
        let mut catalogue = catalogue();
        catalogue
            .cache_mut()
            .add(article("Paper", "Jane Doe"))
            .unwrap();
        catalogue.save();

        let entry = catalogue.cache().entries()[0].clone();
        catalogue.cache_mut().remove(&entry).unwrap();
        let outcome = catalogue.save();
        assert!(outcome.is_complete());

        assert!(catalogue.store().select("articles", &[], None).unwrap().is_empty());
        // Join rows are gone with the entry, the author row survives.
        assert!(catalogue
            .store()
            .select("article_authors", &[], None)
            .unwrap()
            .is_empty());
        assert_eq!(catalogue.store().select("authors", &[], None).unwrap().len(), 1);
    }

    #[test]
    fn edit_is_persisted() {
        let mut catalogue = catalogue();
        catalogue
            .cache_mut()
            .add(article("Old Title", "Jane Doe"))
            .unwrap();
        catalogue.save();

        let old = catalogue.cache().entries()[0].clone();
        catalogue
            .cache_mut()
            .edit(&old, article("New Title", "Jane Doe"))
            .unwrap();
        let outcome = catalogue.save();
        assert!(outcome.is_complete());
        assert_eq!(catalogue.state(), CatalogueState::Loaded);

        catalogue.load().unwrap();
        assert_eq!(catalogue.cache().entries().len(), 1);
        assert_eq!(catalogue.cache().entries()[0].title(), "New Title");
    }

    #[test]
    fn shared_author_is_stored_once() {
        let mut catalogue = catalogue();
        catalogue
            .cache_mut()
            .add(article("First", "Jane Doe"))
            .unwrap();
        catalogue
            .cache_mut()
            .add(article("Second", "Jane Doe"))
            .unwrap();
        catalogue.save();

        assert_eq!(catalogue.store().select("authors", &[], None).unwrap().len(), 1);
        assert_eq!(
            catalogue
                .store()
                .select("article_authors", &[], None)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn author_affiliation_round_trip() {
        let mut catalogue = catalogue();
        let mut author = Author::from_name("Jane Doe");
        author.affiliation = Some("CERN".into());
        catalogue
            .cache_mut()
            .add(Entry::Article(Article::new("Paper", vec![author])))
            .unwrap();
        catalogue.save();

        let orgs = catalogue.store().select("organizations", &["name"], None).unwrap();
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0][0], FieldValue::Text("CERN".into()));

        catalogue.load().unwrap();
        let loaded = &catalogue.cache().entries()[0];
        assert_eq!(loaded.authors()[0].affiliation.as_deref(), Some("CERN"));
        assert!(loaded.authors()[0].affiliation_id.is_some());
    }

    #[test]
    fn load_refuses_newer_store() {
        let mut catalogue = Catalogue::open_in_memory().unwrap();
        catalogue
            .store()
            .update(
                "metadata",
                &[("value", FieldValue::Text("99".into()))],
                &SqlFilter::eq("key", VERSION_KEY.into()),
            )
            .unwrap();
        let err = catalogue.load().unwrap_err();
        assert!(matches!(
            err,
            StoreError::VersionTooNew { stored: 99, current: DATA_MODEL_VERSION }
        ));
    }

    #[test]
    fn outdated_store_gains_missing_columns() {
        let store = StoreAdapter::open_in_memory().unwrap();
        // Simulate a store created by an older data model: the articles table
        // lacks the prime_category column and the version reads lower.
        store
            .execute_batch(
                "CREATE TABLE articles (
                    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
                    title TEXT, summary TEXT, file_name TEXT, comment TEXT,
                    preview_page INTEGER, doi TEXT, link TEXT, date_published TEXT,
                    arxiv_id TEXT, version INTEGER, journal TEXT,
                    date_uploaded TEXT, date_updated TEXT
                );
                CREATE TABLE metadata (key TEXT PRIMARY KEY NOT NULL, value TEXT);
                INSERT INTO metadata (key, value) VALUES ('data_model_version', '0');
                INSERT INTO articles (title) VALUES ('Legacy Paper');",
            )
            .unwrap();

        let mut catalogue = Catalogue::with_store(store).unwrap();
        catalogue.load().unwrap();

        let columns = catalogue.store().table_info("articles").unwrap();
        assert!(columns.contains(&"prime_category".to_string()));
        assert_eq!(catalogue.stored_version().unwrap(), DATA_MODEL_VERSION);
        assert_eq!(catalogue.cache().entries().len(), 1);
        assert_eq!(catalogue.cache().entries()[0].title(), "Legacy Paper");
    }

    #[test]
    fn on_disk_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalogue.db");
        {
            let mut catalogue = Catalogue::open(&path).unwrap();
            catalogue.load().unwrap();
            catalogue
                .cache_mut()
                .add(article("Persistent", "Jane Doe"))
                .unwrap();
            assert!(catalogue.save().is_complete());
        }
        let mut reopened = Catalogue::open(&path).unwrap();
        reopened.load().unwrap();
        assert_eq!(reopened.cache().entries().len(), 1);
        assert_eq!(reopened.cache().entries()[0].title(), "Persistent");
    }
}
