//! In-memory staging area for catalogue mutations.
//!
//! The cache holds the authoritative list of all entries plus three disjoint
//! pending queues: entries to insert, to update and to delete relative to the
//! backing store. Sorting and filtering are pure projections onto a derived
//! display list and never touch the pending bookkeeping, which lets the
//! synchronizer pick a cheap per-row path or a bulk path without re-deriving
//! intent from a diff.

use shelfmark_domain::Entry;
use tracing::debug;

use crate::filter::EntryFilter;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("entry is already tracked by the cache")]
    Duplicate,

    #[error("entry is not tracked by the cache")]
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Staged-change cache over the entry catalogue.
///
/// Invariants: every tracked entry is in exactly one of {unchanged, to-add,
/// to-edit}; an entry appears at most once in to-delete; the diverged flag is
/// true iff any pending queue is non-empty.
#[derive(Default)]
pub struct ChangeCache {
    pub(crate) entries: Vec<Entry>,
    pub(crate) to_add: Vec<Entry>,
    pub(crate) to_edit: Vec<Entry>,
    pub(crate) to_delete: Vec<Entry>,
    display: Vec<usize>,
    filter: Option<EntryFilter>,
    diverged: bool,
}

impl ChangeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The authoritative in-memory list.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The filtered view of the authoritative list.
    pub fn display_entries(&self) -> Vec<&Entry> {
        self.display.iter().map(|&i| &self.entries[i]).collect()
    }

    pub fn pending_add(&self) -> &[Entry] {
        &self.to_add
    }

    pub fn pending_edit(&self) -> &[Entry] {
        &self.to_edit
    }

    pub fn pending_delete(&self) -> &[Entry] {
        &self.to_delete
    }

    /// True iff the cache state differs from the last synchronized store state.
    pub fn is_diverged(&self) -> bool {
        self.diverged
    }

    /// Stage a new entry. Fails if an equal entry is already tracked.
    pub fn add(&mut self, entry: Entry) -> Result<(), CacheError> {
        if self.entries.contains(&entry) {
            debug!(title = entry.title(), "rejected duplicate add");
            return Err(CacheError::Duplicate);
        }
        self.entries.push(entry.clone());
        self.to_add.push(entry);
        self.diverged = true;
        self.rebuild_display();
        Ok(())
    }

    /// Replace a tracked entry. The new entry inherits the old entry's
    /// identifier. An entry that was itself never persisted is replaced in
    /// place in the to-add queue; an already-staged edit is replaced in place;
    /// a persisted, unmodified entry moves to the to-edit queue.
    pub fn edit(&mut self, old: &Entry, new: Entry) -> Result<(), CacheError> {
        let Some(idx) = self.entries.iter().position(|e| e == old) else {
            debug!(title = old.title(), "edit of untracked entry");
            return Err(CacheError::NotFound);
        };

        let mut new = new;
        new.set_id(old.id());

        if let Some(pos) = self.to_add.iter().position(|e| e == old) {
            self.to_add[pos] = new.clone();
        } else if let Some(pos) = self.to_edit.iter().position(|e| e == old) {
            self.to_edit[pos] = new.clone();
        } else {
            self.to_edit.push(new.clone());
        }

        self.entries[idx] = new;
        self.diverged = true;
        self.rebuild_display();
        Ok(())
    }

    /// Remove a tracked entry. A pending-add entry is simply dropped; a
    /// pending-edit entry still exists in the store and moves to to-delete; a
    /// persisted, unmodified entry is staged for deletion.
    pub fn remove(&mut self, entry: &Entry) -> Result<(), CacheError> {
        let Some(idx) = self.entries.iter().position(|e| e == entry) else {
            debug!(title = entry.title(), "remove of untracked entry");
            return Err(CacheError::NotFound);
        };

        if let Some(pos) = self.to_add.iter().position(|e| e == entry) {
            self.to_add.remove(pos);
        } else if let Some(pos) = self.to_edit.iter().position(|e| e == entry) {
            let staged = self.to_edit.remove(pos);
            self.to_delete.push(staged);
        } else {
            self.to_delete.push(self.entries[idx].clone());
        }

        self.entries.remove(idx);
        self.recompute_diverged();
        self.rebuild_display();
        Ok(())
    }

    /// Stable sort of the authoritative list by a field's display string.
    /// The display list is rebuilt with the filter re-applied.
    pub fn sort(&mut self, field: &str, order: SortOrder) {
        self.entries.sort_by(|a, b| {
            let ord = a.display_field(field).cmp(&b.display_field(field));
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
        self.rebuild_display();
    }

    /// Install or clear the display filter.
    pub fn set_filter(&mut self, filter: Option<EntryFilter>) {
        self.filter = filter;
        self.rebuild_display();
    }

    /// Replace the authoritative list wholesale, e.g. after a full reload.
    /// Pending queues are cleared and the diverged flag reset.
    pub fn replace_all(&mut self, entries: Vec<Entry>) {
        self.entries = entries;
        self.to_add.clear();
        self.to_edit.clear();
        self.to_delete.clear();
        self.diverged = false;
        self.rebuild_display();
    }

    /// Acknowledge a successful insert: drop the queue record and carry the
    /// store-assigned identifier into the authoritative entry.
    pub(crate) fn commit_added(&mut self, entry: &Entry, id: i64) {
        if let Some(pos) = self.to_add.iter().position(|e| e == entry) {
            self.to_add.remove(pos);
        }
        if let Some(tracked) = self.entries.iter_mut().find(|e| **e == *entry) {
            tracked.set_id(Some(id));
        }
        self.recompute_diverged();
    }

    pub(crate) fn commit_deleted(&mut self, entry: &Entry) {
        if let Some(pos) = self.to_delete.iter().position(|e| e == entry) {
            self.to_delete.remove(pos);
        }
        self.recompute_diverged();
    }

    pub(crate) fn commit_edited(&mut self, entry: &Entry) {
        if let Some(pos) = self.to_edit.iter().position(|e| e == entry) {
            self.to_edit.remove(pos);
        }
        self.recompute_diverged();
    }

    fn recompute_diverged(&mut self) {
        self.diverged =
            !(self.to_add.is_empty() && self.to_edit.is_empty() && self.to_delete.is_empty());
    }

    fn rebuild_display(&mut self) {
        self.display = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| match &self.filter {
                Some(filter) => filter.matches(entry),
                None => true,
            })
            .map(|(i, _)| i)
            .collect();
    }
}
