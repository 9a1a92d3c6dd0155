use std::sync::{Arc, Mutex};

use super::domain::{Entry, EntryId, NewEntry, PlaceholderEntry, PlaceholderId};
use crate::workflows::catalog::{OptionId, Syllabus};

/// Storage abstraction so the entry service can be exercised in isolation.
pub trait EntryRepository: Send + Sync {
    fn entries(&self) -> Result<Vec<Entry>, RepositoryError>;
    fn fetch_entry(&self, id: EntryId) -> Result<Option<Entry>, RepositoryError>;
    fn insert_entry(&self, entry: NewEntry) -> Result<Entry, RepositoryError>;
    fn update_entry(&self, entry: Entry) -> Result<(), RepositoryError>;

    fn placeholders(&self) -> Result<Vec<PlaceholderEntry>, RepositoryError>;
    fn fetch_placeholder(
        &self,
        id: PlaceholderId,
    ) -> Result<Option<PlaceholderEntry>, RepositoryError>;
    fn insert_placeholder(&self, syllabus: &Syllabus) -> Result<PlaceholderEntry, RepositoryError>;

    /// Store the new entries and mark `options` used on the stored placeholder in one step.
    /// Fails with `Conflict` when any option is already used. An exhausted placeholder is
    /// removed. Returns the created entries and the placeholder as it was last stored.
    fn commit_resolution(
        &self,
        placeholder: PlaceholderId,
        options: &[OptionId],
        entries: Vec<NewEntry>,
    ) -> Result<(Vec<Entry>, PlaceholderEntry), RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Default)]
struct EntryBook {
    entries: Vec<Entry>,
    placeholders: Vec<PlaceholderEntry>,
    last_entry_id: u32,
    last_placeholder_id: u32,
}

impl EntryBook {
    fn push_entry(&mut self, entry: NewEntry) -> Entry {
        self.last_entry_id += 1;
        let stored = entry.into_entry(EntryId(self.last_entry_id));
        self.entries.push(stored.clone());
        stored
    }
}

/// Single-writer in-process store. Each call holds the lock for its whole duration.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEntryRepository {
    book: Arc<Mutex<EntryBook>>,
}

impl InMemoryEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryRepository for InMemoryEntryRepository {
    fn entries(&self) -> Result<Vec<Entry>, RepositoryError> {
        let guard = self.book.lock().expect("entry repository mutex poisoned");
        Ok(guard.entries.clone())
    }

    fn fetch_entry(&self, id: EntryId) -> Result<Option<Entry>, RepositoryError> {
        let guard = self.book.lock().expect("entry repository mutex poisoned");
        Ok(guard.entries.iter().find(|entry| entry.id == id).cloned())
    }

    fn insert_entry(&self, entry: NewEntry) -> Result<Entry, RepositoryError> {
        let mut guard = self.book.lock().expect("entry repository mutex poisoned");
        Ok(guard.push_entry(entry))
    }

    fn update_entry(&self, entry: Entry) -> Result<(), RepositoryError> {
        let mut guard = self.book.lock().expect("entry repository mutex poisoned");
        match guard.entries.iter_mut().find(|stored| stored.id == entry.id) {
            Some(stored) => {
                *stored = entry;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn placeholders(&self) -> Result<Vec<PlaceholderEntry>, RepositoryError> {
        let guard = self.book.lock().expect("entry repository mutex poisoned");
        Ok(guard.placeholders.clone())
    }

    fn fetch_placeholder(
        &self,
        id: PlaceholderId,
    ) -> Result<Option<PlaceholderEntry>, RepositoryError> {
        let guard = self.book.lock().expect("entry repository mutex poisoned");
        Ok(guard
            .placeholders
            .iter()
            .find(|placeholder| placeholder.id == id)
            .cloned())
    }

    fn insert_placeholder(&self, syllabus: &Syllabus) -> Result<PlaceholderEntry, RepositoryError> {
        let mut guard = self.book.lock().expect("entry repository mutex poisoned");
        guard.last_placeholder_id += 1;
        let placeholder =
            PlaceholderEntry::for_syllabus(PlaceholderId(guard.last_placeholder_id), syllabus);
        guard.placeholders.push(placeholder.clone());
        Ok(placeholder)
    }

    fn commit_resolution(
        &self,
        placeholder: PlaceholderId,
        options: &[OptionId],
        entries: Vec<NewEntry>,
    ) -> Result<(Vec<Entry>, PlaceholderEntry), RepositoryError> {
        let mut guard = self.book.lock().expect("entry repository mutex poisoned");
        let position = guard
            .placeholders
            .iter()
            .position(|stored| stored.id == placeholder)
            .ok_or(RepositoryError::NotFound)?;

        if options
            .iter()
            .any(|option| guard.placeholders[position].is_used(*option))
        {
            return Err(RepositoryError::Conflict);
        }
        guard.placeholders[position].mark_used(options.iter().copied());

        let created: Vec<Entry> = entries
            .into_iter()
            .map(|entry| guard.push_entry(entry))
            .collect();

        let stored = if guard.placeholders[position].is_exhausted() {
            guard.placeholders.remove(position)
        } else {
            guard.placeholders[position].clone()
        };

        Ok((created, stored))
    }
}
