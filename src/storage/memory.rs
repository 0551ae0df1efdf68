//! In-memory entry store
//!
//! Holds entries in a `Vec` behind an `RwLock`. Used directly for tests
//! and demos, and as the read side of the log backend.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::repository::EntryRepository;
use crate::storage::types::{DateRange, Entry, NewEntry};
use std::sync::RwLock;

/// Volatile repository; contents are lost when dropped
#[derive(Debug, Default)]
pub struct MemoryRepository {
    entries: RwLock<Vec<Entry>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from already materialized entries
    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Insert a fully formed entry, replacing any entry with the same id
    pub(crate) fn put(&self, entry: Entry) -> StorageResult<()> {
        let mut entries = self.write()?;
        entries.retain(|e| e.id != entry.id);
        entries.push(entry);
        Ok(())
    }

    /// Snapshot of every stored entry, in insertion order
    pub(crate) fn snapshot(&self) -> StorageResult<Vec<Entry>> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> StorageResult<std::sync::RwLockReadGuard<'_, Vec<Entry>>> {
        self.entries
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }

    fn write(&self) -> StorageResult<std::sync::RwLockWriteGuard<'_, Vec<Entry>>> {
        self.entries
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl EntryRepository for MemoryRepository {
    fn create(&self, new: NewEntry) -> StorageResult<Entry> {
        let entry = Entry::from_new(new);
        self.write()?.push(entry.clone());
        Ok(entry)
    }

    fn get(&self, id: &str) -> StorageResult<Option<Entry>> {
        Ok(self.read()?.iter().find(|e| e.id == id).cloned())
    }

    fn list(&self, range: Option<DateRange>) -> StorageResult<Vec<Entry>> {
        let mut entries: Vec<Entry> = self
            .read()?
            .iter()
            .filter(|e| range.map(|r| r.contains(e.date)).unwrap_or(true))
            .cloned()
            .collect();
        entries.sort_by(Entry::newest_first);
        Ok(entries)
    }

    fn delete(&self, id: &str) -> StorageResult<bool> {
        let mut entries = self.write()?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() != before)
    }

    fn count(&self) -> StorageResult<usize> {
        Ok(self.read()?.len())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::Mood;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let repo = MemoryRepository::new();
        let entry = repo
            .create(NewEntry::new(date(2024, 11, 20), "hello", Mood::Good))
            .unwrap();

        let fetched = repo.get(&entry.id).unwrap().unwrap();
        assert_eq!(fetched, entry);
        assert!(repo.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first_with_range() {
        let repo = MemoryRepository::new();
        for day in [18, 20, 19] {
            repo.create(NewEntry::new(date(2024, 11, day), format!("day {}", day), Mood::Okay))
                .unwrap();
        }

        let all = repo.list(None).unwrap();
        let days: Vec<u32> = all.iter().map(|e| chrono::Datelike::day(&e.date)).collect();
        assert_eq!(days, vec![20, 19, 18]);

        let range = DateRange::try_new(date(2024, 11, 19), date(2024, 11, 20)).unwrap();
        assert_eq!(repo.list(Some(range)).unwrap().len(), 2);
    }

    #[test]
    fn test_find_by_date_returns_most_recent() {
        let repo = MemoryRepository::new();
        let morning = Utc.with_ymd_and_hms(2024, 11, 20, 8, 0, 0).unwrap();
        repo.create(
            NewEntry::new(date(2024, 11, 20), "morning", Mood::Okay).created_at(morning),
        )
        .unwrap();
        repo.create(
            NewEntry::new(date(2024, 11, 20), "evening", Mood::Great)
                .created_at(morning + Duration::hours(12)),
        )
        .unwrap();

        let found = repo.find_by_date(date(2024, 11, 20)).unwrap().unwrap();
        assert_eq!(found.content, "evening");
        assert_eq!(repo.find_all_by_date(date(2024, 11, 20)).unwrap().len(), 2);
        assert!(repo.find_by_date(date(2025, 1, 1)).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let repo = MemoryRepository::new();
        let entry = repo
            .create(NewEntry::new(date(2024, 11, 20), "bye", Mood::Bad))
            .unwrap();

        assert!(repo.delete(&entry.id).unwrap());
        assert!(!repo.delete(&entry.id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }
}
