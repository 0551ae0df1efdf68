//! Entry repository contract
//!
//! Every backend stores entries keyed by id and answers calendar-day
//! queries. Lists are always returned newest first.

use crate::storage::error::StorageResult;
use crate::storage::types::{DateRange, Entry, NewEntry};
use chrono::NaiveDate;

/// Persistence contract for journal entries
pub trait EntryRepository: Send + Sync {
    /// Store a new entry, assigning its id and creation time
    fn create(&self, new: NewEntry) -> StorageResult<Entry>;

    /// Fetch an entry by id
    fn get(&self, id: &str) -> StorageResult<Option<Entry>>;

    /// List entries in `range` (all entries when None), newest first
    fn list(&self, range: Option<DateRange>) -> StorageResult<Vec<Entry>>;

    /// Remove an entry, returning whether it existed
    fn delete(&self, id: &str) -> StorageResult<bool>;

    /// All entries on a calendar day, newest first
    fn find_all_by_date(&self, date: NaiveDate) -> StorageResult<Vec<Entry>> {
        self.list(Some(DateRange::day(date)))
    }

    /// The most recent entry on a calendar day
    fn find_by_date(&self, date: NaiveDate) -> StorageResult<Option<Entry>> {
        Ok(self.find_all_by_date(date)?.into_iter().next())
    }

    /// Total number of stored entries
    fn count(&self) -> StorageResult<usize> {
        Ok(self.list(None)?.len())
    }

    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;
}
