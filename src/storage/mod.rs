//! Diary Storage
//!
//! This module provides entry persistence behind one contract:
//!
//! - **types**: Core data structures (Entry, Mood, DateRange, Period)
//! - **repository**: The `EntryRepository` trait
//! - **memory**: Volatile in-process store
//! - **sqlite**: SQLite-backed store
//! - **log**: Append-only record log with CRC framing
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use diary::storage::{EntryRepository, Mood, NewEntry, SqliteRepository};
//! use chrono::NaiveDate;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = SqliteRepository::open("./data/entries.db")?;
//!
//!     let day = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();
//!     repo.create(NewEntry::new(day, "Productive day", Mood::Great))?;
//!
//!     let entry = repo.find_by_date(day)?;
//!     assert!(entry.is_some());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod log;
pub mod memory;
pub mod repository;
pub mod sqlite;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use log::{LogRepository, LogSyncMode};
pub use memory::MemoryRepository;
pub use repository::EntryRepository;
pub use sqlite::SqliteRepository;
pub use types::{parse_day, DateRange, Entry, Mood, NewEntry, ParseMoodError, Period};

use crate::config::{StorageBackend, StorageConfig};
use std::sync::Arc;

/// Open the repository selected by configuration
pub fn open_repository(config: &StorageConfig) -> StorageResult<Arc<dyn EntryRepository>> {
    let data_dir = config.data_path();

    let repo: Arc<dyn EntryRepository> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryRepository::new()),
        StorageBackend::Sqlite => Arc::new(SqliteRepository::open(data_dir.join("entries.db"))?),
        StorageBackend::Log => {
            let sync_mode = if config.sync_writes {
                LogSyncMode::EveryWrite
            } else {
                LogSyncMode::OsBuffered
            };
            Arc::new(LogRepository::open(data_dir.join("entries.log"), sync_mode)?)
        }
    };

    tracing::info!(
        backend = repo.backend(),
        data_dir = %data_dir.display(),
        "Opened entry repository"
    );
    Ok(repo)
}
