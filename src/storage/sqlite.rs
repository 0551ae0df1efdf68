//! SQLite entry store
//!
//! Entries live in a single table with an index on the calendar day, so
//! day lookups and range listings are B-tree range scans. Dates are stored
//! as `YYYY-MM-DD` text and creation times as fixed-width RFC 3339, so
//! both sort chronologically as text.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::repository::EntryRepository;
use crate::storage::types::{DateRange, Entry, Mood, NewEntry};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;

const SELECT_COLUMNS: &str = "SELECT id, date, content, mood, created_at FROM entries";
const ORDER_NEWEST: &str = "ORDER BY date DESC, created_at DESC";

/// Repository backed by a SQLite database file
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Create or open the database at `path`
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Self::init(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                content TEXT NOT NULL,
                mood TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date, created_at)",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

/// Raw column values before parsing into an `Entry`
struct EntryRow {
    id: String,
    date: String,
    content: String,
    mood: String,
    created_at: String,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            content: row.get(2)?,
            mood: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn into_entry(self) -> StorageResult<Entry> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|e| StorageError::Corruption(format!("bad date '{}': {}", self.date, e)))?;
        let mood: Mood = self
            .mood
            .parse()
            .map_err(|e: crate::storage::types::ParseMoodError| {
                StorageError::Corruption(e.to_string())
            })?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| {
                StorageError::Corruption(format!("bad timestamp '{}': {}", self.created_at, e))
            })?
            .with_timezone(&Utc);

        Ok(Entry {
            id: self.id,
            date,
            content: self.content,
            mood,
            created_at,
        })
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn collect_entries(rows: Vec<EntryRow>) -> StorageResult<Vec<Entry>> {
    rows.into_iter().map(EntryRow::into_entry).collect()
}

impl EntryRepository for SqliteRepository {
    fn create(&self, new: NewEntry) -> StorageResult<Entry> {
        let entry = Entry::from_new(new);
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO entries (id, date, content, mood, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                entry.id,
                format_date(entry.date),
                entry.content,
                entry.mood.as_str(),
                entry.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )?;
        Ok(entry)
    }

    fn get(&self, id: &str) -> StorageResult<Option<Entry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&format!("{} WHERE id = ?", SELECT_COLUMNS))?;
        let row = stmt
            .query_row(params![id], EntryRow::from_row)
            .optional()?;
        row.map(EntryRow::into_entry).transpose()
    }

    fn list(&self, range: Option<DateRange>) -> StorageResult<Vec<Entry>> {
        let conn = self.lock()?;
        let rows = match range {
            Some(range) => {
                let mut stmt = conn.prepare_cached(&format!(
                    "{} WHERE date >= ? AND date <= ? {}",
                    SELECT_COLUMNS, ORDER_NEWEST
                ))?;
                let rows = stmt
                    .query_map(
                        params![format_date(range.start), format_date(range.end)],
                        EntryRow::from_row,
                    )?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            None => {
                let mut stmt =
                    conn.prepare_cached(&format!("{} {}", SELECT_COLUMNS, ORDER_NEWEST))?;
                let rows = stmt
                    .query_map([], EntryRow::from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };
        collect_entries(rows)
    }

    fn delete(&self, id: &str) -> StorageResult<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM entries WHERE id = ?", params![id])?;
        Ok(removed > 0)
    }

    fn count(&self) -> StorageResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
