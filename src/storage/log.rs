//! Append-only entry log
//!
//! Every mutation is appended as a framed record before it is applied in
//! memory. On open the log is replayed to rebuild the entry set.
//!
//! Format per record:
//! - length: u32 (4 bytes)
//! - data: [u8; length] (bincode `LogRecord`)
//! - crc: u32 (4 bytes, CRC32 of length + data)
//!
//! Replay stops at the first torn or corrupt record and the file is cut
//! back to the last valid record, so later appends stay readable.
//!
//! The log is compacted on open and after a delete whenever dead records
//! outnumber live entries.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::memory::MemoryRepository;
use crate::storage::repository::EntryRepository;
use crate::storage::types::{DateRange, Entry, NewEntry};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Largest accepted record payload
const MAX_RECORD_LEN: usize = 1_000_000;

/// Sync strategy for log appends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogSyncMode {
    /// Fsync after every record
    #[default]
    EveryWrite,
    /// Flush to the OS only
    OsBuffered,
}

/// A single mutation in the log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
enum LogRecord {
    Put(Entry),
    Delete(String),
}

/// Record writer over the log file
struct LogWriter {
    writer: BufWriter<File>,
    sync_mode: LogSyncMode,
    /// Records in the file that no longer describe a live entry
    dead_records: usize,
}

impl LogWriter {
    fn append(&mut self, record: &LogRecord) -> StorageResult<()> {
        write_record(&mut self.writer, record)?;
        match self.sync_mode {
            LogSyncMode::EveryWrite => {
                self.writer.flush()?;
                self.writer.get_ref().sync_all()?;
            }
            LogSyncMode::OsBuffered => self.writer.flush()?,
        }
        Ok(())
    }
}

/// Repository backed by an append-only record log
pub struct LogRepository {
    path: PathBuf,
    entries: MemoryRepository,
    writer: Mutex<LogWriter>,
}

impl LogRepository {
    /// Open or create the log at `path` and replay it
    pub fn open(path: impl AsRef<Path>, sync_mode: LogSyncMode) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let replay = replay(&path)?;
        let live = replay.entries.len();

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        if file.metadata()?.len() > replay.valid_len {
            tracing::warn!(
                path = %path.display(),
                valid_len = replay.valid_len,
                "Truncating entry log after last valid record"
            );
            file.set_len(replay.valid_len)?;
        }

        tracing::debug!(
            path = %path.display(),
            records = replay.records,
            live_entries = live,
            "Replayed entry log"
        );

        let repo = Self {
            path,
            entries: MemoryRepository::with_entries(replay.entries),
            writer: Mutex::new(LogWriter {
                writer: BufWriter::new(file),
                sync_mode,
                dead_records: replay.records - live,
            }),
        };

        if replay.records - live > live {
            repo.compact()?;
        }

        Ok(repo)
    }

    /// Rewrite the log so it holds exactly one record per live entry
    pub fn compact(&self) -> StorageResult<()> {
        let mut writer = self.lock()?;
        let entries = self.entries.snapshot()?;

        let tmp_path = self.path.with_extension("log.tmp");
        {
            let mut tmp = BufWriter::new(File::create(&tmp_path)?);
            for entry in &entries {
                write_record(&mut tmp, &LogRecord::Put(entry.clone()))?;
            }
            tmp.flush()?;
            tmp.get_ref().sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        writer.writer = BufWriter::new(OpenOptions::new().append(true).open(&self.path)?);
        let dropped = writer.dead_records;
        writer.dead_records = 0;

        tracing::info!(
            path = %self.path.display(),
            live_entries = entries.len(),
            dropped_records = dropped,
            "Compacted entry log"
        );
        Ok(())
    }

    /// Records in the file that compaction would drop
    pub fn dead_records(&self) -> StorageResult<usize> {
        Ok(self.lock()?.dead_records)
    }

    /// Size of the log file in bytes
    pub fn file_size(&self) -> StorageResult<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, LogWriter>> {
        self.writer
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl EntryRepository for LogRepository {
    fn create(&self, new: NewEntry) -> StorageResult<Entry> {
        let entry = Entry::from_new(new);
        let mut writer = self.lock()?;
        writer.append(&LogRecord::Put(entry.clone()))?;
        self.entries.put(entry.clone())?;
        Ok(entry)
    }

    fn get(&self, id: &str) -> StorageResult<Option<Entry>> {
        self.entries.get(id)
    }

    fn list(&self, range: Option<DateRange>) -> StorageResult<Vec<Entry>> {
        self.entries.list(range)
    }

    fn delete(&self, id: &str) -> StorageResult<bool> {
        let dead = {
            let mut writer = self.lock()?;
            if self.entries.get(id)?.is_none() {
                return Ok(false);
            }
            writer.append(&LogRecord::Delete(id.to_string()))?;
            // the put and the tombstone are both dead now
            writer.dead_records += 2;
            self.entries.delete(id)?;
            writer.dead_records
        };

        if dead > self.entries.count()? {
            self.compact()?;
        }
        Ok(true)
    }

    fn count(&self) -> StorageResult<usize> {
        self.entries.count()
    }

    fn backend(&self) -> &'static str {
        "log"
    }
}

struct Replay {
    entries: Vec<Entry>,
    records: usize,
    valid_len: u64,
}

/// Read every valid record, applying puts and deletes in order
fn replay(path: &Path) -> StorageResult<Replay> {
    let mut replay = Replay {
        entries: Vec::new(),
        records: 0,
        valid_len: 0,
    };

    if !path.exists() {
        return Ok(replay);
    }

    let mut reader = BufReader::new(File::open(path)?);
    loop {
        match read_record(&mut reader) {
            Ok(Some((record, len))) => {
                replay.records += 1;
                replay.valid_len += len as u64;
                match record {
                    LogRecord::Put(entry) => {
                        replay.entries.retain(|e| e.id != entry.id);
                        replay.entries.push(entry);
                    }
                    LogRecord::Delete(id) => replay.entries.retain(|e| e.id != id),
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Entry log replay stopped at record {}: {}", replay.records, e);
                break;
            }
        }
    }

    Ok(replay)
}

/// Frame and write one record; oversized records are refused before any
/// byte reaches the writer
fn write_record<W: Write>(writer: &mut W, record: &LogRecord) -> StorageResult<()> {
    let data = bincode::serialize(record)?;
    if data.len() > MAX_RECORD_LEN {
        return Err(StorageError::RecordTooLarge {
            len: data.len(),
            max: MAX_RECORD_LEN,
        });
    }
    let len_buf = (data.len() as u32).to_le_bytes();

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&len_buf);
    hasher.update(&data);
    let crc = hasher.finalize();

    writer.write_all(&len_buf)?;
    writer.write_all(&data)?;
    writer.write_all(&crc.to_le_bytes())?;
    Ok(())
}

/// Read one record, returning it with its framed size in bytes
fn read_record<R: Read>(reader: &mut R) -> StorageResult<Option<(LogRecord, usize)>> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_le_bytes(len_buf) as usize;

    if len > MAX_RECORD_LEN {
        return Err(StorageError::Corruption(format!(
            "Record length too large: {}",
            len
        )));
    }

    let mut data = vec![0u8; len];
    reader.read_exact(&mut data)?;

    let mut crc_buf = [0u8; 4];
    reader.read_exact(&mut crc_buf)?;
    let stored_crc = u32::from_le_bytes(crc_buf);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&len_buf);
    hasher.update(&data);
    let computed_crc = hasher.finalize();

    if stored_crc != computed_crc {
        return Err(StorageError::Corruption(format!(
            "CRC mismatch: stored={}, computed={}",
            stored_crc, computed_crc
        )));
    }

    let record: LogRecord = bincode::deserialize(&data)?;
    Ok(Some((record, len + 8)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::Mood;
    use chrono::NaiveDate;
    use std::io::{Seek, SeekFrom};
    use tempfile::tempdir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, d).unwrap()
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.log");

        let created = {
            let repo = LogRepository::open(&path, LogSyncMode::EveryWrite).unwrap();
            repo.create(NewEntry::new(date(19), "Встреча с командой", Mood::Good))
                .unwrap();
            repo.create(NewEntry::new(date(20), "Продуктивный день", Mood::Great))
                .unwrap()
        };

        let repo = LogRepository::open(&path, LogSyncMode::EveryWrite).unwrap();
        assert_eq!(repo.count().unwrap(), 2);
        let found = repo.find_by_date(date(20)).unwrap().unwrap();
        assert_eq!(found, created);
    }

    #[test]
    fn test_delete_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.log");

        {
            let repo = LogRepository::open(&path, LogSyncMode::EveryWrite).unwrap();
            let keep = repo.create(NewEntry::new(date(18), "keep", Mood::Okay)).unwrap();
            let gone = repo.create(NewEntry::new(date(19), "gone", Mood::Bad)).unwrap();
            assert!(repo.delete(&gone.id).unwrap());
            assert!(!repo.delete("unknown").unwrap());
            assert!(repo.get(&keep.id).unwrap().is_some());
        }

        let repo = LogRepository::open(&path, LogSyncMode::EveryWrite).unwrap();
        let entries = repo.list(None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "keep");
    }

    #[test]
    fn test_torn_tail_is_truncated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.log");

        {
            let repo = LogRepository::open(&path, LogSyncMode::EveryWrite).unwrap();
            repo.create(NewEntry::new(date(18), "first", Mood::Okay)).unwrap();
        }
        let valid_len = std::fs::metadata(&path).unwrap().len();

        // Simulate a crash halfway through the next append
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            file.write_all(&[42, 0, 0, 0, 1, 2, 3]).unwrap();
        }

        {
            let repo = LogRepository::open(&path, LogSyncMode::EveryWrite).unwrap();
            assert_eq!(repo.count().unwrap(), 1);
            assert_eq!(repo.file_size().unwrap(), valid_len);
            repo.create(NewEntry::new(date(19), "second", Mood::Good)).unwrap();
        }

        let repo = LogRepository::open(&path, LogSyncMode::EveryWrite).unwrap();
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_crc_corruption_detection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.log");

        {
            let repo = LogRepository::open(&path, LogSyncMode::EveryWrite).unwrap();
            repo.create(NewEntry::new(date(20), "text", Mood::Great)).unwrap();
        }

        {
            let mut file = OpenOptions::new().write(true).open(&path).unwrap();
            file.seek(SeekFrom::Start(10)).unwrap();
            file.write_all(&[0xFF, 0xFF]).unwrap();
        }

        let repo = LogRepository::open(&path, LogSyncMode::EveryWrite).unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_manual_compaction_drops_dead_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.log");

        let repo = LogRepository::open(&path, LogSyncMode::OsBuffered).unwrap();
        for day in 18..=20 {
            repo.create(NewEntry::new(date(day), "keep", Mood::Great)).unwrap();
        }
        let temp = repo.create(NewEntry::new(date(1), "temp", Mood::Bad)).unwrap();
        repo.delete(&temp.id).unwrap();
        // 2 dead against 3 live: below the automatic threshold
        assert_eq!(repo.dead_records().unwrap(), 2);

        let before = repo.file_size().unwrap();
        repo.compact().unwrap();
        assert!(repo.file_size().unwrap() < before);
        assert_eq!(repo.dead_records().unwrap(), 0);

        // appends after compaction land in the new file
        repo.create(NewEntry::new(date(21), "after", Mood::Good)).unwrap();
        drop(repo);

        let repo = LogRepository::open(&path, LogSyncMode::OsBuffered).unwrap();
        assert_eq!(repo.count().unwrap(), 4);
    }

    #[test]
    fn test_delete_compacts_when_dead_records_outnumber_live() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.log");

        let repo = LogRepository::open(&path, LogSyncMode::OsBuffered).unwrap();
        let keep = repo.create(NewEntry::new(date(20), "keep", Mood::Great)).unwrap();
        let single_record = repo.file_size().unwrap();

        let gone = repo.create(NewEntry::new(date(19), "gone", Mood::Bad)).unwrap();
        assert!(repo.delete(&gone.id).unwrap());

        // 2 dead against 1 live triggers a rewrite
        assert_eq!(repo.dead_records().unwrap(), 0);
        assert_eq!(repo.file_size().unwrap(), single_record);

        repo.create(NewEntry::new(date(21), "after", Mood::Good)).unwrap();
        drop(repo);

        let repo = LogRepository::open(&path, LogSyncMode::OsBuffered).unwrap();
        assert_eq!(repo.count().unwrap(), 2);
        assert!(repo.get(&keep.id).unwrap().is_some());
    }

    #[test]
    fn test_open_compacts_when_dead_records_outnumber_live() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.log");

        let keep = Entry::from_new(NewEntry::new(date(20), "keep", Mood::Great));
        let gone = Entry::from_new(NewEntry::new(date(19), "gone", Mood::Bad));
        {
            let mut file = File::create(&path).unwrap();
            write_record(&mut file, &LogRecord::Put(keep.clone())).unwrap();
            write_record(&mut file, &LogRecord::Put(gone.clone())).unwrap();
            write_record(&mut file, &LogRecord::Delete(gone.id.clone())).unwrap();
        }
        let mut single = Vec::new();
        write_record(&mut single, &LogRecord::Put(keep.clone())).unwrap();

        let repo = LogRepository::open(&path, LogSyncMode::OsBuffered).unwrap();
        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.dead_records().unwrap(), 0);
        assert_eq!(repo.file_size().unwrap(), single.len() as u64);
    }

    #[test]
    fn test_oversized_record_is_refused_without_losing_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entries.log");

        {
            let repo = LogRepository::open(&path, LogSyncMode::EveryWrite).unwrap();
            repo.create(NewEntry::new(date(18), "small before", Mood::Okay)).unwrap();
            let size_before = repo.file_size().unwrap();

            let huge = "ж".repeat(600_000);
            let err = repo.create(NewEntry::new(date(19), huge, Mood::Good)).unwrap_err();
            assert!(matches!(err, StorageError::RecordTooLarge { max: MAX_RECORD_LEN, .. }));
            assert_eq!(repo.file_size().unwrap(), size_before);
            assert_eq!(repo.count().unwrap(), 1);

            repo.create(NewEntry::new(date(20), "small after", Mood::Great)).unwrap();
        }

        let repo = LogRepository::open(&path, LogSyncMode::EveryWrite).unwrap();
        assert_eq!(repo.count().unwrap(), 2);
    }
}
