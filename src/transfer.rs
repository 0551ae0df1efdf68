//! Import and export
//!
//! Entries go out as JSON or CSV (`date,mood,content,id,created_at`) and
//! come in from CSV files with at least `date`, `mood` and `content`
//! columns. Bad rows are collected as errors; they never abort an import.

use crate::journal::Journal;
use crate::storage::{parse_day, Entry, Mood, NewEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors reported past the first few are summarized
const MAX_REPORTED_ERRORS: usize = 100;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown export format '{}' (expected json or csv)", other)),
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    date: String,
    mood: &'static str,
    content: &'a str,
    id: &'a str,
    created_at: String,
}

/// Serialize entries in the given format
pub fn export(entries: &[Entry], format: ExportFormat) -> Result<String, TransferError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(entries)?),
        ExportFormat::Csv => export_csv(entries),
    }
}

fn export_csv(entries: &[Entry]) -> Result<String, TransferError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for entry in entries {
        writer.serialize(CsvRow {
            date: entry.date.to_string(),
            mood: entry.mood.as_str(),
            content: &entry.content,
            id: &entry.id,
            created_at: entry.created_at.to_rfc3339(),
        })?;
    }
    // an empty export still carries the header
    if entries.is_empty() {
        writer.write_record(["date", "mood", "content", "id", "created_at"])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| TransferError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| TransferError::Encoding(e.to_string()))
}

/// Column positions of an import file
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    mood: usize,
    content: usize,
    created_at: Option<usize>,
}

impl Columns {
    const POSITIONAL: Columns = Columns {
        date: 0,
        mood: 1,
        content: 2,
        created_at: None,
    };

    /// Detect a header row; None when the row is data
    fn detect(record: &csv::StringRecord) -> Option<Self> {
        let find = |name: &str| {
            record
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        Some(Columns {
            date: find("date")?,
            mood: find("mood")?,
            content: find("content")?,
            created_at: find("created_at"),
        })
    }
}

/// Rows parsed from a CSV file
#[derive(Debug, Default)]
pub struct ParsedCsv {
    pub entries: Vec<NewEntry>,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

/// Parse entries from CSV, reporting at most `MAX_REPORTED_ERRORS` errors
pub fn read_csv<R: Read>(reader: R) -> Result<ParsedCsv, TransferError> {
    let mut parsed = parse_csv(reader)?;
    cap_errors(&mut parsed.errors);
    Ok(parsed)
}

fn parse_csv<R: Read>(reader: R) -> Result<ParsedCsv, TransferError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut parsed = ParsedCsv::default();
    let mut columns = Columns::POSITIONAL;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                parsed.errors.push(format!("Line {}: {}", line, e));
                parsed.rows_failed += 1;
                continue;
            }
        };

        if idx == 0 {
            if let Some(detected) = Columns::detect(&record) {
                columns = detected;
                continue;
            }
        }

        match parse_row(&record, columns) {
            Ok(entry) => parsed.entries.push(entry),
            Err(message) => {
                parsed.errors.push(format!("Line {}: {}", line, message));
                parsed.rows_failed += 1;
            }
        }
    }

    Ok(parsed)
}

fn cap_errors(errors: &mut Vec<String>) {
    if errors.len() > MAX_REPORTED_ERRORS {
        let total = errors.len();
        errors.truncate(MAX_REPORTED_ERRORS);
        errors.push(format!("... and {} more errors", total - MAX_REPORTED_ERRORS));
    }
}

fn parse_row(record: &csv::StringRecord, columns: Columns) -> Result<NewEntry, String> {
    let field = |idx: usize, name: &str| {
        record
            .get(idx)
            .map(str::trim)
            .ok_or_else(|| format!("missing {} column", name))
    };

    let raw_date = field(columns.date, "date")?;
    let date = parse_day(raw_date).ok_or_else(|| format!("invalid date '{}'", raw_date))?;
    let mood: Mood = field(columns.mood, "mood")?
        .parse()
        .map_err(|e: crate::storage::ParseMoodError| e.to_string())?;
    let content = field(columns.content, "content")?;

    let mut entry = NewEntry::new(date, content, mood);
    if let Some(raw) = columns
        .created_at
        .and_then(|idx| record.get(idx))
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let at = DateTime::parse_from_rfc3339(raw)
            .map_err(|_| format!("invalid created_at '{}'", raw))?;
        entry = entry.created_at(at.with_timezone(&Utc));
    }
    Ok(entry)
}

/// Outcome of an import
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub rows_read: usize,
    pub imported: usize,
    pub rows_failed: usize,
    pub errors: Vec<String>,
}

/// Parse CSV and store every valid row through the journal
pub fn import_csv<R: Read>(journal: &Journal, reader: R) -> Result<ImportReport, TransferError> {
    let parsed = parse_csv(reader)?;
    let mut report = ImportReport {
        rows_read: parsed.entries.len() + parsed.rows_failed,
        rows_failed: parsed.rows_failed,
        errors: parsed.errors,
        ..Default::default()
    };

    for new in parsed.entries {
        let date = new.date;
        match journal.import_entry(new) {
            Ok(_) => report.imported += 1,
            Err(e) => {
                report.rows_failed += 1;
                report.errors.push(format!("{}: {}", date, e));
            }
        }
    }
    cap_errors(&mut report.errors);

    tracing::info!(
        imported = report.imported,
        failed = report.rows_failed,
        "CSV import finished"
    );
    Ok(report)
}

pub fn import_csv_path(journal: &Journal, path: &Path) -> Result<ImportReport, TransferError> {
    let file = std::fs::File::open(path)?;
    import_csv(journal, file)
}
