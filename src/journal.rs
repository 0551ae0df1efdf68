//! Journal service
//!
//! Ties the entry repository, the insight generator and the journaling
//! policy together. Every outer surface (CLI, HTTP API, view) goes
//! through `Journal`.

use crate::analytics::AnalyticsSummary;
use crate::config::{Config, JournalConfig};
use crate::insights::{self, Insight, InsightError, InsightGenerator};
use crate::storage::{
    self, DateRange, Entry, EntryRepository, Mood, NewEntry, Period, StorageError,
};
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by journal operations
#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Entry content is empty")]
    EmptyContent,

    #[error("Entry content is too long: {len} characters (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("An entry for {0} already exists")]
    DuplicateDay(NaiveDate),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Insight error: {0}")]
    Insight(#[from] InsightError),
}

pub type JournalResult<T> = Result<T, JournalError>;

/// The journal: validated writes, lookups, analytics and insights
pub struct Journal {
    repo: Arc<dyn EntryRepository>,
    generator: Arc<dyn InsightGenerator>,
    config: JournalConfig,
    /// Serializes the per-day check with the create
    submit_lock: Mutex<()>,
}

impl Journal {
    pub fn new(
        repo: Arc<dyn EntryRepository>,
        generator: Arc<dyn InsightGenerator>,
        config: JournalConfig,
    ) -> Self {
        Self {
            repo,
            generator,
            config,
            submit_lock: Mutex::new(()),
        }
    }

    /// Open the repository and generator described by `config`
    pub fn open(config: &Config) -> JournalResult<Self> {
        let repo = storage::open_repository(&config.storage)?;
        let generator = insights::from_config(&config.insights)?;
        Ok(Self::new(repo, generator, config.journal.clone()))
    }

    pub fn backend(&self) -> &'static str {
        self.repo.backend()
    }

    /// Validate and store a new entry
    pub fn submit_entry(&self, content: &str, mood: Mood, date: NaiveDate) -> JournalResult<Entry> {
        self.store(NewEntry::new(date, content, mood))
    }

    /// Store an entry that already carries its creation time (imports)
    pub fn import_entry(&self, new: NewEntry) -> JournalResult<Entry> {
        self.store(new)
    }

    fn store(&self, mut new: NewEntry) -> JournalResult<Entry> {
        let content = new.content.trim();
        if content.is_empty() {
            return Err(JournalError::EmptyContent);
        }
        let len = content.chars().count();
        let max = self.config.content_limit();
        if len > max {
            return Err(JournalError::TooLong { len, max });
        }
        new.content = content.to_string();

        let _guard = self
            .submit_lock
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        if self.config.one_entry_per_day && self.repo.find_by_date(new.date)?.is_some() {
            return Err(JournalError::DuplicateDay(new.date));
        }

        let entry = self.repo.create(new)?;
        tracing::info!(
            id = %entry.id,
            date = %entry.date,
            mood = %entry.mood,
            chars = len,
            "Entry saved"
        );
        Ok(entry)
    }

    /// Entries in `range` (all when None), newest first
    pub fn entries(&self, range: Option<DateRange>) -> JournalResult<Vec<Entry>> {
        Ok(self.repo.list(range)?)
    }

    pub fn entry(&self, id: &str) -> JournalResult<Entry> {
        self.repo
            .get(id)?
            .ok_or_else(|| JournalError::NotFound(id.to_string()))
    }

    pub fn delete_entry(&self, id: &str) -> JournalResult<()> {
        if self.repo.delete(id)? {
            tracing::info!(id = %id, "Entry deleted");
            Ok(())
        } else {
            Err(JournalError::NotFound(id.to_string()))
        }
    }

    /// Most recent entry written for `date`
    pub fn entry_on(&self, date: NaiveDate) -> JournalResult<Option<Entry>> {
        Ok(self.repo.find_by_date(date)?)
    }

    /// Every entry for `date`, newest first
    pub fn entries_on(&self, date: NaiveDate) -> JournalResult<Vec<Entry>> {
        Ok(self.repo.find_all_by_date(date)?)
    }

    pub fn count(&self) -> JournalResult<usize> {
        Ok(self.repo.count()?)
    }

    /// Mood breakdown and summary cards for `period` around `reference`
    pub fn analytics(&self, period: Period, reference: NaiveDate) -> JournalResult<AnalyticsSummary> {
        let entries = self.repo.list(None)?;
        Ok(AnalyticsSummary::compute(&entries, period, reference))
    }

    /// Insight for one period
    pub async fn insight(&self, period: Period, reference: NaiveDate) -> JournalResult<Insight> {
        let entries = self.repo.list(period.range(reference))?;
        let insight = self.generator.generate(&entries, period.label()).await?;
        tracing::debug!(
            period = %period,
            entries = entries.len(),
            generator = self.generator.name(),
            "Insight generated"
        );
        Ok(insight)
    }

    /// Insights for today, this week and this month
    pub async fn insights(&self, reference: NaiveDate) -> JournalResult<Vec<Insight>> {
        let mut out = Vec::with_capacity(Period::insight_periods().len());
        for period in Period::insight_periods() {
            out.push(self.insight(*period, reference).await?);
        }
        Ok(out)
    }
}
