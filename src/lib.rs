//! # Diary
//!
//! Personal journal with mood tracking. Entries are written for a calendar
//! day with a mood; the journal aggregates moods into percentages, keeps a
//! writing streak and produces short period insights.
//!
//! ## Features
//!
//! - **Pluggable storage**: in-memory, SQLite, or an append-only record log
//! - **Mood analytics**: largest-remainder percentages that always sum to 100
//! - **Insights**: local rules, or a remote service with local fallback
//! - **Surfaces**: a CLI (`diary`) and a REST API (`diary-api`)
//!
//! ## Modules
//!
//! - [`storage`]: Entry types and repositories
//! - [`analytics`]: Mood breakdown and summary cards
//! - [`insights`]: Insight generators
//! - [`journal`]: Validated writes and reads over a repository
//! - [`view`]: Screen state machine and text rendering
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use diary::{Config, Journal, Mood, Period};
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let journal = Journal::open(&Config::load_default())?;
//!
//!     let day = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();
//!     journal.submit_entry("Productive day", Mood::Great, day)?;
//!
//!     let summary = journal.analytics(Period::Week, day)?;
//!     println!("Streak: {} days", summary.streak_days);
//!
//!     for insight in journal.insights(day).await? {
//!         println!("{}: {}", insight.period, insight.summary);
//!     }
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod config;
pub mod insights;
pub mod journal;
pub mod logging;
pub mod seed;
pub mod storage;
pub mod transfer;
pub mod view;

// Re-export top-level types for convenience
pub use storage::{
    DateRange, Entry, EntryRepository, LogRepository, MemoryRepository, Mood, NewEntry, Period,
    SqliteRepository, StorageError, StorageResult,
};

pub use analytics::{AnalyticsSummary, MoodBreakdown, MoodShare};

pub use insights::{
    FallbackGenerator, Insight, InsightError, InsightGenerator, RemoteGenerator,
    RuleBasedGenerator,
};

pub use journal::{Journal, JournalError, JournalResult};

pub use view::{Tab, ViewCommand, ViewEvent, ViewState};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, StorageBackend};

pub use transfer::{ExportFormat, ImportReport, TransferError};
