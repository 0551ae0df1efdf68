//! Core data types for the journal
//!
//! This module defines the fundamental types used throughout the crate:
//! - `Entry`: A single journal record for one calendar day
//! - `Mood`: The four-value ordinal mood scale
//! - `DateRange`: An inclusive range of calendar days
//! - `Period`: A named window (day, week, month) resolved against a date

use chrono::{DateTime, Datelike, Duration, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Daily emotional state, ordered from worst to best
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Bad,
    Okay,
    Good,
    Great,
}

impl Mood {
    /// All moods, best first (display order of the mood picker and bars)
    pub fn all() -> &'static [Mood] {
        &[Mood::Great, Mood::Good, Mood::Okay, Mood::Bad]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Great => "great",
            Mood::Good => "good",
            Mood::Okay => "okay",
            Mood::Bad => "bad",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Great => "😊",
            Mood::Good => "🙂",
            Mood::Okay => "😐",
            Mood::Bad => "😔",
        }
    }

    /// Label shown next to the analytics bar
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Great => "Отличное",
            Mood::Good => "Хорошее",
            Mood::Okay => "Нормальное",
            Mood::Bad => "Плохое",
        }
    }

    /// Happiness score on a 10-point scale
    pub fn score(&self) -> f64 {
        match self {
            Mood::Great => 10.0,
            Mood::Good => 7.5,
            Mood::Okay => 5.0,
            Mood::Bad => 2.5,
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known mood
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mood '{0}' (expected great, good, okay or bad)")]
pub struct ParseMoodError(pub String);

impl FromStr for Mood {
    type Err = ParseMoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(mood) = Mood::all().iter().find(|m| m.emoji() == trimmed) {
            return Ok(*mood);
        }

        match trimmed.to_lowercase().as_str() {
            "great" => Ok(Mood::Great),
            "good" => Ok(Mood::Good),
            "okay" | "ok" => Ok(Mood::Okay),
            "bad" => Ok(Mood::Bad),
            _ => Err(ParseMoodError(s.to_string())),
        }
    }
}

/// A single journal entry
///
/// Entries are keyed by calendar day; `created_at` orders entries that
/// share the same day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Calendar day the entry belongs to
    pub date: NaiveDate,
    /// Free-text content
    pub content: String,
    /// Mood rating for the day
    pub mood: Mood,
    /// When the entry was stored
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Materialize a new entry with a fresh id and the current time
    ///
    /// Creation times are kept at microsecond precision, the finest
    /// precision every backend stores.
    pub fn from_new(new: NewEntry) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date: new.date,
            content: new.content,
            mood: new.mood,
            created_at: new.created_at.unwrap_or_else(Utc::now).trunc_subsecs(6),
        }
    }

    /// Newest-first ordering: by date, then by creation time
    pub fn newest_first(a: &Entry, b: &Entry) -> std::cmp::Ordering {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    }
}

/// Input for creating an entry
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub content: String,
    pub mood: Mood,
    /// Override the creation time (imports, seeding)
    pub created_at: Option<DateTime<Utc>>,
}

impl NewEntry {
    pub fn new(date: NaiveDate, content: impl Into<String>, mood: Mood) -> Self {
        Self {
            date,
            content: content.into(),
            mood,
            created_at: None,
        }
    }

    /// Builder: set creation time
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }
}

/// Inclusive range of calendar days: [start, end]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, returning None if start is after end
    pub fn try_new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// A range covering exactly one day
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Every day accepted from user input: years 1 through 9999
    pub fn supported() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX),
        }
    }

    /// The last `days` days ending on (and including) `end`
    ///
    /// The start never goes below the first supported day.
    pub fn last_days(end: NaiveDate, days: u32) -> Self {
        let floor = Self::supported().start.min(end);
        let span = Duration::days(i64::from(days.max(1)) - 1);
        let start = end
            .checked_sub_signed(span)
            .map_or(floor, |start| start.max(floor));
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days in the range
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Named aggregation window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    All,
}

impl Period {
    /// Periods that get an insight card, in display order
    pub fn insight_periods() -> &'static [Period] {
        &[Period::Day, Period::Week, Period::Month]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Day => "Сегодня",
            Period::Week => "Эта неделя",
            Period::Month => "Этот месяц",
            Period::All => "Всё время",
        }
    }

    /// Resolve to a date range containing `reference`
    ///
    /// Weeks run Monday through Sunday; months are calendar months, both
    /// clamped to chrono's representable days. `All` yields None (no
    /// filtering).
    pub fn range(&self, reference: NaiveDate) -> Option<DateRange> {
        match self {
            Period::Day => Some(DateRange::day(reference)),
            Period::Week => {
                let offset = Duration::days(i64::from(reference.weekday().num_days_from_monday()));
                let start = reference.checked_sub_signed(offset).unwrap_or(NaiveDate::MIN);
                let end = start
                    .checked_add_signed(Duration::days(6))
                    .unwrap_or(NaiveDate::MAX);
                Some(DateRange { start, end })
            }
            Period::Month => {
                let start = reference.with_day(1).unwrap_or(reference);
                let next = if start.month() == 12 {
                    NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
                };
                let end = next.and_then(|d| d.pred_opt()).unwrap_or(NaiveDate::MAX);
                Some(DateRange { start, end })
            }
            Period::All => None,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Day => write!(f, "day"),
            Period::Week => write!(f, "week"),
            Period::Month => write!(f, "month"),
            Period::All => write!(f, "all"),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "today" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "all" => Ok(Period::All),
            other => Err(format!("unknown period '{}' (expected day, week, month or all)", other)),
        }
    }
}

/// Parse a calendar day from user input
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; timestamps are truncated
/// to the calendar day in their own offset, so the time of day never
/// affects which entry matches. Days outside years 1 through 9999 are
/// rejected.
pub fn parse_day(input: &str) -> Option<NaiveDate> {
    parse_any_day(input).filter(|day| DateRange::supported().contains(*day))
}

fn parse_any_day(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}
