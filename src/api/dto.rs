//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::insights::Insight;
use crate::storage::{parse_day, DateRange, Entry, Mood};

// ============================================
// ENTRY DTOs
// ============================================

/// New entry request
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    /// Entry text
    pub content: String,
    /// Mood name (great, good, okay, bad) or its emoji
    pub mood: String,
    /// Day the entry is for (YYYY-MM-DD), defaults to today
    #[serde(default)]
    pub date: Option<String>,
}

/// Entry as returned by the API
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryDto {
    pub id: String,
    pub date: NaiveDate,
    pub content: String,
    pub mood: Mood,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

impl From<Entry> for EntryDto {
    fn from(entry: Entry) -> Self {
        Self {
            emoji: entry.mood.emoji().to_string(),
            id: entry.id,
            date: entry.date,
            content: entry.content,
            mood: entry.mood,
            created_at: entry.created_at,
        }
    }
}

/// Entry list response
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryListResponse {
    pub entries: Vec<EntryDto>,
    pub count: usize,
}

impl From<Vec<Entry>> for EntryListResponse {
    fn from(entries: Vec<Entry>) -> Self {
        let entries: Vec<EntryDto> = entries.into_iter().map(EntryDto::from).collect();
        Self {
            count: entries.len(),
            entries,
        }
    }
}

/// Entry list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// First day, inclusive (YYYY-MM-DD)
    #[serde(default)]
    pub start: Option<String>,
    /// Last day, inclusive (YYYY-MM-DD)
    #[serde(default)]
    pub end: Option<String>,
}

impl ListParams {
    /// Resolve to a range; None when neither bound is given
    ///
    /// A missing bound is open (years 1 through 9999).
    pub fn range(&self) -> ApiResult<Option<DateRange>> {
        let start = self.start.as_deref().map(parse_date).transpose()?;
        let end = self.end.as_deref().map(parse_date).transpose()?;

        match (start, end) {
            (None, None) => Ok(None),
            (start, end) => {
                let open = DateRange::supported();
                let start = start.unwrap_or(open.start);
                let end = end.unwrap_or(open.end);
                DateRange::try_new(start, end)
                    .map(Some)
                    .ok_or_else(|| ApiError::Validation("start must not be after end".to_string()))
            }
        }
    }
}

// ============================================
// CALENDAR DTOs
// ============================================

/// Entries for one calendar day
#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub date: NaiveDate,
    /// Date as shown in the calendar panel
    pub title: String,
    /// Every entry of the day, newest first
    pub entries: Vec<EntryDto>,
    /// Placeholder text when the day has no entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================
// ANALYTICS / INSIGHT DTOs
// ============================================

/// Analytics query parameters
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsParams {
    /// day, week, month or all (default: month)
    #[serde(default)]
    pub period: Option<String>,
    /// Reference day (default: today)
    #[serde(default)]
    pub date: Option<String>,
}

/// Insight query parameters
#[derive(Debug, Default, Deserialize)]
pub struct InsightParams {
    /// Reference day (default: today)
    #[serde(default)]
    pub date: Option<String>,
    /// Single period instead of day, week and month
    #[serde(default)]
    pub period: Option<String>,
}

/// Insight response
#[derive(Debug, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub date: NaiveDate,
    pub insights: Vec<Insight>,
}

// ============================================
// EXPORT DTOs
// ============================================

/// Export query parameters
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// Format: json, csv
    #[serde(default = "default_export_format")]
    pub format: String,
}

fn default_export_format() -> String {
    "json".to_string()
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy, unhealthy
    pub status: String,
    /// Storage status
    pub storage: String,
    /// Repository backend name
    pub backend: String,
    /// Stored entries, when storage is readable
    pub entries: Option<usize>,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

/// Parse a day parameter into a validation error on failure
pub fn parse_date(input: &str) -> ApiResult<NaiveDate> {
    parse_day(input).ok_or_else(|| ApiError::Validation(format!("invalid date '{}'", input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_range() {
        let params = ListParams::default();
        assert!(params.range().unwrap().is_none());

        let params = ListParams {
            start: Some("2024-11-18".into()),
            end: Some("2024-11-20".into()),
        };
        let range = params.range().unwrap().unwrap();
        assert_eq!(range.len_days(), 3);

        let open_end = ListParams {
            start: Some("2024-11-18".into()),
            end: None,
        };
        assert!(open_end.range().unwrap().unwrap().contains(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));

        let reversed = ListParams {
            start: Some("2024-11-20".into()),
            end: Some("2024-11-18".into()),
        };
        assert!(matches!(reversed.range(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_create_request_date_optional() {
        let req: CreateEntryRequest =
            serde_json::from_str(r#"{"content": "Текст", "mood": "good"}"#).unwrap();
        assert!(req.date.is_none());
    }
}
