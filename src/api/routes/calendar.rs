//! Calendar Routes
//!
//! - GET /api/v1/calendar/:date - Entries written for one day

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{parse_date, CalendarResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::view::render::{format_date, PLACEHOLDER_NO_ENTRIES};

/// GET /api/v1/calendar/:date
///
/// Accepts a plain day or a full timestamp; only the calendar day counts.
pub async fn day_entries(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> ApiResult<Json<CalendarResponse>> {
    let date = parse_date(&raw)?;
    let entries = state.journal.entries_on(date)?;

    let message = entries
        .is_empty()
        .then(|| PLACEHOLDER_NO_ENTRIES.to_string());

    Ok(Json(CalendarResponse {
        date,
        title: format_date(date),
        entries: entries.into_iter().map(Into::into).collect(),
        message,
    }))
}
