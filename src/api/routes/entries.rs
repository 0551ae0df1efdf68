//! Entry Routes
//!
//! - GET /api/v1/entries - List entries, newest first
//! - POST /api/v1/entries - Write an entry
//! - GET /api/v1/entries/:id - Get an entry
//! - DELETE /api/v1/entries/:id - Delete an entry

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{parse_date, CreateEntryRequest, EntryDto, EntryListResponse, ListParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::storage::Mood;

/// GET /api/v1/entries
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<EntryListResponse>> {
    let range = params.range()?;
    let entries = state.journal.entries(range)?;
    Ok(Json(entries.into()))
}

/// POST /api/v1/entries
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<EntryDto>)> {
    let Json(req) = payload?;

    let mood: Mood = req
        .mood
        .parse()
        .map_err(|e: crate::storage::ParseMoodError| ApiError::Validation(e.to_string()))?;
    let date = match req.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => state.today(),
    };

    let entry = state.journal.submit_entry(&req.content, mood, date)?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// GET /api/v1/entries/:id
pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<EntryDto>> {
    let entry = state.journal.entry(&id)?;
    Ok(Json(entry.into()))
}

/// DELETE /api/v1/entries/:id
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.journal.delete_entry(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
