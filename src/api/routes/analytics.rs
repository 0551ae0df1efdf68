//! Analytics Routes
//!
//! - GET /api/v1/analytics?period=&date= - Mood breakdown and summary cards

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::analytics::AnalyticsSummary;
use crate::api::dto::{parse_date, AnalyticsParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::storage::Period;

/// GET /api/v1/analytics
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsParams>,
) -> ApiResult<Json<AnalyticsSummary>> {
    let period = match params.period.as_deref() {
        Some(raw) => raw.parse::<Period>().map_err(ApiError::Validation)?,
        None => Period::Month,
    };
    let reference = match params.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => state.today(),
    };

    Ok(Json(state.journal.analytics(period, reference)?))
}
