//! Insight Routes
//!
//! - GET /api/v1/insights?date= - Insights for today, this week, this month
//! - GET /api/v1/insights?date=&period= - Insight for one period

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{parse_date, InsightParams, InsightsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::storage::Period;

/// GET /api/v1/insights
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InsightParams>,
) -> ApiResult<Json<InsightsResponse>> {
    let date = match params.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => state.today(),
    };

    let insights = match params.period.as_deref() {
        Some(raw) => {
            let period = raw.parse::<Period>().map_err(ApiError::Validation)?;
            vec![state.journal.insight(period, date).await?]
        }
        None => state.journal.insights(date).await?,
    };

    Ok(Json(InsightsResponse { date, insights }))
}
