//! Diary REST API
//!
//! HTTP API layer for the journal, built with Axum.
//!
//! # Endpoints
//!
//! ## Entries
//! - `GET /api/v1/entries?start=&end=` - List entries, newest first
//! - `POST /api/v1/entries` - Write an entry
//! - `GET /api/v1/entries/:id` - Get an entry
//! - `DELETE /api/v1/entries/:id` - Delete an entry
//!
//! ## Calendar
//! - `GET /api/v1/calendar/:date` - Entries for one day
//!
//! ## Analytics & Insights
//! - `GET /api/v1/analytics?period=&date=` - Mood breakdown and cards
//! - `GET /api/v1/insights?date=&period=` - Period insights
//!
//! ## Export
//! - `GET /api/v1/export?format=json|csv` - Export entries
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use diary::api::{serve, AppState};
//! use diary::{Config, Journal};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let journal = Arc::new(Journal::open(&config)?);
//!
//!     let state = AppState::new(journal, config.api.clone());
//!     serve(state).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Entry routes
        .route(
            "/entries",
            get(routes::entries::list_entries).post(routes::entries::create_entry),
        )
        .route(
            "/entries/:id",
            get(routes::entries::get_entry).delete(routes::entries::delete_entry),
        )
        // Calendar routes
        .route("/calendar/:date", get(routes::calendar::day_entries))
        // Analytics routes
        .route("/analytics", get(routes::analytics::get_analytics))
        .route("/insights", get(routes::insights::get_insights))
        // Export routes
        .route("/export", get(routes::export::export_entries));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Diary API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Diary API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, JournalConfig, StorageBackend};
    use crate::insights::RuleBasedGenerator;
    use crate::journal::Journal;
    use crate::seed;
    use crate::storage::MemoryRepository;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    fn journal_with(config: JournalConfig) -> Arc<Journal> {
        Arc::new(Journal::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(RuleBasedGenerator::new()),
            config,
        ))
    }

    fn create_test_app() -> Router {
        let journal = journal_with(JournalConfig::default());
        seed::load(&journal).unwrap();
        build_router(AppState::new(journal, ApiConfig::default()))
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = create_test_app();
        for uri in ["/health/live", "/health/ready", "/health"] {
            let response = get(app.clone(), uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }

        let body = json_body(get(app, "/health").await).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["entries"], 3);
        assert_eq!(body["backend"], "memory");
    }

    #[tokio::test]
    async fn test_list_entries_newest_first() {
        let app = create_test_app();
        let body = json_body(get(app.clone(), "/api/v1/entries").await).await;

        assert_eq!(body["count"], 3);
        assert_eq!(body["entries"][0]["date"], "2024-11-20");
        assert_eq!(body["entries"][2]["date"], "2024-11-18");

        let body = json_body(get(app, "/api/v1/entries?start=2024-11-19&end=2024-11-20").await).await;
        assert_eq!(body["count"], 2);
    }

    #[tokio::test]
    async fn test_list_entries_bad_range() {
        let app = create_test_app();
        let response = get(app, "/api/v1/entries?start=2024-11-20&end=2024-11-01").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_entry() {
        let app = create_test_app();
        let response = post_json(
            app.clone(),
            "/api/v1/entries",
            r#"{"content": "Новый день", "mood": "good", "date": "2024-11-21"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = json_body(response).await;
        assert_eq!(created["emoji"], "🙂");
        let id = created["id"].as_str().unwrap().to_string();

        let fetched = get(app, &format!("/api/v1/entries/{}", id)).await;
        assert_eq!(fetched.status(), StatusCode::OK);
        assert_eq!(json_body(fetched).await["content"], "Новый день");
    }

    #[tokio::test]
    async fn test_create_entry_validation() {
        let app = create_test_app();

        let blank = post_json(app.clone(), "/api/v1/entries", r#"{"content": "  ", "mood": "good"}"#).await;
        assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
        let body = json_body(blank).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["request_id"].is_string());

        let mood = post_json(app.clone(), "/api/v1/entries", r#"{"content": "x", "mood": "ecstatic"}"#).await;
        assert_eq!(mood.status(), StatusCode::BAD_REQUEST);

        let date = post_json(
            app.clone(),
            "/api/v1/entries",
            r#"{"content": "x", "mood": "good", "date": "yesterday-ish"}"#,
        )
        .await;
        assert_eq!(date.status(), StatusCode::BAD_REQUEST);

        let garbage = post_json(app, "/api/v1/entries", "not json").await;
        assert_eq!(garbage.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_day_conflict() {
        let journal = journal_with(JournalConfig {
            one_entry_per_day: true,
            ..Default::default()
        });
        seed::load(&journal).unwrap();
        let app = build_router(AppState::new(journal, ApiConfig::default()));

        let response = post_json(
            app,
            "/api/v1/entries",
            r#"{"content": "Ещё одна", "mood": "bad", "date": "2024-11-20"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_get_and_delete_unknown_entry() {
        let app = create_test_app();
        assert_eq!(get(app.clone(), "/api/v1/entries/missing").await.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/entries/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_calendar_day() {
        let app = create_test_app();

        let body = json_body(get(app.clone(), "/api/v1/calendar/2024-11-20").await).await;
        assert_eq!(body["title"], "20 ноября 2024 г.");
        assert!(body["entries"][0]["content"]
            .as_str()
            .unwrap()
            .starts_with("Сегодня был продуктивный день"));
        assert!(body.get("message").is_none());

        // time of day is ignored
        let body = json_body(get(app.clone(), "/api/v1/calendar/2024-11-20T23:15:00Z").await).await;
        assert_eq!(body["entries"].as_array().unwrap().len(), 1);

        let body = json_body(get(app.clone(), "/api/v1/calendar/2025-01-01").await).await;
        assert_eq!(body["message"], "Нет записей на эту дату");
        assert!(body["entries"].as_array().unwrap().is_empty());

        assert_eq!(get(app, "/api/v1/calendar/someday").await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analytics() {
        let app = create_test_app();
        let body = json_body(get(app.clone(), "/api/v1/analytics?period=week&date=2024-11-20").await).await;

        assert_eq!(body["breakdown"]["total"], 3);
        assert_eq!(body["streak_days"], 3);
        let sum: u64 = body["breakdown"]["shares"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["percent"].as_u64().unwrap())
            .sum();
        assert_eq!(sum, 100);

        let bad = get(app, "/api/v1/analytics?period=decade").await;
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extreme_dates_are_validation_errors() {
        let app = create_test_app();
        for uri in [
            "/api/v1/analytics?period=week&date=%2B262142-12-31",
            "/api/v1/insights?date=%2B262142-12-31",
            "/api/v1/calendar/%2B262142-12-31",
            "/api/v1/entries?start=-0001-01-01",
        ] {
            let response = get(app.clone(), uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body = json_body(response).await;
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{}", uri);
        }

        let body = json_body(get(app, "/api/v1/analytics?period=week&date=9999-12-31").await).await;
        assert_eq!(body["breakdown"]["total"], 0);
    }

    #[tokio::test]
    async fn test_insights() {
        let app = create_test_app();
        let body = json_body(get(app.clone(), "/api/v1/insights?date=2024-11-20").await).await;

        let insights = body["insights"].as_array().unwrap();
        assert_eq!(insights.len(), 3);
        assert_eq!(insights[0]["period"], "Сегодня");
        assert!(insights[0]["keyThemes"].is_array());

        let body = json_body(get(app, "/api/v1/insights?date=2024-11-20&period=month").await).await;
        assert_eq!(body["insights"][0]["period"], "Этот месяц");
    }

    #[tokio::test]
    async fn test_export_formats() {
        let app = create_test_app();

        let csv = get(app.clone(), "/api/v1/export?format=csv").await;
        assert_eq!(csv.status(), StatusCode::OK);
        assert_eq!(csv.headers()["content-type"], "text/csv");
        let bytes = to_bytes(csv.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8(bytes.to_vec())
            .unwrap()
            .starts_with("date,mood,content,id,created_at"));

        let json = get(app.clone(), "/api/v1/export").await;
        assert_eq!(json.status(), StatusCode::OK);
        assert_eq!(json_body(json).await.as_array().unwrap().len(), 3);

        assert_eq!(get(app, "/api/v1/export?format=xml").await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_disabled() {
        let journal = journal_with(JournalConfig::default());
        let config = ApiConfig {
            enable_export: false,
            ..Default::default()
        };
        let app = build_router(AppState::new(journal, config));
        assert_eq!(get(app, "/api/v1/export").await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_sqlite_backed_app() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Sqlite;
        config.storage.data_dir = dir.path().to_string_lossy().to_string();

        let journal = Arc::new(Journal::open(&config).unwrap());
        let app = build_router(AppState::new(journal, config.api.clone()));

        let response = post_json(
            app.clone(),
            "/api/v1/entries",
            r#"{"content": "На диске", "mood": "okay", "date": "2024-11-22"}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(get(app, "/api/v1/calendar/2024-11-22").await).await;
        assert_eq!(body["entries"][0]["content"], "На диске");
    }
}
