//! Insight service client
//!
//! HTTP client for an external text-generation service. The service gets
//! the period label and the period's entries and answers with a summary,
//! themes and a trend label.

use crate::insights::{Insight, InsightError, InsightGenerator};
use crate::storage::Entry;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the remote generator
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the service (e.g., "http://localhost:8081")
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum attempts per generation
    pub max_retries: u32,
    /// Backoff unit; attempt n waits n² units
    pub backoff_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            request_timeout_ms: 5000,
            max_retries: 3,
            backoff_ms: 1000,
        }
    }
}

/// Generator backed by the insight service
pub struct RemoteGenerator {
    client: Client,
    config: RemoteConfig,
}

impl RemoteGenerator {
    pub fn new(config: RemoteConfig) -> Result<Self, InsightError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    /// Wait requested by a `Retry-After` header, never longer than one
    /// request timeout
    fn retry_after_delay(&self, secs: u64) -> Duration {
        Duration::from_secs(secs).min(Duration::from_millis(self.config.request_timeout_ms))
    }

    /// POST with retry on transient failures
    ///
    /// Timeouts, refused connections, 429 and 5xx are retried with
    /// quadratic backoff; any other status fails immediately.
    async fn send_post<T: Serialize>(&self, url: &str, body: &T) -> Result<InsightResponse, InsightError> {
        let mut last_error = InsightError::Unavailable;

        for attempt in 0..self.config.max_retries.max(1) {
            if attempt > 0 {
                let units = u64::from(attempt).pow(2);
                tokio::time::sleep(Duration::from_millis(self.config.backoff_ms * units)).await;
            }

            match self.client.post(url).json(body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<InsightResponse>()
                            .await
                            .map_err(|e| InsightError::InvalidResponse(e.to_string()));
                    } else if status == StatusCode::TOO_MANY_REQUESTS {
                        if let Some(secs) = response
                            .headers()
                            .get("Retry-After")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                        {
                            tokio::time::sleep(self.retry_after_delay(secs)).await;
                        }
                        last_error = InsightError::RateLimited;
                    } else if status.is_server_error() {
                        let text = response.text().await.unwrap_or_default();
                        tracing::debug!(status = status.as_u16(), attempt, "Insight service error, retrying");
                        last_error = InsightError::ApiError {
                            status: status.as_u16(),
                            message: text,
                        };
                    } else {
                        let text = response.text().await.unwrap_or_default();
                        return Err(InsightError::ApiError {
                            status: status.as_u16(),
                            message: text,
                        });
                    }
                }
                Err(e) => {
                    last_error = classify(e);
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl InsightGenerator for RemoteGenerator {
    async fn generate(&self, entries: &[Entry], period: &str) -> Result<Insight, InsightError> {
        let url = format!("{}/v1/insights", self.config.base_url);

        let body = InsightRequest {
            period,
            entries: entries
                .iter()
                .map(|e| RequestEntry {
                    date: e.date.to_string(),
                    mood: e.mood.as_str(),
                    content: &e.content,
                })
                .collect(),
        };

        let response = self.send_post(&url, &body).await?;
        if response.summary.trim().is_empty() {
            return Err(InsightError::InvalidResponse("empty summary".to_string()));
        }

        Ok(Insight {
            period: period.to_string(),
            summary: response.summary,
            key_themes: response.key_themes,
            mood_trend: response.mood_trend,
        })
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

fn classify(e: reqwest::Error) -> InsightError {
    if e.is_timeout() {
        InsightError::Timeout
    } else if e.is_connect() {
        InsightError::Unavailable
    } else {
        InsightError::Request(e)
    }
}

// ============================================
// Request/Response DTOs
// ============================================

#[derive(Debug, Serialize)]
struct InsightRequest<'a> {
    period: &'a str,
    entries: Vec<RequestEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestEntry<'a> {
    date: String,
    mood: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsightResponse {
    summary: String,
    #[serde(default)]
    key_themes: Vec<String>,
    #[serde(default)]
    mood_trend: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Mood, NewEntry};
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn sample() -> Vec<Entry> {
        vec![Entry::from_new(NewEntry::new(
            NaiveDate::from_ymd_opt(2024, 11, 20).unwrap(),
            "Продуктивный день",
            Mood::Great,
        ))]
    }

    fn generator(base_url: String) -> RemoteGenerator {
        RemoteGenerator::new(RemoteConfig {
            base_url,
            request_timeout_ms: 1000,
            max_retries: 3,
            backoff_ms: 1,
        })
        .unwrap()
    }

    fn reply() -> serde_json::Value {
        serde_json::json!({
            "summary": "Отличный день",
            "keyThemes": ["Работа"],
            "moodTrend": "Отличное настроение"
        })
    }

    #[test]
    fn test_default_config() {
        let config = RemoteConfig::default();
        assert_eq!(config.base_url, "http://localhost:8081");
        assert_eq!(config.max_retries, 3);
    }

    #[tokio::test]
    async fn test_generate_success() {
        let router = Router::new().route(
            "/v1/insights",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["period"], "Сегодня");
                assert_eq!(body["entries"][0]["mood"], "great");
                Json(reply())
            }),
        );
        let url = spawn(router).await;

        let insight = generator(url).generate(&sample(), "Сегодня").await.unwrap();
        assert_eq!(insight.period, "Сегодня");
        assert_eq!(insight.summary, "Отличный день");
        assert_eq!(insight.key_themes, vec!["Работа".to_string()]);
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/v1/insights",
            post(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(AxumStatus::SERVICE_UNAVAILABLE)
                    } else {
                        Ok(Json(reply()))
                    }
                }
            }),
        );
        let url = spawn(router).await;

        let insight = generator(url).generate(&sample(), "Сегодня").await.unwrap();
        assert_eq!(insight.mood_trend, "Отличное настроение");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_retry_after_is_capped() {
        let generator = generator("http://localhost:1".to_string());
        assert_eq!(generator.retry_after_delay(0), Duration::ZERO);
        assert_eq!(generator.retry_after_delay(3600), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_long_retry_after_does_not_stall() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/v1/insights",
            post(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err((AxumStatus::TOO_MANY_REQUESTS, [("Retry-After", "3600")]))
                    } else {
                        Ok(Json(reply()))
                    }
                }
            }),
        );
        let url = spawn(router).await;

        let insight = tokio::time::timeout(
            Duration::from_secs(10),
            generator(url).generate(&sample(), "Сегодня"),
        )
        .await
        .expect("retry waited for the full Retry-After")
        .unwrap();
        assert_eq!(insight.summary, "Отличный день");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_fails_fast() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/v1/insights",
            post(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { AxumStatus::BAD_REQUEST }
            }),
        );
        let url = spawn(router).await;

        let err = generator(url).generate(&sample(), "Сегодня").await.unwrap_err();
        assert!(matches!(err, InsightError::ApiError { status: 400, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = generator(format!("http://{}", addr))
            .generate(&sample(), "Сегодня")
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::Unavailable | InsightError::Request(_)));
    }
}
