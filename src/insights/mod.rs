//! Insight Generation
//!
//! Turns the entries of a period into a short summary, key themes and a
//! mood trend label.
//!
//! ## Architecture
//!
//! - **InsightGenerator**: the contract every generator implements
//! - **RuleBasedGenerator**: deterministic local rules (always available)
//! - **RemoteGenerator**: client for an external text-generation service
//! - **FallbackGenerator**: remote first, local rules when the service
//!   fails or runs out of time
//!
//! Entries are never blocked on generation: the journal keeps working
//! when the remote service is down.

mod client;
mod fallback;
mod rules;

pub use client::{RemoteConfig, RemoteGenerator};
pub use fallback::FallbackGenerator;
pub use rules::{extract_themes, RuleBasedGenerator};

use crate::config::InsightsConfig;
use crate::storage::Entry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Summary of one period of journaling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    /// Period label ("Сегодня", "Эта неделя", ...)
    pub period: String,
    /// Natural-language summary
    pub summary: String,
    /// Short theme labels, most prominent first
    pub key_themes: Vec<String>,
    /// Mood trend label
    pub mood_trend: String,
}

/// Produces an insight from the entries of one period
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Generate an insight; `entries` may be empty
    async fn generate(&self, entries: &[Entry], period: &str) -> Result<Insight, InsightError>;

    /// Generator name for logs
    fn name(&self) -> &'static str;
}

/// Errors that can occur during insight generation
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Insight service unavailable")]
    Unavailable,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Build the generator described by configuration
///
/// Without a service URL only local rules are used; with one, the remote
/// service is wrapped in a fallback to local rules.
pub fn from_config(config: &InsightsConfig) -> Result<Arc<dyn InsightGenerator>, InsightError> {
    match &config.url {
        None => Ok(Arc::new(RuleBasedGenerator::new())),
        Some(url) => {
            let remote = RemoteGenerator::new(RemoteConfig {
                base_url: url.trim_end_matches('/').to_string(),
                request_timeout_ms: config.request_timeout_ms,
                max_retries: config.max_retries,
                ..Default::default()
            })?;
            tracing::info!(url = %url, "Remote insight service configured");
            Ok(Arc::new(FallbackGenerator::new(
                Arc::new(remote),
                Duration::from_millis(config.deadline_ms),
            )))
        }
    }
}
