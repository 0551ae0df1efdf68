//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::journal::Journal;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Instant;

pub use crate::config::ApiConfig;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The journal every handler reads and writes through
    pub journal: Arc<Journal>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(journal: Arc<Journal>, config: ApiConfig) -> Self {
        Self {
            journal,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Local calendar day used when a request names no date
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
