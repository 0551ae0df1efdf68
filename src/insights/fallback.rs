//! Remote-with-fallback generator
//!
//! Runs the primary generator under an overall deadline and answers from
//! local rules when it fails or runs late.

use crate::insights::{Insight, InsightError, InsightGenerator, RuleBasedGenerator};
use crate::storage::Entry;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub struct FallbackGenerator {
    primary: Arc<dyn InsightGenerator>,
    fallback: RuleBasedGenerator,
    deadline: Duration,
}

impl FallbackGenerator {
    pub fn new(primary: Arc<dyn InsightGenerator>, deadline: Duration) -> Self {
        Self {
            primary,
            fallback: RuleBasedGenerator::new(),
            deadline,
        }
    }
}

#[async_trait]
impl InsightGenerator for FallbackGenerator {
    async fn generate(&self, entries: &[Entry], period: &str) -> Result<Insight, InsightError> {
        match tokio::time::timeout(self.deadline, self.primary.generate(entries, period)).await {
            Ok(Ok(insight)) => Ok(insight),
            Ok(Err(e)) => {
                tracing::warn!(
                    generator = self.primary.name(),
                    error = %e,
                    period,
                    "Insight generation failed, using local rules"
                );
                Ok(self.fallback.build(entries, period))
            }
            Err(_) => {
                tracing::warn!(
                    generator = self.primary.name(),
                    deadline_ms = self.deadline.as_millis() as u64,
                    period,
                    "Insight generation timed out, using local rules"
                );
                Ok(self.fallback.build(entries, period))
            }
        }
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}
