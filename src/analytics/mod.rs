//! Mood analytics
//!
//! Derived numbers over journal entries: the per-mood percentage breakdown
//! and the headline cards (entries this month, current streak, average
//! happiness). Everything here is pure and computed from entries on demand.

mod mood;
mod summary;

pub use mood::{MoodBreakdown, MoodShare};
pub use summary::{average_score, current_streak, AnalyticsSummary};
