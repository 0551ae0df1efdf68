//! Analytics summary
//!
//! The numbers behind the analytics panel: the mood breakdown for a
//! period plus three headline cards.

use crate::analytics::mood::MoodBreakdown;
use crate::storage::{DateRange, Entry, Period};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// Everything the analytics panel shows
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyticsSummary {
    pub period: Period,
    pub reference: NaiveDate,
    /// Resolved range; None for all time
    pub range: Option<DateRange>,
    pub breakdown: MoodBreakdown,
    /// Entries in the reference date's calendar month
    pub entries_this_month: usize,
    /// Consecutive days with an entry, ending today or yesterday
    pub streak_days: u32,
    /// Mean happiness on a 10-point scale, one decimal
    pub average_score: Option<f64>,
}

impl AnalyticsSummary {
    /// Compute the summary from the full entry list
    pub fn compute(entries: &[Entry], period: Period, reference: NaiveDate) -> Self {
        let range = period.range(reference);
        let in_period: Vec<&Entry> = entries
            .iter()
            .filter(|e| range.map(|r| r.contains(e.date)).unwrap_or(true))
            .collect();

        let entries_this_month = match Period::Month.range(reference) {
            Some(month) => entries.iter().filter(|e| month.contains(e.date)).count(),
            None => 0,
        };

        Self {
            period,
            reference,
            range,
            breakdown: MoodBreakdown::from_entries(in_period.iter().copied()),
            entries_this_month,
            streak_days: current_streak(entries, reference),
            average_score: average_score(in_period.iter().copied()),
        }
    }
}

/// Mean mood score rounded to one decimal, None when there are no entries
pub fn average_score<'a, I>(entries: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let scores: Vec<f64> = entries.into_iter().map(|e| e.mood.score()).collect();
    if scores.is_empty() {
        return None;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some((mean * 10.0).round() / 10.0)
}

/// Length of the run of consecutive journaled days ending at `reference`
///
/// A day without an entry yet does not break the streak until it is
/// over, so the run may also end on the day before `reference`.
pub fn current_streak(entries: &[Entry], reference: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = entries.iter().map(|e| e.date).collect();

    let mut day = if days.contains(&reference) {
        reference
    } else {
        match reference.pred_opt() {
            Some(prev) if days.contains(&prev) => prev,
            _ => return 0,
        }
    };

    let mut streak = 0u32;
    loop {
        if days.contains(&day) {
            streak += 1;
        } else {
            break;
        }
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}
