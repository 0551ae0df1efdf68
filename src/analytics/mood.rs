//! Mood aggregation
//!
//! Counts moods over a set of entries and converts the counts to whole
//! percentages with the largest-remainder method, so the bars always add
//! up to exactly 100.

use crate::storage::{Entry, Mood, Period};
use chrono::NaiveDate;
use serde::Serialize;

/// One bar of the mood chart
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MoodShare {
    pub mood: Mood,
    pub count: usize,
    pub percent: u8,
}

/// Per-mood counts and percentages for a set of entries
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MoodBreakdown {
    /// One share per mood, best mood first
    pub shares: Vec<MoodShare>,
    /// Number of entries aggregated
    pub total: usize,
    /// Most frequent mood; ties go to the better mood
    pub dominant: Option<Mood>,
}

impl MoodBreakdown {
    /// Aggregate every entry given
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        Self::from_moods(entries.into_iter().map(|e| e.mood))
    }

    /// Aggregate the entries that fall into `period` around `reference`
    pub fn for_period(entries: &[Entry], period: Period, reference: NaiveDate) -> Self {
        match period.range(reference) {
            Some(range) => Self::from_entries(entries.iter().filter(|e| range.contains(e.date))),
            None => Self::from_entries(entries),
        }
    }

    /// Aggregate a stream of mood values
    pub fn from_moods<I>(moods: I) -> Self
    where
        I: IntoIterator<Item = Mood>,
    {
        let order = Mood::all();
        let mut counts = [0usize; 4];
        for mood in moods {
            if let Some(idx) = order.iter().position(|m| *m == mood) {
                counts[idx] += 1;
            }
        }

        let total: usize = counts.iter().sum();
        let percents = largest_remainder(&counts, 100);

        let shares = order
            .iter()
            .enumerate()
            .map(|(i, mood)| MoodShare {
                mood: *mood,
                count: counts[i],
                percent: percents[i] as u8,
            })
            .collect();

        // `order` is best-first, so the first maximum wins ties
        let dominant = if total == 0 {
            None
        } else {
            let max = counts.iter().copied().max().unwrap_or(0);
            order
                .iter()
                .zip(counts.iter())
                .find(|(_, &c)| c == max)
                .map(|(m, _)| *m)
        };

        Self {
            shares,
            total,
            dominant,
        }
    }

    /// True when no entries were aggregated
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Percentage for one mood
    pub fn percent(&self, mood: Mood) -> u8 {
        self.shares
            .iter()
            .find(|s| s.mood == mood)
            .map(|s| s.percent)
            .unwrap_or(0)
    }

    /// Sum of all percentages: 100 when non-empty, 0 otherwise
    pub fn percent_total(&self) -> u32 {
        self.shares.iter().map(|s| u32::from(s.percent)).sum()
    }
}

/// Apportion `seats` proportionally to `counts`
///
/// Each bucket gets the floor of its exact share; the seats left over go
/// to the largest fractional remainders, earlier buckets first on ties.
/// All-zero counts yield all-zero seats.
fn largest_remainder(counts: &[usize], seats: usize) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    let mut result: Vec<usize> = counts.iter().map(|c| c * seats / total).collect();
    let assigned: usize = result.iter().sum();

    // remainder numerators share the denominator `total`, so compare as integers
    let mut remainders: Vec<(usize, usize)> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| (i, c * seats % total))
        .collect();
    remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    for (idx, _) in remainders.into_iter().take(seats - assigned) {
        result[idx] += 1;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moods(counts: &[(Mood, usize)]) -> Vec<Mood> {
        counts.iter()
            .flat_map(|(m, n)| std::iter::repeat(*m).take(*n))
            .collect()
    }

    #[test]
    fn test_exact_split() {
        let b = MoodBreakdown::from_moods(moods(&[
            (Mood::Great, 8),
            (Mood::Good, 7),
            (Mood::Okay, 4),
            (Mood::Bad, 1),
        ]));

        assert_eq!(b.percent(Mood::Great), 40);
        assert_eq!(b.percent(Mood::Good), 35);
        assert_eq!(b.percent(Mood::Okay), 20);
        assert_eq!(b.percent(Mood::Bad), 5);
        assert_eq!(b.dominant, Some(Mood::Great));
        assert_eq!(b.total, 20);
    }

    #[test]
    fn test_thirds_sum_to_hundred() {
        let b = MoodBreakdown::from_moods(vec![Mood::Great, Mood::Good, Mood::Okay]);
        assert_eq!(b.percent(Mood::Great), 34);
        assert_eq!(b.percent(Mood::Good), 33);
        assert_eq!(b.percent(Mood::Okay), 33);
        assert_eq!(b.percent(Mood::Bad), 0);
        assert_eq!(b.percent_total(), 100);
    }

    #[test]
    fn test_sum_is_always_hundred() {
        for great in 0..7 {
            for good in 0..7 {
                for okay in 0..4 {
                    for bad in 0..4 {
                        let b = MoodBreakdown::from_moods(moods(&[
                            (Mood::Great, great),
                            (Mood::Good, good),
                            (Mood::Okay, okay),
                            (Mood::Bad, bad),
                        ]));
                        let expected = if b.is_empty() { 0 } else { 100 };
                        assert_eq!(b.percent_total(), expected, "{:?}", b);
                    }
                }
            }
        }
    }

    #[test]
    fn test_empty_state() {
        let b = MoodBreakdown::from_moods(Vec::new());
        assert!(b.is_empty());
        assert_eq!(b.dominant, None);
        assert_eq!(b.shares.len(), 4);
        assert!(b.shares.iter().all(|s| s.percent == 0 && s.count == 0));
    }

    #[test]
    fn test_tie_goes_to_better_mood() {
        let b = MoodBreakdown::from_moods(vec![Mood::Bad, Mood::Good, Mood::Bad, Mood::Good]);
        assert_eq!(b.dominant, Some(Mood::Good));
    }

    #[test]
    fn test_largest_remainder_prefers_biggest_fraction() {
        // 1/6 = 16.67, 5/6 = 83.33 -> 17 / 83
        assert_eq!(largest_remainder(&[1, 5], 100), vec![17, 83]);
        assert_eq!(largest_remainder(&[0, 0], 100), vec![0, 0]);
    }
}
