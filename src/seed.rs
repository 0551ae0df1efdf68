//! Sample entries
//!
//! Three days of entries used by `diary seed`, demos and tests.

use crate::journal::{Journal, JournalResult};
use crate::storage::{Entry, Mood, NewEntry};
use chrono::{NaiveDate, TimeZone, Utc};

/// (date, hour of writing, mood, content)
const SAMPLES: &[((i32, u32, u32), u32, Mood, &str)] = &[
    (
        (2024, 11, 20),
        21,
        Mood::Great,
        "Сегодня был продуктивный день. Завершил несколько важных задач и чувствую удовлетворение от проделанной работы.",
    ),
    (
        (2024, 11, 19),
        20,
        Mood::Good,
        "Встреча с командой прошла отлично. Обсудили новые идеи для проекта.",
    ),
    (
        (2024, 11, 18),
        22,
        Mood::Okay,
        "Немного устал, но в целом день прошёл нормально.",
    ),
];

/// The sample entries, newest first
pub fn sample_entries() -> Vec<NewEntry> {
    SAMPLES
        .iter()
        .filter_map(|&((y, m, d), hour, mood, content)| {
            let date = NaiveDate::from_ymd_opt(y, m, d)?;
            let written = Utc.with_ymd_and_hms(y, m, d, hour, 0, 0).single()?;
            Some(NewEntry::new(date, content, mood).created_at(written))
        })
        .collect()
}

/// Store the sample entries in `journal`
pub fn load(journal: &Journal) -> JournalResult<Vec<Entry>> {
    let stored = sample_entries()
        .into_iter()
        .map(|new| journal.import_entry(new))
        .collect::<JournalResult<Vec<_>>>()?;

    tracing::info!(count = stored.len(), "Loaded sample entries");
    Ok(stored)
}
