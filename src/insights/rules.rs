//! Rule-based insights
//!
//! Deterministic local generator. The summary is assembled from the entry
//! count, the dominant mood and the average score; themes are the most
//! frequent meaningful words; the trend compares the first and second
//! half of the period.

use crate::analytics::{average_score, MoodBreakdown};
use crate::insights::{Insight, InsightError, InsightGenerator};
use crate::storage::{Entry, Mood};
use async_trait::async_trait;
use std::collections::HashMap;

/// Number of themes reported per insight
const MAX_THEMES: usize = 3;

/// Shortest word considered a theme
const MIN_THEME_CHARS: usize = 4;

/// Half-over-half score change that counts as a trend
const TREND_THRESHOLD: f64 = 0.5;

/// Frequent words that never make a theme
const STOPWORDS: &[&str] = &[
    "сегодня", "вчера", "завтра", "день", "дня", "дней", "этот", "этой", "этом", "этого",
    "были", "было", "была", "будет", "очень", "когда", "который", "которые", "чтобы", "после",
    "также", "только", "тоже", "немного", "целом", "прошёл", "прошел", "прошла", "прошло",
    "несколько", "всего", "свою", "своей", "меня", "себя", "если", "потому", "почему",
    "может", "нужно", "есть", "просто", "даже", "всех", "всем", "много", "теперь", "опять",
    "снова", "today", "that", "this", "with", "have", "from", "were", "about", "just",
    "they", "their", "there", "what", "when", "your", "been", "very", "some", "into",
    "than", "then", "really", "would", "could",
];

/// Local, always-available insight generator
#[derive(Debug, Clone, Default)]
pub struct RuleBasedGenerator;

impl RuleBasedGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core of `generate`
    pub fn build(&self, entries: &[Entry], period: &str) -> Insight {
        if entries.is_empty() {
            return Insight {
                period: period.to_string(),
                summary: "За этот период записей нет.".to_string(),
                key_themes: Vec::new(),
                mood_trend: "Нет данных".to_string(),
            };
        }

        let breakdown = MoodBreakdown::from_entries(entries);
        let themes = extract_themes(entries.iter().map(|e| e.content.as_str()), MAX_THEMES);

        Insight {
            period: period.to_string(),
            summary: summarize(entries, &breakdown, &themes, period),
            key_themes: themes,
            mood_trend: trend_label(entries, &breakdown),
        }
    }
}

#[async_trait]
impl InsightGenerator for RuleBasedGenerator {
    async fn generate(&self, entries: &[Entry], period: &str) -> Result<Insight, InsightError> {
        Ok(self.build(entries, period))
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}

fn summarize(entries: &[Entry], breakdown: &MoodBreakdown, themes: &[String], period: &str) -> String {
    let mut parts = vec![format!("{}: {} {}.", period, entries.len(), entries_word(entries.len()))];

    if let Some(dominant) = breakdown.dominant {
        parts.push(format!(
            "Преобладает {} настроение ({}%).",
            dominant.label().to_lowercase(),
            breakdown.percent(dominant)
        ));
    }

    if let Some(avg) = average_score(entries) {
        let tone = if avg >= 8.0 {
            "Преобладают позитивные эмоции."
        } else if avg >= 6.0 {
            "В целом период проходит хорошо."
        } else if avg >= 4.0 {
            "Настроение ровное, без резких перепадов."
        } else {
            "Период был непростым, стоит уделить внимание отдыху."
        };
        parts.push(tone.to_string());
    }

    if !themes.is_empty() {
        let joined = themes
            .iter()
            .map(|t| t.to_lowercase())
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("Чаще всего вы писали о: {}.", joined));
    }

    parts.join(" ")
}

/// Trend from the chronological halves, else the dominant mood's label
fn trend_label(entries: &[Entry], breakdown: &MoodBreakdown) -> String {
    if entries.len() >= 4 {
        let mut ordered: Vec<&Entry> = entries.iter().collect();
        ordered.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

        let mid = ordered.len() / 2;
        let first = ordered[..mid].iter().map(|e| e.mood.score()).sum::<f64>() / mid as f64;
        let second = ordered[mid..].iter().map(|e| e.mood.score()).sum::<f64>()
            / (ordered.len() - mid) as f64;

        let delta = second - first;
        if delta > TREND_THRESHOLD {
            return "Позитивная динамика".to_string();
        }
        if delta < -TREND_THRESHOLD {
            return "Негативная динамика".to_string();
        }
    }

    match breakdown.dominant {
        Some(Mood::Great) => "Отличное настроение",
        Some(Mood::Good) => "Стабильно хорошее",
        Some(Mood::Okay) => "Ровное настроение",
        Some(Mood::Bad) => "Сниженное настроение",
        None => "Нет данных",
    }
    .to_string()
}

/// Russian plural of "запись" for a count
fn entries_word(n: usize) -> &'static str {
    let (last, last_two) = (n % 10, n % 100);
    if last == 1 && last_two != 11 {
        "запись"
    } else if (2..=4).contains(&last) && !(12..=14).contains(&last_two) {
        "записи"
    } else {
        "записей"
    }
}

/// Most frequent meaningful words across `texts`, capitalized
///
/// Words are compared lowercase; ties keep first-appearance order.
pub fn extract_themes<'a, I>(texts: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut position = 0usize;

    for text in texts {
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            if word.chars().count() < MIN_THEME_CHARS
                || word.chars().all(|c| c.is_numeric())
                || STOPWORDS.contains(&word.as_str())
            {
                continue;
            }
            let slot = counts.entry(word).or_insert((0, position));
            slot.0 += 1;
            position += 1;
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(word, _, _)| capitalize(&word))
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
