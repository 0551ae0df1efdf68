//! Text rendering
//!
//! Plain-text versions of the four panels, for the terminal.

use crate::analytics::AnalyticsSummary;
use crate::insights::Insight;
use crate::storage::{Entry, Mood};
use crate::view::{Tab, ViewState};
use chrono::{Datelike, NaiveDate};

pub const PLACEHOLDER_NO_ENTRIES: &str = "Нет записей на эту дату";

const COMPOSER_HINT: &str = "Как прошёл ваш день? Что вы чувствуете?..";

const BAR_WIDTH: usize = 20;

/// Genitive month names, as used in full dates
const MONTHS: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня", "июля", "августа", "сентября",
    "октября", "ноября", "декабря",
];

/// `20 ноября 2024 г.`
pub fn format_date(date: NaiveDate) -> String {
    format!("{} {} {} г.", date.day(), MONTHS[date.month0() as usize], date.year())
}

/// `[████████░░░░░░░░░░░░] 40%`
pub fn mood_bar(percent: u8, width: usize) -> String {
    let percent = usize::from(percent.min(100));
    let filled = (percent * width + 50) / 100;
    format!(
        "[{}{}] {}%",
        "█".repeat(filled),
        "░".repeat(width - filled),
        percent
    )
}

pub fn render_header(active: Tab) -> String {
    let tabs = Tab::all()
        .iter()
        .map(|t| {
            if *t == active {
                format!("[{}]", t.label())
            } else {
                t.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ");

    format!("Мой Дневник\nAI-анализ вашей жизни\n\n{}\n", tabs)
}

fn render_entry(entry: &Entry) -> String {
    format!(
        "{}  {}\n{}\n",
        format_date(entry.date),
        entry.mood.emoji(),
        entry.content
    )
}

/// Composer plus the entry list
pub fn render_entries(state: &ViewState, entries: &[Entry]) -> String {
    let mut out = String::from("Новая запись\n");

    if state.draft.is_empty() {
        out.push_str(&format!("  {}\n", COMPOSER_HINT));
    } else {
        out.push_str(&format!("  {}\n", state.draft));
    }

    let moods = Mood::all()
        .iter()
        .map(|m| {
            if state.mood == Some(*m) {
                format!("[{}]", m.emoji())
            } else {
                m.emoji().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&format!("  {}   Сохранить\n", moods));

    if let Some(notice) = &state.notice {
        out.push_str(&format!("  ! {}\n", notice));
    }

    for entry in entries {
        out.push('\n');
        out.push_str(&render_entry(entry));
    }
    out
}

pub fn render_insights(insights: &[Insight]) -> String {
    insights
        .iter()
        .map(|insight| {
            let mut card = format!("✨ {}\n{}\n", insight.period, insight.summary);
            if !insight.key_themes.is_empty() {
                card.push_str(&format!("Ключевые темы: {}\n", insight.key_themes.join(", ")));
            }
            card.push_str(&format!("↗ {}\n", insight.mood_trend));
            card
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_analytics(summary: &AnalyticsSummary) -> String {
    let mut out = format!("Динамика настроения ({})\n", summary.period.label());

    for share in &summary.breakdown.shares {
        out.push_str(&format!(
            "{} {:<12}{}\n",
            share.mood.emoji(),
            share.mood.label(),
            mood_bar(share.percent, BAR_WIDTH)
        ));
    }

    let average = summary
        .average_score
        .map(|s| format!("{:.1}", s))
        .unwrap_or_else(|| "-".to_string());

    out.push_str(&format!(
        "\n{}  Записей в этом месяце\n{}  Дней подряд\n{}  Средний уровень счастья\n",
        summary.entries_this_month, summary.streak_days, average
    ));
    out
}

/// Selected day with its entries, newest first, or the placeholder
pub fn render_calendar(selected: NaiveDate, entries_on_day: &[Entry]) -> String {
    let mut out = format!("Ваши записи\n\n{}\n", format_date(selected));

    if entries_on_day.is_empty() {
        out.push_str(PLACEHOLDER_NO_ENTRIES);
        out.push('\n');
    } else {
        for entry in entries_on_day {
            out.push_str(&format!("{} {}\n", entry.mood.emoji(), entry.content));
        }
    }
    out
}
