//! View state
//!
//! The UI-local state of the journal screen (active tab, composer draft,
//! picked mood, selected calendar date) as an explicit struct with a pure
//! transition function. Transitions never touch stored data; saving is
//! requested by returning a `ViewCommand` for the caller to execute.

pub mod render;

use crate::storage::Mood;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The four panels of the journal screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Entries,
    Insights,
    Analytics,
    Calendar,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Entries, Tab::Insights, Tab::Analytics, Tab::Calendar]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Entries => "Записи",
            Tab::Insights => "Инсайты",
            Tab::Analytics => "Аналитика",
            Tab::Calendar => "Календарь",
        }
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entries" | "записи" => Ok(Tab::Entries),
            "insights" | "инсайты" => Ok(Tab::Insights),
            "analytics" | "аналитика" => Ok(Tab::Analytics),
            "calendar" | "календарь" => Ok(Tab::Calendar),
            other => Err(format!(
                "unknown tab '{}' (expected entries, insights, analytics or calendar)",
                other
            )),
        }
    }
}

/// User interactions
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    SelectTab(Tab),
    EditDraft(String),
    SelectMood(Mood),
    SelectDate(NaiveDate),
    ClearDate,
    Submit,
    EntrySaved,
    SaveFailed(String),
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    SubmitEntry {
        content: String,
        mood: Mood,
        date: NaiveDate,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub tab: Tab,
    /// Composer text; kept across tab switches
    pub draft: String,
    pub mood: Option<Mood>,
    /// Calendar selection; also the date a new entry is written for
    pub selected_date: Option<NaiveDate>,
    /// Last validation or save message
    pub notice: Option<String>,
    /// A submit is in flight
    pub saving: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Date a submitted entry is written for
    pub fn entry_date(&self, today: NaiveDate) -> NaiveDate {
        self.selected_date.unwrap_or(today)
    }

    /// Apply one event; `today` resolves the default entry date
    pub fn update(&mut self, event: ViewEvent, today: NaiveDate) -> Option<ViewCommand> {
        match event {
            ViewEvent::SelectTab(tab) => {
                self.tab = tab;
                None
            }
            ViewEvent::EditDraft(text) => {
                self.draft = text;
                self.notice = None;
                None
            }
            ViewEvent::SelectMood(mood) => {
                self.mood = Some(mood);
                self.notice = None;
                None
            }
            ViewEvent::SelectDate(date) => {
                self.selected_date = Some(date);
                None
            }
            ViewEvent::ClearDate => {
                self.selected_date = None;
                None
            }
            ViewEvent::Submit => {
                if self.saving {
                    return None;
                }
                if self.draft.trim().is_empty() {
                    self.notice = Some("Напишите пару слов о своём дне".to_string());
                    return None;
                }
                let Some(mood) = self.mood else {
                    self.notice = Some("Выберите настроение".to_string());
                    return None;
                };
                self.saving = true;
                self.notice = None;
                Some(ViewCommand::SubmitEntry {
                    content: self.draft.trim().to_string(),
                    mood,
                    date: self.entry_date(today),
                })
            }
            ViewEvent::EntrySaved => {
                self.saving = false;
                self.draft.clear();
                self.mood = None;
                self.notice = Some("Запись сохранена".to_string());
                None
            }
            ViewEvent::SaveFailed(message) => {
                self.saving = false;
                self.notice = Some(message);
                None
            }
        }
    }
}
