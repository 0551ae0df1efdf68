//! Diary CLI
//!
//! Command-line interface for the journal:
//! - Write entries
//! - List and delete entries
//! - Show any of the four panels (entries, insights, analytics, calendar)
//! - Import/Export entries

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use diary::config::{generate_default_config, Config, LoggingConfig};
use diary::storage::{parse_day, DateRange, Entry, Mood, Period};
use diary::transfer::{self, ExportFormat};
use diary::view::render;
use diary::{logging, seed, Journal, Tab, ViewCommand, ViewEvent, ViewState};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "diary")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Personal journal with mood tracking")]
#[command(long_about = "Diary keeps one short entry per moment of your day, tagged with a mood.\nIt shows mood percentages, your writing streak and period insights.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/diary/config.toml, /etc/diary/config.toml, ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Log at the configured level instead of warnings only
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write an entry
    Write {
        /// Entry text
        #[arg(required = true)]
        content: Vec<String>,
        /// Mood: great, good, okay, bad (or 😊 🙂 😐 😔)
        #[arg(short, long)]
        mood: Option<Mood>,
        /// Day the entry is for (default: today)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// List entries, newest first
    List {
        /// First day, inclusive
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,
        /// Last day, inclusive
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,
        /// Only the last N days ending today (1 to 36500)
        #[arg(
            short,
            long,
            conflicts_with_all = ["start", "end"],
            value_parser = clap::value_parser!(u32).range(1..=36_500)
        )]
        last: Option<u32>,
    },

    /// Show a panel: entries, insights, analytics, calendar
    Show {
        /// Panel to show
        tab: Tab,
        /// Reference or selected day (default: today)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        /// Analytics period: day, week, month, all
        #[arg(short, long, default_value = "month")]
        period: Period,
    },

    /// Delete an entry by id
    Delete {
        id: String,
    },

    /// Load the three sample entries
    Seed {
        /// Load even if the journal already has entries
        #[arg(long)]
        force: bool,
    },

    /// Export every entry
    Export {
        /// json or csv
        #[arg(long = "as", default_value = "json")]
        export_format: ExportFormat,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import entries from CSV (date, mood, content columns)
    Import {
        /// Path to CSV file
        path: PathBuf,
        /// Parse and report without storing
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    match s.trim().to_lowercase().as_str() {
        "today" => Ok(today()),
        "yesterday" => today().pred_opt().ok_or_else(|| "date out of range".to_string()),
        _ => parse_day(s).ok_or_else(|| format!("invalid date '{}' (expected YYYY-MM-DD)", s)),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    let log_config = if cli.verbose {
        config.logging.clone()
    } else {
        LoggingConfig {
            level: "warn".to_string(),
            ..config.logging.clone()
        }
    };
    logging::init(&log_config).context("initializing logging")?;

    let journal = Journal::open(&config).context("opening journal")?;
    let json = cli.format.eq_ignore_ascii_case("json");

    match cli.command {
        Commands::Write {
            content,
            mood,
            date,
        } => {
            let today = today();
            let mut view = ViewState::new();
            view.update(ViewEvent::EditDraft(content.join(" ")), today);
            if let Some(mood) = mood {
                view.update(ViewEvent::SelectMood(mood), today);
            }
            if let Some(date) = date {
                view.update(ViewEvent::SelectDate(date), today);
            }

            let Some(ViewCommand::SubmitEntry {
                content,
                mood,
                date,
            }) = view.update(ViewEvent::Submit, today)
            else {
                eprintln!("{}", view.notice.as_deref().unwrap_or("Nothing to save"));
                std::process::exit(1);
            };

            match journal.submit_entry(&content, mood, date) {
                Ok(entry) => {
                    view.update(ViewEvent::EntrySaved, today);
                    if json {
                        print_json(&entry)?;
                    } else {
                        println!(
                            "{} {} ({})",
                            view.notice.as_deref().unwrap_or_default(),
                            entry.mood.emoji(),
                            render::format_date(entry.date)
                        );
                        println!("id: {}", entry.id);
                    }
                }
                Err(e) => {
                    view.update(ViewEvent::SaveFailed(e.to_string()), today);
                    eprintln!("{}", view.notice.as_deref().unwrap_or_default());
                    std::process::exit(1);
                }
            }
        }

        Commands::List { start, end, last } => {
            let range = match (last, start, end) {
                (Some(days), _, _) => Some(DateRange::last_days(today(), days)),
                (None, None, None) => None,
                (None, start, end) => {
                    let open = DateRange::supported();
                    let start = start.unwrap_or(open.start);
                    let end = end.unwrap_or(open.end);
                    match DateRange::try_new(start, end) {
                        Some(range) => Some(range),
                        None => {
                            eprintln!("--start must not be after --end");
                            std::process::exit(1);
                        }
                    }
                }
            };

            let entries = journal.entries(range)?;
            if json {
                print_json(&entries)?;
            } else {
                print_entry_table(&entries);
            }
        }

        Commands::Show { tab, date, period } => {
            let today = today();
            let reference = date.unwrap_or(today);

            let mut view = ViewState::new();
            view.update(ViewEvent::SelectTab(tab), today);
            if let Some(date) = date {
                view.update(ViewEvent::SelectDate(date), today);
            }

            if !json {
                println!("{}", render::render_header(view.tab));
            }

            match view.tab {
                Tab::Entries => {
                    let entries = journal.entries(None)?;
                    if json {
                        print_json(&entries)?;
                    } else {
                        print!("{}", render::render_entries(&view, &entries));
                    }
                }
                Tab::Insights => {
                    let insights = journal.insights(reference).await?;
                    if json {
                        print_json(&insights)?;
                    } else {
                        print!("{}", render::render_insights(&insights));
                    }
                }
                Tab::Analytics => {
                    let summary = journal.analytics(period, reference)?;
                    if json {
                        print_json(&summary)?;
                    } else {
                        print!("{}", render::render_analytics(&summary));
                    }
                }
                Tab::Calendar => {
                    let selected = view.entry_date(today);
                    let entries = journal.entries_on(selected)?;
                    if json {
                        print_json(&entries)?;
                    } else {
                        print!("{}", render::render_calendar(selected, &entries));
                    }
                }
            }
        }

        Commands::Delete { id } => match journal.delete_entry(&id) {
            Ok(()) => println!("Deleted {}", id),
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },

        Commands::Seed { force } => {
            let existing = journal.count()?;
            if existing > 0 && !force {
                println!(
                    "Journal already has {} entries; use --force to add the samples anyway.",
                    existing
                );
                return Ok(());
            }
            let stored = seed::load(&journal)?;
            println!("Added {} sample entries.", stored.len());
        }

        Commands::Export {
            export_format,
            output,
        } => {
            let entries = journal.entries(None)?;
            let body = transfer::export(&entries, export_format)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, body)
                        .with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("Exported {} entries to {}", entries.len(), path.display());
                }
                None => print!("{}", body),
            }
        }

        Commands::Import { path, dry_run } => {
            if !path.exists() {
                eprintln!("File not found: {}", path.display());
                std::process::exit(1);
            }

            let (stored, failed, errors) = if dry_run {
                let file = std::fs::File::open(&path)?;
                let parsed = transfer::read_csv(file)?;
                (parsed.entries.len(), parsed.rows_failed, parsed.errors)
            } else {
                let report = transfer::import_csv_path(&journal, &path)?;
                (report.imported, report.rows_failed, report.errors)
            };

            if dry_run {
                println!("Dry run: {} valid rows, {} failed", stored, failed);
            } else {
                println!("Imported {} entries, {} failed", stored, failed);
            }
            for error in errors.iter().take(10) {
                eprintln!("  {}", error);
            }
            if errors.len() > 10 {
                eprintln!("  ... {} more", errors.len() - 10);
            }
        }

        Commands::Config { .. } => unreachable!("handled before the journal is opened"),
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_entry_table(entries: &[Entry]) {
    if entries.is_empty() {
        println!("No entries yet.");
        println!();
        println!("Write your first one with:");
        println!("  diary write \"Сегодня был хороший день\" --mood good");
        return;
    }

    println!("{:<12} {:<4} {:<36} {}", "Date", "Mood", "ID", "Content");
    println!("{}", "-".repeat(90));
    for entry in entries {
        println!(
            "{:<12} {:<4} {:<36} {}",
            entry.date.to_string(),
            entry.mood.emoji(),
            entry.id,
            preview(&entry.content, 40)
        );
    }
}

fn preview(content: &str, max_chars: usize) -> String {
    let first_line = content.lines().next().unwrap_or_default();
    if first_line.chars().count() > max_chars {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{}…", cut)
    } else {
        first_line.to_string()
    }
}
