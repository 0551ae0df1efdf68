//! Benchmarks for mood aggregation and the log repository
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use diary::analytics::{AnalyticsSummary, MoodBreakdown};
use diary::insights::RuleBasedGenerator;
use diary::storage::*;
use tempfile::tempdir;

const CONTENTS: [&str; 4] = [
    "Сегодня был продуктивный день. Завершил несколько важных задач.",
    "Встреча с командой прошла отлично. Обсудили новые идеи для проекта.",
    "Немного устал, но в целом день прошёл нормально.",
    "Тяжёлый день, много работы и мало сна.",
];

fn create_test_entries(count: usize) -> Vec<Entry> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..count)
        .map(|i| {
            let mood = Mood::all()[i % 4];
            let date = start + Duration::days((i / 2) as i64);
            Entry::from_new(NewEntry::new(date, CONTENTS[i % 4], mood))
        })
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");
    let reference = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

    for size in [100, 1000, 10000] {
        let entries = create_test_entries(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("breakdown_{}", size), |b| {
            b.iter(|| MoodBreakdown::from_entries(black_box(&entries)))
        });

        group.bench_function(format!("summary_month_{}", size), |b| {
            b.iter(|| AnalyticsSummary::compute(black_box(&entries), Period::Month, reference))
        });

        let generator = RuleBasedGenerator::new();
        group.bench_function(format!("rule_insight_{}", size), |b| {
            b.iter(|| generator.build(black_box(&entries), "Всё время"))
        });
    }

    group.finish();
}

fn bench_log(c: &mut Criterion) {
    let mut group = c.benchmark_group("log");
    let day = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();

    group.bench_function("append_single", |b| {
        let dir = tempdir().unwrap();
        // No fsync for benchmarking raw performance
        let repo = LogRepository::open(dir.path().join("bench.log"), LogSyncMode::OsBuffered).unwrap();

        b.iter(|| {
            repo.create(black_box(NewEntry::new(day, CONTENTS[0], Mood::Great)))
                .unwrap()
        });
    });

    group.bench_function("replay_1000", |b| {
        let dir = tempdir().unwrap();
        let path = dir.path().join("replay.log");
        {
            let repo = LogRepository::open(&path, LogSyncMode::OsBuffered).unwrap();
            for entry in create_test_entries(1000) {
                repo.create(NewEntry::new(entry.date, entry.content, entry.mood))
                    .unwrap();
            }
        }

        b.iter(|| LogRepository::open(black_box(&path), LogSyncMode::OsBuffered).unwrap());
    });

    group.finish();
}

fn bench_sqlite(c: &mut Criterion) {
    let mut group = c.benchmark_group("sqlite");

    let repo = SqliteRepository::open_in_memory().unwrap();
    for entry in create_test_entries(1000) {
        repo.create(NewEntry::new(entry.date, entry.content, entry.mood))
            .unwrap();
    }
    let range = DateRange::try_new(
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
    )
    .unwrap();

    group.bench_function("list_month_of_1000", |b| {
        b.iter(|| repo.list(black_box(Some(range))).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_aggregation, bench_log, bench_sqlite);
criterion_main!(benches);
