use chrono::{Days, NaiveDate};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rust_decimal::Decimal;
use spendstat::{
    analyzer::analyze,
    session::analyze_windows,
    types::{Category, Cost, Record, RecordId},
    windows::WindowSet,
};
use std::hint::black_box;

const CATEGORIES: &[&str] = &["Clothes", "Food", "Gym", "Travel", "Utilities", "Books"];

fn create_test_records(count: usize) -> Vec<Record> {
    let base = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();

    (0..count)
        .map(|i| {
            let record = Record::new(
                RecordId::new(i),
                Category::new(CATEGORIES[i % CATEGORIES.len()]),
                Cost::new(Decimal::new((i as i64 % 500 + 1) * 137, 2)),
            );
            let start = base + Days::new((i % 365) as u64);
            match i % 10 {
                0 => record,
                1 => record.with_started(start),
                _ => record
                    .with_started(start)
                    .with_finished(start + Days::new((i % 45) as u64)),
            }
        })
        .collect()
}

fn benchmark_single_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_window");
    let window = WindowSet::monthly((2022, 6), (2022, 6))
        .unwrap()
        .into_inner()
        .remove(0);

    for size in [100, 1_000, 10_000] {
        let records = create_test_records(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| analyze(black_box(records), black_box(&window)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_monthly_windows(c: &mut Criterion) {
    let mut group = c.benchmark_group("monthly_windows");
    group.sample_size(20);
    let records = create_test_records(10_000);

    group.bench_function("sequential", |b| {
        b.iter(|| {
            let windows = WindowSet::monthly((2022, 1), (2022, 12)).unwrap();
            analyze_windows(black_box(&records), windows, false).unwrap()
        });
    });

    group.bench_function("parallel", |b| {
        b.iter(|| {
            let windows = WindowSet::monthly((2022, 1), (2022, 12)).unwrap();
            analyze_windows(black_box(&records), windows, true).unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_single_window, benchmark_monthly_windows);
criterion_main!(benches);
