use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use busynow::{
    core::ledger::ReportLedger,
    report::ReportDraft,
    types::{BusynessLevel, VoteDirection},
};

const T0: u64 = 1_700_000_000_000;

fn draft(place: u64) -> ReportDraft {
    ReportDraft::new(format!("{}", place % 100), BusynessLevel::Moderate).with_wait(5)
}

fn bench_submits(c: &mut Criterion) {
    c.bench_function("ledger_submit_50k", |b| {
        b.iter(|| {
            let mut ledger = ReportLedger::new();
            for i in 0..50_000u64 {
                let _ = ledger.submit_at(draft(i), T0 + i);
            }
        });
    });
}

fn bench_vote_toggles(c: &mut Criterion) {
    c.bench_function("ledger_toggle_10k", |b| {
        b.iter(|| {
            let mut ledger = ReportLedger::new();
            for i in 0..10_000u64 {
                let _ = ledger.submit_at(draft(i), T0 + i);
            }
            for i in 0..10_000u64 {
                let direction = if i % 3 == 0 { VoteDirection::Down } else { VoteDirection::Up };
                let _ = ledger
                    .toggle_vote(&format!("{}", i % 100), i + 1, direction)
                    .expect("toggle");
            }
        });
    });
}

fn bench_window_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_query");

    for per_place in [10u64, 100, 1000] {
        let mut ledger = ReportLedger::new();
        for i in 0..per_place {
            let _ = ledger.submit_at(ReportDraft::new("1", BusynessLevel::Busy), T0 + i * 10_000);
        }
        let now = T0 + per_place * 10_000;

        group.bench_with_input(BenchmarkId::from_parameter(per_place), &per_place, |b, _| {
            b.iter(|| {
                let _ = ledger.reports_for_place("1", now);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_submits, bench_vote_toggles, bench_window_query);
criterion_main!(benches);
