//! Benchmarks for the packers.
//!
//! Run with: cargo bench -p flowgrid-layout

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use flowgrid_layout::{FillStrategy, PackItem, PackOptions, pack};
use std::hint::black_box;

/// Deterministic mix of small, wide, and tall items.
fn make_items(n: usize) -> Vec<PackItem> {
    (0..n)
        .map(|i| match i % 4 {
            0 => PackItem::new(100.0, 100.0),
            1 => PackItem::new(200.0, 100.0),
            2 => PackItem::new(100.0, 200.0),
            _ => PackItem::new(50.0, 50.0),
        })
        .collect()
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/pack");

    for n in [10, 100, 500] {
        let items = make_items(n);
        for strategy in [FillStrategy::RowFill, FillStrategy::FillGaps] {
            let opts = PackOptions::new(strategy).gutter(8.0, 8.0);
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), n),
                &items,
                |b, items| b.iter(|| black_box(pack(items, 1200.0, &opts))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
