use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId, BatchSize};
use rand::prelude::*;

use threaded_bst::ThreadedMap;

fn shuffled_map(len: usize) -> ThreadedMap<u64, u64> {
    let mut keys: Vec<u64> = (0..len as u64).map(|key| key * 2).collect();
    keys.shuffle(&mut rand::thread_rng());

    keys.into_iter().map(|key| (key, key)).collect()
}

/// A single insert followed by `begin()` pays for rebuilding the threads of the whole tree
pub fn bench_rebuild_after_insert(c: &mut Criterion) {
    const LENS: &[usize] = &[100, 1000, 10000];

    let mut group = c.benchmark_group("rebuild after insert");
    for len in LENS {
        group.bench_with_input(BenchmarkId::new("random", len), len, |b, &len| {
            b.iter_batched(
                || {
                    let map = shuffled_map(len);
                    let _ = map.begin();
                    map
                },
                |mut map| {
                    // Odd keys are never present
                    map.insert(len as u64 + 1, 0);
                    black_box(map.begin().key_value().ok());
                    map
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

/// Stepping through an already threaded map never rebuilds
pub fn bench_cursor_walk(c: &mut Criterion) {
    const LENS: &[usize] = &[100, 1000, 10000];

    let mut group = c.benchmark_group("cursor walk");
    for len in LENS {
        group.bench_with_input(BenchmarkId::new("random", len), len, |b, &len| {
            let map = shuffled_map(len);
            b.iter(|| {
                let mut cursor = map.begin();
                let mut total = 0u64;
                while let Ok(value) = cursor.value() {
                    total = total.wrapping_add(*value);
                    cursor.move_next();
                }
                black_box(total)
            })
        });
    }
    group.finish();
}

criterion_group!(benches,
    bench_rebuild_after_insert,
    bench_cursor_walk,
);

criterion_main!(benches);
