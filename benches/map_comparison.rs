use std::hash::Hash;
use std::collections::{BTreeMap, HashMap};

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};

use threaded_bst::ThreadedMap;

trait Map<K, V> {
    fn new() -> Self;

    fn len(&self) -> usize;

    fn get(&self, key: &K) -> Option<&V>;

    fn get_mut(&mut self, key: &K) -> Option<&mut V>;

    fn insert(&mut self, key: K, value: V) -> Option<V>;

    fn remove(&mut self, key: &K) -> Option<V>;

    /// Visits every entry in ascending order (or any order for unordered maps)
    fn scan(&self) -> usize;
}

macro_rules! impl_map {
    ($name:ident, $bound:ident $(+ $other_bound:ident)*) => {
        impl<K, V> Map<K, V> for $name<K, V>
            where K: $bound $(+ $other_bound)*,
        {
            fn new() -> Self {
                $name::new()
            }

            fn len(&self) -> usize {
                $name::len(self)
            }

            fn get(&self, key: &K) -> Option<&V> {
                $name::get(self, key)
            }

            fn get_mut(&mut self, key: &K) -> Option<&mut V> {
                $name::get_mut(self, key)
            }

            fn insert(&mut self, key: K, value: V) -> Option<V> {
                $name::insert(self, key, value)
            }

            fn remove(&mut self, key: &K) -> Option<V> {
                $name::remove(self, key)
            }

            fn scan(&self) -> usize {
                self.iter().map(|entry| black_box(entry)).count()
            }
        }
    };
}

impl_map!(HashMap, Hash + Eq);
impl_map!(BTreeMap, Ord);
impl_map!(ThreadedMap, Ord);

// Generates a key for the map
//
// Note that the keys returned are not guaranteed to be unique, but will be
// largely unique.
fn make_key(i: i64) -> i64 {
    // Make sure i >= 0
    let i = i.max(0);

    // Spread keys out so the unbalanced tree does not degrade into a list.

    // Since i >= 0, i % 3 = 0, 1, or 2
    // So 2/3 of numbers will be positive, 1/3 will be negative
    let sign = if i % 3 >= 1 { 1 } else { -1 };

    // Since i >= 0, i % 6 = 0, 1, 2, 3, 4, or 5
    let divisor = match i % 6 {
        0 | 1 => 1,
        2 | 4 => 3,
        3 | 5 => 6,
        _ => unreachable!(),
    };

    sign * (i + 1) * 4 / divisor
}

fn setup_map<M: Map<i64, usize>>(len: usize) -> M {
    let mut map = M::new();

    for key_i in 0..len {
        black_box(map.insert(make_key(key_i as i64), key_i));
    }

    map
}

/// Runs many consecutive get operations on a map
fn benchmark_gets<M: Map<i64, usize>>(map: &mut M, gets: usize) {
    for i in 0..gets {
        // Get keys in the opposite order to how they were inserted
        let key_i = gets - i - 1;
        let key = make_key(key_i as i64);
        black_box(map.get(&key));
        black_box(map.get_mut(&key));
    }
}

/// Alternates between mutating the map and scanning it in order
///
/// Every scan of a `ThreadedMap` after a mutation pays for a full thread rebuild.
fn benchmark_mutate_then_scan<M: Map<i64, usize>>(steps: usize) -> M {
    const MAX_INSERTS: usize = 5;
    const MAX_REMOVES: usize = 2;

    let mut map = M::new();

    let mut key_i = 0;
    for i in 0..steps {
        // Loop always runs at least once
        for j in 0..=(i % MAX_INSERTS) {
            let key = make_key(key_i);
            key_i += 1;
            black_box(map.insert(key, i + j));
        }

        let removes = MAX_REMOVES - (i % MAX_REMOVES);
        for j in 0..removes {
            let key = make_key(key_i - 2 * j as i64);
            black_box(map.remove(&key));
        }

        black_box(map.scan());
    }

    black_box(map.len());
    map
}

pub fn bench_inserts(c: &mut Criterion) {
    const INSERTS: &[usize] = &[50, 100, 500, 1000, 2000];

    let mut group = c.benchmark_group("insert");
    for inserts in INSERTS {
        group.bench_with_input(BenchmarkId::new("HashMap", inserts), inserts, |b, &inserts| {
            b.iter(|| setup_map::<HashMap<i64, usize>>(inserts))
        });
        group.bench_with_input(BenchmarkId::new("BTreeMap", inserts), inserts, |b, &inserts| {
            b.iter(|| setup_map::<BTreeMap<i64, usize>>(inserts))
        });
        group.bench_with_input(BenchmarkId::new("ThreadedMap", inserts), inserts, |b, &inserts| {
            b.iter(|| setup_map::<ThreadedMap<i64, usize>>(inserts))
        });
    }
    group.finish();
}

pub fn bench_gets(c: &mut Criterion) {
    const GETS: &[usize] = &[50, 100, 500, 1000, 2000];

    let mut group = c.benchmark_group("get");
    for gets in GETS {
        group.bench_with_input(BenchmarkId::new("HashMap", gets), gets, |b, &gets| {
            let mut map = setup_map(gets);
            b.iter(|| benchmark_gets::<HashMap<i64, usize>>(&mut map, gets))
        });
        group.bench_with_input(BenchmarkId::new("BTreeMap", gets), gets, |b, &gets| {
            let mut map = setup_map(gets);
            b.iter(|| benchmark_gets::<BTreeMap<i64, usize>>(&mut map, gets))
        });
        group.bench_with_input(BenchmarkId::new("ThreadedMap", gets), gets, |b, &gets| {
            let mut map = setup_map(gets);
            b.iter(|| benchmark_gets::<ThreadedMap<i64, usize>>(&mut map, gets))
        });
    }
    group.finish();
}

pub fn bench_scans(c: &mut Criterion) {
    const LENS: &[usize] = &[100, 1000, 10000];

    let mut group = c.benchmark_group("scan");
    for len in LENS {
        group.bench_with_input(BenchmarkId::new("BTreeMap", len), len, |b, &len| {
            let map: BTreeMap<i64, usize> = setup_map(len);
            b.iter(|| map.scan())
        });
        group.bench_with_input(BenchmarkId::new("ThreadedMap", len), len, |b, &len| {
            let map: ThreadedMap<i64, usize> = setup_map(len);
            b.iter(|| map.scan())
        });
    }
    group.finish();
}

pub fn bench_mutate_then_scan(c: &mut Criterion) {
    const STEPS: &[usize] = &[50, 100, 500, 1000];

    let mut group = c.benchmark_group("mutate then scan");
    for steps in STEPS {
        group.bench_with_input(BenchmarkId::new("BTreeMap", steps), steps, |b, &steps| {
            b.iter(|| benchmark_mutate_then_scan::<BTreeMap<i64, usize>>(steps))
        });
        group.bench_with_input(BenchmarkId::new("ThreadedMap", steps), steps, |b, &steps| {
            b.iter(|| benchmark_mutate_then_scan::<ThreadedMap<i64, usize>>(steps))
        });
    }
    group.finish();
}

criterion_group!(benches,
    bench_inserts,
    bench_gets,
    bench_scans,
    bench_mutate_then_scan,
);

criterion_main!(benches);
