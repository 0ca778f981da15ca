use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mbase_dag::resolve_ancestry;
use mbase_store::HistoryBuilder;
use mbase_types::RevisionId;

fn criss_cross(k: usize) -> (HistoryBuilder, [RevisionId; 2]) {
    let mut h = HistoryBuilder::with_namespace("bench");
    h.commit("R", &[]).unwrap();
    h.commit("A1", &["R"]).unwrap();
    h.commit("B1", &["R"]).unwrap();
    for i in 2..=k {
        let (a_prev, b_prev) = (format!("A{}", i - 1), format!("B{}", i - 1));
        h.commit(&format!("A{i}"), &[a_prev.as_str(), b_prev.as_str()]).unwrap();
        h.commit(&format!("B{i}"), &[b_prev.as_str(), a_prev.as_str()]).unwrap();
    }
    let leaves = [h.id(&format!("A{k}")), h.id(&format!("B{k}"))];
    (h, leaves)
}

/// A long history where each revision has one or two parents picked from
/// the recent past, with a few leaves at the tip.
fn wide_history(size: usize, seed: u64) -> (HistoryBuilder, Vec<RevisionId>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut h = HistoryBuilder::with_namespace("wide");
    h.commit("n0", &[]).unwrap();
    for i in 1..size {
        let window = i.min(32);
        let first = format!("n{}", i - rng.gen_range(1..=window));
        let label = format!("n{i}");
        if rng.gen_bool(0.2) {
            let second = format!("n{}", i - rng.gen_range(1..=window));
            h.commit(&label, &[first.as_str(), second.as_str()]).unwrap();
        } else {
            h.commit(&label, &[first.as_str()]).unwrap();
        }
    }
    let leaves = (size - 4..size).map(|i| h.id(&format!("n{i}"))).collect();
    (h, leaves)
}

fn bench_criss_cross(c: &mut Criterion) {
    let mut group = c.benchmark_group("criss_cross");
    for k in [4, 16, 64] {
        let (h, leaves) = criss_cross(k);
        group.bench_with_input(BenchmarkId::from_parameter(k), &leaves, |b, leaves| {
            b.iter(|| black_box(resolve_ancestry(h.store(), leaves, true).unwrap()));
        });
    }
    group.finish();
}

fn bench_wide_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_history");
    group.sample_size(20);
    for size in [1_000, 10_000] {
        let (h, leaves) = wide_history(size, 7);
        group.bench_with_input(BenchmarkId::from_parameter(size), &leaves, |b, leaves| {
            b.iter(|| black_box(resolve_ancestry(h.store(), leaves, true).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_criss_cross, bench_wide_history);
criterion_main!(benches);
