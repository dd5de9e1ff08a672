//! Prediction benchmarks: single rows, batch blocks and thread scaling.
//!
//! Run with: `cargo bench --bench predict`

use std::fmt::Write;
use std::time::Duration;

use boostdump::inference::Predictor;
use boostdump::{run_with_threads, GBDTModel, ModelConfig, Parallelism};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array2;

const N_FEATURES: usize = 32;
const N_TREES: usize = 100;
const DEPTH: u32 = 6;
const THREAD_COUNTS: &[usize] = &[1, 2, 4, 8];

// =============================================================================
// Synthetic Models
// =============================================================================

/// Deterministic value in `[-5, 5)`.
fn synthetic_value(a: usize, b: usize) -> f32 {
    ((a.wrapping_mul(7919) ^ b.wrapping_mul(104_729)) % 1000) as f32 / 100.0 - 5.0
}

/// Write a complete tree of depth `DEPTH` in dump form. Node `n` has children
/// `2n + 1` and `2n + 2`, matching XGBoost's breadth-first numbering.
fn write_tree(out: &mut String, tree: usize) {
    fn write_node(out: &mut String, tree: usize, node: usize, depth: u32) {
        let indent = "\t".repeat(depth as usize);
        if depth == DEPTH {
            let _ = writeln!(out, "{indent}{node}:leaf={}", synthetic_value(tree, node) / 10.0);
            return;
        }
        let (yes, no) = (2 * node + 1, 2 * node + 2);
        let feature = (tree * 31 + node) % N_FEATURES;
        let threshold = synthetic_value(node, tree);
        let missing = if node % 2 == 0 { yes } else { no };
        let _ = writeln!(
            out,
            "{indent}{node}:[f{feature}<{threshold}] yes={yes},no={no},missing={missing}"
        );
        write_node(out, tree, yes, depth + 1);
        write_node(out, tree, no, depth + 1);
    }

    let _ = writeln!(out, "booster[{tree}]:");
    write_node(out, tree, 0, 0);
}

fn synthetic_model(task: &str, num_classes: usize) -> GBDTModel {
    let mut dump = String::new();
    for tree in 0..N_TREES {
        write_tree(&mut dump, tree);
    }
    let config = ModelConfig::builder()
        .task(task)
        .num_classes(num_classes)
        .build()
        .expect("valid config");
    GBDTModel::from_dump(&dump, &config).expect("valid dump")
}

fn synthetic_features(n_rows: usize) -> Array2<f32> {
    Array2::from_shape_fn((n_rows, N_FEATURES), |(r, c)| {
        if (r + c) % 17 == 0 { f32::NAN } else { synthetic_value(r, c) }
    })
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_single_row(c: &mut Criterion) {
    let models = [
        ("regression", synthetic_model("reg:squarederror", 0)),
        ("binary", synthetic_model("binary:logistic", 0)),
        ("multiclass4", synthetic_model("multi:softprob", 4)),
    ];
    let row: Vec<f32> = (0..N_FEATURES).map(|c| synthetic_value(3, c)).collect();

    let mut group = c.benchmark_group("predict/single_row");
    for (name, model) in &models {
        group.bench_function(*name, |b| b.iter(|| black_box(model.predict(black_box(row.as_slice())))));
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let model = synthetic_model("binary:logistic", 0);
    let mut group = c.benchmark_group("predict/batch");

    for &n_rows in &[1_000usize, 10_000] {
        let features = synthetic_features(n_rows);
        group.throughput(Throughput::Elements(n_rows as u64));

        for &block_size in &[16usize, 64, 256] {
            let predictor = Predictor::new(model.forest())
                .with_transform(model.output_transform())
                .with_block_size(block_size);
            group.bench_with_input(
                BenchmarkId::new(format!("sequential/block{block_size}"), n_rows),
                &features,
                |b, features| b.iter(|| black_box(predictor.predict(features.view(), Parallelism::Sequential))),
            );
        }

        group.bench_with_input(BenchmarkId::new("parallel", n_rows), &features, |b, features| {
            b.iter(|| black_box(model.predict_batch(features.view(), Parallelism::Parallel)))
        });
    }
    group.finish();
}

fn bench_thread_scaling(c: &mut Criterion) {
    let model = synthetic_model("reg:squarederror", 0);
    let n_rows = 10_000usize;
    let features = synthetic_features(n_rows);

    let mut group = c.benchmark_group("predict/thread_scaling");
    group.throughput(Throughput::Elements(n_rows as u64));

    for &n_threads in THREAD_COUNTS {
        group.bench_with_input(BenchmarkId::new("parallel", n_threads), &features, |b, features| {
            b.iter(|| {
                run_with_threads(n_threads, |parallelism| {
                    black_box(model.predict_batch(features.view(), parallelism))
                })
            })
        });
    }
    group.finish();
}

fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .warm_up_time(Duration::from_secs(2))
        .measurement_time(Duration::from_secs(10))
        .sample_size(20)
}

criterion_group! {
    name = benches;
    config = default_criterion();
    targets = bench_single_row, bench_batch, bench_thread_scaling
}
criterion_main!(benches);
