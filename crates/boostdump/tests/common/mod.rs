//! Test case loading utilities for integration tests.
//!
//! Each case under `tests/test-cases/xgboost/dump/` is a set of files sharing
//! a name: `{name}.dump.txt`, `{name}.config.json`, `{name}.input.json` and
//! `{name}.expected.json`. For assertion helpers, use `boostdump::testing`.

#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use boostdump::ModelConfig;
use tracing_subscriber::EnvFilter;

#[allow(unused_imports)]
pub use boostdump::testing::{
    assert_batch_approx_eq, assert_slice_approx_eq, assert_slice_approx_eq_f64, DEFAULT_TOLERANCE,
    DEFAULT_TOLERANCE_F64,
};

// =============================================================================
// Test Case Loading
// =============================================================================

/// Route `tracing` output to the test harness. Set `RUST_LOG=debug` to see
/// parser events.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Directory for XGBoost text dump test cases.
pub fn dump_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/test-cases/xgboost/dump")
}

/// Load a JSON file and deserialize it.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> T {
    let file = File::open(path).unwrap_or_else(|e| panic!("Failed to open {}: {e}", path.display()));
    serde_json::from_reader(file).unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()))
}

// =============================================================================
// Common Test Data Structures
// =============================================================================

/// Input features for a test case.
#[derive(Debug, Deserialize)]
pub struct TestInput {
    /// Features matrix, where None represents a missing value
    pub features: Vec<Vec<Option<f64>>>,
    pub num_rows: usize,
    pub num_features: usize,
}

impl TestInput {
    /// Rows with explicit missing slots.
    pub fn to_optional_rows(&self) -> Vec<Vec<Option<f32>>> {
        self.features
            .iter()
            .map(|row| row.iter().map(|x| x.map(|v| v as f32)).collect())
            .collect()
    }

    /// Row-major matrix with NaN for missing values.
    pub fn to_matrix(&self) -> Array2<f32> {
        Array2::from_shape_fn((self.num_rows, self.num_features), |(r, c)| {
            self.features[r][c].map_or(f32::NAN, |v| v as f32)
        })
    }
}

/// Expected predictions for a test case.
#[derive(Debug, Deserialize)]
pub struct TestExpected {
    /// Raw scores, one row per input row and one column per output group
    pub predictions: Vec<Vec<f64>>,
    /// Scores after the task's transform
    pub predictions_transformed: Vec<Vec<f64>>,
    /// Dump id of the leaf reached in every tree
    pub leaves: Vec<Vec<u32>>,
    pub objective: String,
    pub num_class: usize,
}

/// A complete test case: dump text, load config, input and expected output.
pub struct TestCase {
    pub name: String,
    pub dump: String,
    pub config: ModelConfig,
    pub input: TestInput,
    pub expected: TestExpected,
}

pub fn load_case(name: &str) -> TestCase {
    init_tracing();
    let dir = dump_cases_dir();
    let dump_path = dir.join(format!("{name}.dump.txt"));
    let dump = fs::read_to_string(&dump_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", dump_path.display()));

    TestCase {
        name: name.to_string(),
        dump,
        config: load_json(&dir.join(format!("{name}.config.json"))),
        input: load_json(&dir.join(format!("{name}.input.json"))),
        expected: load_json(&dir.join(format!("{name}.expected.json"))),
    }
}
