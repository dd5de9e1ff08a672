//! Load a text dump and predict a few rows.
//!
//! Run with:
//! ```bash
//! cargo run --example predict_dump
//! ```

use boostdump::explainability::ImportanceType;
use boostdump::{FeatureVector, GBDTModel, ModelConfig};

const DUMP: &str = include_str!("../tests/test-cases/xgboost/dump/regression_diabetes.dump.txt");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("boostdump=debug").init();

    let config = ModelConfig::builder()
        .task("reg:squarederror")
        .feature_names(["age", "sex", "bmi", "bp"].map(String::from).to_vec())
        .build()?;
    let model = GBDTModel::from_dump(DUMP, &config)?;
    println!("{} trees over {} features", model.n_trees(), model.n_features());

    let dense = [0.038f32, 0.0507, 0.0617, 0.0219];
    println!("dense row    -> {:?}", model.predict(&dense)?);

    // bmi and bp unknown: both follow the recorded missing branch
    let mut sparse = FeatureVector::missing(4);
    sparse.set(0, 0.0453);
    println!("sparse row   -> {:?}", model.predict(&sparse)?);
    println!("leaves       -> {:?}", model.predict_leaf(&sparse)?);

    for (name, score) in model.feature_importance(ImportanceType::Split)?.to_named() {
        println!("{name:>4}: {score}");
    }
    Ok(())
}
