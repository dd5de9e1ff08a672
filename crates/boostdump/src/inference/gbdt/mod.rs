//! Tree ensemble batch inference.

mod predictor;

pub use predictor::{Predictor, DEFAULT_BLOCK_SIZE};
