//! Fuzz target for the text dump parser.
//!
//! Arbitrary input must parse into a valid forest or fail with an error.
//! Parsed forests of moderate width are evaluated once to check that every
//! child reference resolves.
//!
//! Run with:
//! ```sh
//! cargo +nightly fuzz run fuzz_dump_parse
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

use boostdump::{parse_dump, FeatureMap};

/// Widest row the target evaluates. Any `f<N>` index is legal, so parsed
/// forests can require far more features than are worth allocating here.
const MAX_EVAL_FEATURES: usize = 1 << 16;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(forest) = parse_dump(text, &FeatureMap::default(), 1) else {
        return;
    };
    if forest.n_features_required() > MAX_EVAL_FEATURES {
        return;
    }
    let row = vec![None::<f32>; forest.n_features_required()];
    let _ = forest.predict_raw(row.as_slice());
});
