//! Builders for parameter value ranges.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};

use super::ParamError;

/// Linear range of doubles from `start` to `end`, both inclusive.
///
/// `num_steps` must be at least 2 since both endpoints are included;
/// `start` must not exceed `end`. Equal endpoints repeat the value
/// `num_steps` times.
pub fn linear(start: f64, end: f64, num_steps: usize) -> Result<Vec<Value>, ParamError> {
    if num_steps < 2 {
        return Err(ParamError::TooFewSteps(num_steps));
    }
    if start > end {
        return Err(ParamError::ReversedBounds { start, end });
    }
    if start == end {
        return Ok(repeated(start, num_steps));
    }

    let step = (end - start) / (num_steps - 1) as f64;
    Ok((0..num_steps)
        .map(|i| json!(start + i as f64 * step))
        .collect())
}

/// Range holding the same value `count` times.
pub fn repeated(value: f64, count: usize) -> Vec<Value> {
    vec![json!(value); count]
}

/// Random flat offset vectors within per-element bounds, for composite
/// spline descriptors.
///
/// The generator is seeded, so the same seed reproduces the same range.
pub fn offset_configs(
    seed: u64,
    count: usize,
    lower: &[f64],
    upper: &[f64],
) -> Result<Vec<Value>, ParamError> {
    if count == 0 {
        return Err(ParamError::EmptyRange);
    }
    if lower.len() != upper.len() {
        return Err(ParamError::BoundsMismatch {
            lower: lower.len(),
            upper: upper.len(),
        });
    }
    if let Some((&lo, &hi)) = lower.iter().zip(upper).find(|(lo, hi)| lo > hi) {
        return Err(ParamError::ReversedBounds { start: lo, end: hi });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Ok((0..count)
        .map(|_| {
            Value::Array(
                lower
                    .iter()
                    .zip(upper)
                    .map(|(&lo, &hi)| json!(rng.gen_range(lo..=hi)))
                    .collect(),
            )
        })
        .collect())
}
