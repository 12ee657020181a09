//! Symmetric rating updates for two-party outcomes.

use crate::types::Winner;

/// Rating deltas for one decided match.
///
/// Expected score for red is `1 / (1 + 10^((blue - red) / 400))`; each delta
/// is `k * (actual - expected)`. Both deltas are computed from the pre-update
/// snapshot of the two ratings, and the pair sums to exactly zero.
pub fn deltas(red: f64, blue: f64, winner: Winner, k: f64) -> (f64, f64) {
    let expected_red = 1.0 / (1.0 + 10f64.powf((blue - red) / 400.0));
    let actual_red = match winner {
        Winner::Red => 1.0,
        Winner::Blue => 0.0,
    };
    let delta = k * (actual_red - expected_red);
    (delta, -delta)
}
