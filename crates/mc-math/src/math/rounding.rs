//! Rounding and averaging helpers shared by the engine stages.

/// Round to the nearest integer, with halves rounding toward +inf.
///
/// `f64::round` rounds halves away from zero, which differs for negative
/// halves (`-2.5` → `-3`). Chart values use the half-up convention
/// (`-2.5` → `-2`, `2.5` → `3`).
pub fn round_half_up(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    (x + 0.5).floor()
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
