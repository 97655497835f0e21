//! Ordinary least-squares regression of a series against its index.
//!
//! Used to draw trendlines over consumption series. The fit is total:
//! empty, singleton, and degenerate inputs fall back to a flat line rather
//! than producing NaN or infinity.

use serde::{Deserialize, Serialize};

use super::rounding::{mean, round_half_up};

/// A fitted line `y = slope * x + intercept` over `x = 0..n-1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Value of the line at index `x`.
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Least-squares fit of `values` against their indices.
///
/// - `n < 2`: slope 0, intercept `values[0]` (or 0 when empty).
/// - zero denominator `n·Σx² − (Σx)²`: slope 0, intercept = mean.
pub fn linear_regression(values: &[f64]) -> LinearFit {
    let n = values.len();
    if n < 2 {
        return LinearFit {
            slope: 0.0,
            intercept: values.first().copied().unwrap_or(0.0),
        };
    }

    let nf = n as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;

    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = nf * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return LinearFit {
            slope: 0.0,
            intercept: mean(values).unwrap_or(0.0),
        };
    }

    let slope = (nf * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / nf;
    LinearFit { slope, intercept }
}

/// Evaluate a fit at `0..n-1`, rounded and clamped to `>= 0`.
pub fn trendline_from_fit(fit: &LinearFit, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| round_half_up(fit.at(i as f64)).max(0.0))
        .collect()
}

/// Trendline over `values`: one non-negative integer value per index.
pub fn generate_trendline(values: &[f64]) -> Vec<f64> {
    trendline_from_fit(&linear_regression(values), values.len())
}
