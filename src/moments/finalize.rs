//! Closed-form statistics from a fully combined summary.

use serde::{Deserialize, Serialize};

use super::partial::PartialSummary;
use crate::error::{StatsError, StatsResult};

/// Final per-column statistics.
///
/// `variance` is the population variance (divided by `n`). Small negative
/// values from cancellation are clamped to zero; NaN and infinities are not,
/// so a column whose `sum_sq` overflowed reports a NaN variance rather than a
/// false zero. `variation` is `stddev / mean`; for a zero mean it is `+∞`
/// when the column has spread and `0.0` when the column is constantly zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalSummary {
    n: u64,
    min: Vec<f64>,
    max: Vec<f64>,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
    sum_squares_centered: Vec<f64>,
    mean: Vec<f64>,
    second_order_raw_moment: Vec<f64>,
    variance: Vec<f64>,
    stddev: Vec<f64>,
    variation: Vec<f64>,
}

impl FinalSummary {
    #[must_use]
    pub fn n(&self) -> u64 {
        self.n
    }
    #[must_use]
    pub fn columns(&self) -> usize {
        self.mean.len()
    }
    #[must_use]
    pub fn min(&self) -> &[f64] {
        &self.min
    }
    #[must_use]
    pub fn max(&self) -> &[f64] {
        &self.max
    }
    #[must_use]
    pub fn sum(&self) -> &[f64] {
        &self.sum
    }
    #[must_use]
    pub fn sum_sq(&self) -> &[f64] {
        &self.sum_sq
    }
    /// `Σ (x - mean)²` per column.
    #[must_use]
    pub fn sum_squares_centered(&self) -> &[f64] {
        &self.sum_squares_centered
    }
    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }
    /// `sum_sq / n` per column.
    #[must_use]
    pub fn second_order_raw_moment(&self) -> &[f64] {
        &self.second_order_raw_moment
    }
    #[must_use]
    pub fn variance(&self) -> &[f64] {
        &self.variance
    }
    #[must_use]
    pub fn stddev(&self) -> &[f64] {
        &self.stddev
    }
    #[must_use]
    pub fn variation(&self) -> &[f64] {
        &self.variation
    }
}

fn variation(stddev: f64, mean: f64) -> f64 {
    if mean != 0.0 {
        stddev / mean
    } else if stddev > 0.0 {
        f64::INFINITY
    } else if stddev == 0.0 {
        0.0
    } else {
        stddev
    }
}

// Only negatives are clamped; `f64::max` would also turn NaN into 0.
fn clamp_negative(v: f64) -> f64 {
    if v < 0.0 { 0.0 } else { v }
}

/// Derive final statistics from a combined summary.
///
/// # Errors
/// [`StatsError::EmptyDataset`] when `n == 0`.
#[allow(clippy::cast_precision_loss)]
pub fn finalize(partial: &PartialSummary) -> StatsResult<FinalSummary> {
    if partial.n() == 0 {
        return Err(StatsError::EmptyDataset);
    }
    let n = partial.n() as f64;
    let cols = partial.columns();

    let mut out = FinalSummary {
        n: partial.n(),
        min: partial.min().to_vec(),
        max: partial.max().to_vec(),
        sum: partial.sum().to_vec(),
        sum_sq: partial.sum_sq().to_vec(),
        sum_squares_centered: Vec::with_capacity(cols),
        mean: Vec::with_capacity(cols),
        second_order_raw_moment: Vec::with_capacity(cols),
        variance: Vec::with_capacity(cols),
        stddev: Vec::with_capacity(cols),
        variation: Vec::with_capacity(cols),
    };

    for (&s, &sq) in partial.sum().iter().zip(partial.sum_sq()) {
        let mean = s / n;
        let raw = sq / n;
        // Cancellation can push these a few ulps below zero.
        let var = clamp_negative(raw - mean * mean);
        let sd = var.sqrt();
        out.sum_squares_centered.push(clamp_negative(sq - s * s / n));
        out.mean.push(mean);
        out.second_order_raw_moment.push(raw);
        out.variance.push(var);
        out.stddev.push(sd);
        out.variation.push(variation(sd, mean));
    }
    Ok(out)
}
