//! Solving the normal equations and applying the fitted model.

use serde::{Deserialize, Serialize};

use super::normal_eq::NormEqPartial;
use crate::error::{StatsError, StatsResult};
use crate::table::NumericTable;

/// Fitted linear model.
///
/// `beta` has one row per response and `features + 1` columns; column 0 is
/// the intercept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    beta: NumericTable,
}

impl LinearModel {
    /// Coefficients, one row per response, intercept first.
    #[must_use]
    pub fn beta(&self) -> &NumericTable {
        &self.beta
    }

    #[must_use]
    pub fn features(&self) -> usize {
        self.beta.num_columns().saturating_sub(1)
    }

    #[must_use]
    pub fn responses(&self) -> usize {
        self.beta.num_rows()
    }

    /// Predict responses for each row of `x`.
    ///
    /// # Errors
    /// [`StatsError::InvalidInput`] if `x` has the wrong number of features.
    pub fn predict(&self, x: &NumericTable) -> StatsResult<NumericTable> {
        if x.num_columns() != self.features() && !x.is_empty() {
            return Err(StatsError::invalid(format!(
                "model expects {} features, table has {}",
                self.features(),
                x.num_columns()
            )));
        }
        let mut out = NumericTable::new(self.responses());
        let mut row_out = vec![0.0; self.responses()];
        for row in x.rows() {
            for (k, b) in self.beta.rows().enumerate() {
                row_out[k] = b[0] + b[1..].iter().zip(row).map(|(bj, xj)| bj * xj).sum::<f64>();
            }
            out.push_row(&row_out)?;
        }
        Ok(out)
    }
}

/// In-place Cholesky factorization `A = L Lᵀ` of a row-major `p × p` matrix.
/// On success the lower triangle holds `L`.
#[allow(clippy::cast_precision_loss)]
fn cholesky(a: &mut [f64], p: usize) -> StatsResult<()> {
    let scale = (0..p).map(|i| a[i * p + i].abs()).fold(0.0, f64::max);
    let tol = scale * f64::EPSILON * p as f64;
    for j in 0..p {
        let mut d = a[j * p + j];
        for k in 0..j {
            d -= a[j * p + k] * a[j * p + k];
        }
        if d.is_nan() || d <= tol {
            return Err(StatsError::SingularSystem);
        }
        let d = d.sqrt();
        a[j * p + j] = d;
        for i in (j + 1)..p {
            let mut s = a[i * p + j];
            for k in 0..j {
                s -= a[i * p + k] * a[j * p + k];
            }
            a[i * p + j] = s / d;
        }
    }
    Ok(())
}

/// Solve `L Lᵀ x = b` given the factor from [`cholesky`].
fn cholesky_solve(l: &[f64], p: usize, b: &mut [f64]) {
    for i in 0..p {
        let mut s = b[i];
        for k in 0..i {
            s -= l[i * p + k] * b[k];
        }
        b[i] = s / l[i * p + i];
    }
    for i in (0..p).rev() {
        let mut s = b[i];
        for k in (i + 1)..p {
            s -= l[k * p + i] * b[k];
        }
        b[i] = s / l[i * p + i];
    }
}

/// Solve the accumulated normal equations for `β`.
///
/// # Errors
/// [`StatsError::EmptyDataset`] when no observations were accumulated,
/// [`StatsError::SingularSystem`] when `XᵀX` is not positive definite (for
/// example collinear features or fewer rows than coefficients).
pub fn solve(partial: &NormEqPartial) -> StatsResult<LinearModel> {
    if partial.n() == 0 {
        return Err(StatsError::EmptyDataset);
    }
    let p = partial.dim();
    let r = partial.responses();
    let mut l = partial.xtx();
    cholesky(&mut l, p)?;

    let mut beta = NumericTable::new(p);
    let mut col = vec![0.0; p];
    for k in 0..r {
        for (i, c) in col.iter_mut().enumerate() {
            *c = partial.xty()[i * r + k];
        }
        cholesky_solve(&l, p, &mut col);
        beta.push_row(&col)?;
    }
    Ok(LinearModel { beta })
}
