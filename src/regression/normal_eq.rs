//! Cross-product accumulators for the normal equations.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};
use crate::table::NumericTable;

/// Partial `XᵀX` and `Xᵀy` over some rows.
///
/// The design matrix carries a leading intercept column of ones, so with `f`
/// features it has `p = f + 1` columns. `xtx` is `p × p` and `xty` is
/// `p × responses`, both row-major.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNormEqPartial")]
pub struct NormEqPartial {
    n: u64,
    features: usize,
    responses: usize,
    xtx: Vec<f64>,
    xty: Vec<f64>,
}

#[derive(Deserialize)]
struct RawNormEqPartial {
    n: u64,
    features: usize,
    responses: usize,
    xtx: Vec<f64>,
    xty: Vec<f64>,
}

impl TryFrom<RawNormEqPartial> for NormEqPartial {
    type Error = StatsError;

    fn try_from(raw: RawNormEqPartial) -> StatsResult<Self> {
        let p = raw.features.checked_add(1).ok_or_else(|| StatsError::invalid("feature count overflows"))?;
        let xtx_len = p.checked_mul(p);
        let xty_len = p.checked_mul(raw.responses);
        if xtx_len != Some(raw.xtx.len()) || xty_len != Some(raw.xty.len()) {
            return Err(StatsError::invalid(format!(
                "cross products for {} features and {} responses need {p}x{p} and {p}x{} entries, got {} and {}",
                raw.features,
                raw.responses,
                raw.responses,
                raw.xtx.len(),
                raw.xty.len()
            )));
        }
        Ok(Self { n: raw.n, features: raw.features, responses: raw.responses, xtx: raw.xtx, xty: raw.xty })
    }
}

impl NormEqPartial {
    /// Zero accumulator: the identity of [`merge_into`](Self::merge_into).
    #[must_use]
    pub fn identity(features: usize, responses: usize) -> Self {
        let p = features + 1;
        Self { n: 0, features, responses, xtx: vec![0.0; p * p], xty: vec![0.0; p * responses] }
    }

    /// Local step: accumulate one block of features `x` and responses `y`.
    ///
    /// # Errors
    /// [`StatsError::InvalidInput`] when `x` and `y` have different row counts.
    pub fn from_tables(x: &NumericTable, y: &NumericTable) -> StatsResult<Self> {
        if x.num_rows() != y.num_rows() {
            return Err(StatsError::invalid(format!(
                "{} feature rows but {} response rows",
                x.num_rows(),
                y.num_rows()
            )));
        }
        let mut acc = Self::identity(x.num_columns(), y.num_columns());
        for (xr, yr) in x.rows().zip(y.rows()) {
            acc.add_row(xr, yr)?;
        }
        Ok(acc)
    }

    /// Accumulate one observation.
    ///
    /// # Errors
    /// [`StatsError::InvalidInput`] on a feature or response row of the wrong width.
    pub fn add_row(&mut self, x: &[f64], y: &[f64]) -> StatsResult<()> {
        if x.len() != self.features || y.len() != self.responses {
            return Err(StatsError::invalid(format!(
                "observation #{} has {} features and {} responses, expected {} and {}",
                self.n,
                x.len(),
                y.len(),
                self.features,
                self.responses
            )));
        }
        let p = self.dim();
        let z = |i: usize| if i == 0 { 1.0 } else { x[i - 1] };
        for i in 0..p {
            let zi = z(i);
            // Only the upper triangle is accumulated; mirrored on solve.
            for j in i..p {
                self.xtx[i * p + j] += zi * z(j);
            }
            for (k, &yk) in y.iter().enumerate() {
                self.xty[i * self.responses + k] += zi * yk;
            }
        }
        self.n += 1;
        Ok(())
    }

    /// Add `other`'s sums into `self`.
    ///
    /// # Errors
    /// [`StatsError::ColumnMismatch`] if feature or response counts differ.
    pub fn merge_into(&mut self, other: &NormEqPartial) -> StatsResult<()> {
        if self.features != other.features {
            return Err(StatsError::ColumnMismatch { left: self.features, right: other.features });
        }
        if self.responses != other.responses {
            return Err(StatsError::ColumnMismatch { left: self.responses, right: other.responses });
        }
        self.n += other.n;
        for (a, b) in self.xtx.iter_mut().zip(&other.xtx) {
            *a += b;
        }
        for (a, b) in self.xty.iter_mut().zip(&other.xty) {
            *a += b;
        }
        Ok(())
    }

    #[must_use]
    pub fn n(&self) -> u64 {
        self.n
    }

    #[must_use]
    pub fn features(&self) -> usize {
        self.features
    }

    #[must_use]
    pub fn responses(&self) -> usize {
        self.responses
    }

    /// Side of the square `XᵀX`.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.features + 1
    }

    /// Full symmetric `XᵀX`, row-major.
    #[must_use]
    pub fn xtx(&self) -> Vec<f64> {
        let p = self.dim();
        let mut full = self.xtx.clone();
        for i in 0..p {
            for j in 0..i {
                full[i * p + j] = self.xtx[j * p + i];
            }
        }
        full
    }

    #[must_use]
    pub fn xty(&self) -> &[f64] {
        &self.xty
    }
}

/// Pairwise combiner for normal-equation partials.
///
/// # Errors
/// As for [`NormEqPartial::merge_into`].
pub fn combine_normal_eq(a: &NormEqPartial, b: &NormEqPartial) -> StatsResult<NormEqPartial> {
    let mut out = a.clone();
    out.merge_into(b)?;
    Ok(out)
}
