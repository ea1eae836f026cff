//! Per-partition summaries and the pairwise combine.

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};
use crate::table::NumericTable;

/// Mergeable aggregate over the rows of one or more partitions.
///
/// All four vectors have one entry per column. With `n == 0` the summary is
/// the identity of [`combine`]: `min = +∞`, `max = -∞`, `sum = sum_sq = 0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPartialSummary")]
pub struct PartialSummary {
    n: u64,
    min: Vec<f64>,
    max: Vec<f64>,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

/// Wire form of [`PartialSummary`], checked before it is accepted.
#[derive(Deserialize)]
struct RawPartialSummary {
    n: u64,
    min: Vec<f64>,
    max: Vec<f64>,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl TryFrom<RawPartialSummary> for PartialSummary {
    type Error = StatsError;

    fn try_from(raw: RawPartialSummary) -> StatsResult<Self> {
        let columns = raw.sum.len();
        if [raw.min.len(), raw.max.len(), raw.sum_sq.len()].iter().any(|&l| l != columns) {
            return Err(StatsError::invalid(format!(
                "summary vectors disagree: min {}, max {}, sum {}, sum_sq {}",
                raw.min.len(),
                raw.max.len(),
                columns,
                raw.sum_sq.len()
            )));
        }
        Ok(Self { n: raw.n, min: raw.min, max: raw.max, sum: raw.sum, sum_sq: raw.sum_sq })
    }
}

impl PartialSummary {
    /// The empty summary for `columns` columns.
    #[must_use]
    pub fn identity(columns: usize) -> Self {
        Self {
            n: 0,
            min: vec![f64::INFINITY; columns],
            max: vec![f64::NEG_INFINITY; columns],
            sum: vec![0.0; columns],
            sum_sq: vec![0.0; columns],
        }
    }

    #[must_use]
    pub fn n(&self) -> u64 {
        self.n
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.sum.len()
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.n == 0
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

    /// Fold one row in.
    ///
    /// # Errors
    /// [`StatsError::InvalidInput`] if the row length differs from
    /// [`columns`](Self::columns).
    pub fn add_row(&mut self, row: &[f64]) -> StatsResult<()> {
        if row.len() != self.columns() {
            return Err(StatsError::invalid(format!(
                "row #{} has {} values, expected {}",
                self.n,
                row.len(),
                self.columns()
            )));
        }
        for (c, &x) in row.iter().enumerate() {
            self.min[c] = self.min[c].min(x);
            self.max[c] = self.max[c].max(x);
            self.sum[c] += x;
            self.sum_sq[c] += x * x;
        }
        self.n += 1;
        Ok(())
    }

    /// Merge `other` into `self` in place.
    ///
    /// # Errors
    /// [`StatsError::ColumnMismatch`] if the column counts differ; `self` is
    /// left untouched.
    pub fn merge_into(&mut self, other: &PartialSummary) -> StatsResult<()> {
        if self.columns() != other.columns() {
            return Err(StatsError::ColumnMismatch { left: self.columns(), right: other.columns() });
        }
        self.n += other.n;
        for c in 0..self.columns() {
            self.min[c] = self.min[c].min(other.min[c]);
            self.max[c] = self.max[c].max(other.max[c]);
            self.sum[c] += other.sum[c];
            self.sum_sq[c] += other.sum_sq[c];
        }
        Ok(())
    }
}

/// Pairwise combiner: a new summary covering the rows of both inputs.
///
/// Commutative exactly and associative up to floating-point summation order.
///
/// # Errors
/// [`StatsError::ColumnMismatch`] if `a` and `b` have different column counts.
pub fn combine(a: &PartialSummary, b: &PartialSummary) -> StatsResult<PartialSummary> {
    let mut out = a.clone();
    out.merge_into(b)?;
    Ok(out)
}

/// Local reducer: turns one partition's rows into a [`PartialSummary`].
#[derive(Clone, Copy, Debug)]
pub struct LocalReducer {
    columns: usize,
    require_non_empty: bool,
}

impl LocalReducer {
    #[must_use]
    pub fn new(columns: usize) -> Self {
        Self { columns, require_non_empty: false }
    }

    /// Treat an empty partition as an error instead of yielding the identity.
    #[must_use]
    pub fn require_non_empty(mut self, yes: bool) -> Self {
        self.require_non_empty = yes;
        self
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Reduce a slice of rows.
    ///
    /// # Errors
    /// [`StatsError::InvalidInput`] on a row of the wrong length, or on empty
    /// input when [`require_non_empty`](Self::require_non_empty) is set.
    pub fn reduce<R: AsRef<[f64]>>(&self, rows: &[R]) -> StatsResult<PartialSummary> {
        if rows.is_empty() && self.require_non_empty {
            return Err(StatsError::invalid("partition has no rows"));
        }
        let mut acc = PartialSummary::identity(self.columns);
        for row in rows {
            acc.add_row(row.as_ref())?;
        }
        Ok(acc)
    }

    /// Reduce a whole table.
    ///
    /// # Errors
    /// [`StatsError::InvalidInput`] if the table width differs from the
    /// reducer's, or as for [`reduce`](Self::reduce).
    pub fn reduce_table(&self, table: &NumericTable) -> StatsResult<PartialSummary> {
        if table.is_empty() {
            // An empty block carries no usable width, e.g. a blank CSV file.
            if self.require_non_empty {
                return Err(StatsError::invalid("partition has no rows"));
            }
            return Ok(PartialSummary::identity(self.columns));
        }
        if table.num_columns() != self.columns {
            return Err(StatsError::invalid(format!(
                "partition has {} columns, expected {}",
                table.num_columns(),
                self.columns
            )));
        }
        let mut acc = PartialSummary::identity(self.columns);
        for row in table.rows() {
            acc.add_row(row)?;
        }
        Ok(acc)
    }
}

/// Shorthand for `LocalReducer::new(columns).reduce(rows)`.
///
/// # Errors
/// As for [`LocalReducer::reduce`].
pub fn local_reduce<R: AsRef<[f64]>>(columns: usize, rows: &[R]) -> StatsResult<PartialSummary> {
    LocalReducer::new(columns).reduce(rows)
}
