//! Engine adapters for the moments kernels.
//!
//! - [`LowOrderMoments`]: rows (`Vec<f64>`) in, [`FinalSummary`] out. Lifted,
//!   so each partition runs the local reducer over its whole slice.
//! - [`MergePartials`]: [`PartialSummary`] in, [`FinalSummary`] out, for
//!   plans whose map stage already produced per-block summaries.

use anyhow::Result;

use super::finalize::{FinalSummary, finalize};
use super::partial::{LocalReducer, PartialSummary};
use crate::collection::{CombineFn, LiftableCombiner};

#[derive(Clone, Copy, Debug)]
pub struct LowOrderMoments {
    columns: usize,
}

impl LowOrderMoments {
    #[must_use]
    pub fn new(columns: usize) -> Self {
        Self { columns }
    }
}

impl CombineFn<Vec<f64>, PartialSummary, FinalSummary> for LowOrderMoments {
    fn create(&self) -> PartialSummary {
        PartialSummary::identity(self.columns)
    }

    fn add_input(&self, acc: &mut PartialSummary, row: Vec<f64>) -> Result<()> {
        Ok(acc.add_row(&row)?)
    }

    fn merge(&self, acc: &mut PartialSummary, other: PartialSummary) -> Result<()> {
        Ok(acc.merge_into(&other)?)
    }

    fn finish(&self, acc: PartialSummary) -> Result<FinalSummary> {
        Ok(finalize(&acc)?)
    }
}

impl LiftableCombiner<Vec<f64>, PartialSummary, FinalSummary> for LowOrderMoments {
    fn build_from_group(&self, rows: &[Vec<f64>]) -> Result<PartialSummary> {
        Ok(LocalReducer::new(self.columns).reduce(rows)?)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MergePartials {
    columns: usize,
}

impl MergePartials {
    #[must_use]
    pub fn new(columns: usize) -> Self {
        Self { columns }
    }
}

impl CombineFn<PartialSummary, PartialSummary, FinalSummary> for MergePartials {
    fn create(&self) -> PartialSummary {
        PartialSummary::identity(self.columns)
    }

    fn add_input(&self, acc: &mut PartialSummary, v: PartialSummary) -> Result<()> {
        Ok(acc.merge_into(&v)?)
    }

    fn merge(&self, acc: &mut PartialSummary, other: PartialSummary) -> Result<()> {
        Ok(acc.merge_into(&other)?)
    }

    fn finish(&self, acc: PartialSummary) -> Result<FinalSummary> {
        Ok(finalize(&acc)?)
    }
}
