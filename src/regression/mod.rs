//! Multiple linear regression by the normal-equations method.
//!
//! The same two-phase shape as [`moments`](crate::moments): each worker
//! accumulates `XᵀX` and `Xᵀy` for its block ([`NormEqPartial`]), partials
//! are summed pairwise, and the driver solves `XᵀX β = Xᵀy` once with a
//! Cholesky factorization.

mod model;
mod normal_eq;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use crate::collection::{CombineFn, from_vec};
use crate::config::RunnerConfig;
use crate::error::StatsError;
use crate::pipeline::Pipeline;
use crate::table::NumericTable;

pub use model::{LinearModel, solve};
pub use normal_eq::{NormEqPartial, combine_normal_eq};

/// One worker block: feature rows and the matching response rows.
pub type LabeledBlock = (NumericTable, NumericTable);

/// Engine adapter: [`NormEqPartial`] in, [`LinearModel`] out.
#[derive(Clone, Copy, Debug)]
pub struct NormalEquations {
    features: usize,
    responses: usize,
}

impl NormalEquations {
    #[must_use]
    pub fn new(features: usize, responses: usize) -> Self {
        Self { features, responses }
    }
}

impl CombineFn<NormEqPartial, NormEqPartial, LinearModel> for NormalEquations {
    fn create(&self) -> NormEqPartial {
        NormEqPartial::identity(self.features, self.responses)
    }

    fn add_input(&self, acc: &mut NormEqPartial, v: NormEqPartial) -> Result<()> {
        Ok(acc.merge_into(&v)?)
    }

    fn merge(&self, acc: &mut NormEqPartial, other: NormEqPartial) -> Result<()> {
        Ok(acc.merge_into(&other)?)
    }

    fn finish(&self, acc: NormEqPartial) -> Result<LinearModel> {
        Ok(solve(&acc)?)
    }
}

/// Train on blocks spread across workers.
///
/// Shapes come from the first block with rows; empty blocks contribute
/// nothing.
///
/// # Errors
/// [`StatsError::EmptyDataset`] if no block has rows,
/// [`StatsError::InvalidInput`] or [`StatsError::ColumnMismatch`] on
/// inconsistent blocks, [`StatsError::SingularSystem`] if the system cannot
/// be solved.
pub fn train_linear_regression(blocks: Vec<LabeledBlock>, config: &RunnerConfig) -> Result<LinearModel> {
    let Some((features, responses)) = blocks
        .iter()
        .find(|(x, _)| !x.is_empty())
        .map(|(x, y)| (x.num_columns(), y.num_columns()))
    else {
        return Err(StatsError::EmptyDataset.into());
    };
    debug!(blocks = blocks.len(), features, responses, "training linear regression");

    let p = Pipeline::default();
    let model = from_vec(&p, blocks)
        .try_map(move |(x, y): &LabeledBlock| {
            if x.is_empty() && y.is_empty() {
                return Ok(NormEqPartial::identity(features, responses));
            }
            Ok(NormEqPartial::from_tables(x, y)?)
        })
        .combine_globally(NormalEquations::new(features, responses), config.fanout)
        .collect_with(&config.runner())
        .context("normal equations")?
        .pop()
        .ok_or_else(|| anyhow!("combine produced no model"))?;

    info!(features, responses, "linear regression trained");
    Ok(model)
}
