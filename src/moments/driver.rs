//! Distributed drivers.
//!
//! [`compute_moments`] runs the two-stage plan over pre-partitioned blocks:
//! every block is reduced to a [`PartialSummary`](super::PartialSummary) on a
//! worker, the summaries are merged pairwise, and the driver finalizes the
//! single survivor. [`compute_table_moments`] does the same for one table,
//! letting the runner choose the split.

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use super::combiners::{LowOrderMoments, MergePartials};
use super::finalize::FinalSummary;
use super::partial::LocalReducer;
use crate::collection::{from_partitions, from_table};
use crate::config::RunnerConfig;
use crate::error::StatsError;
use crate::pipeline::Pipeline;
use crate::table::NumericTable;

fn single(mut out: Vec<FinalSummary>) -> Result<FinalSummary> {
    out.pop().ok_or_else(|| anyhow!("combine produced no summary"))
}

/// Low-order moments over partitions that already live on separate workers.
///
/// The column count comes from the first non-empty partition.
///
/// # Errors
/// [`StatsError::EmptyDataset`] if there are no partitions or all are empty,
/// [`StatsError::InvalidInput`] if a partition has a different width, or is
/// empty while [`RunnerConfig::require_non_empty`] is set.
pub fn compute_moments(partitions: Vec<NumericTable>, config: &RunnerConfig) -> Result<FinalSummary> {
    let Some(columns) = partitions.iter().find(|t| !t.is_empty()).map(NumericTable::num_columns)
    else {
        return Err(StatsError::EmptyDataset.into());
    };
    debug!(partitions = partitions.len(), columns, "computing moments");

    let p = Pipeline::default();
    let reducer = LocalReducer::new(columns).require_non_empty(config.require_non_empty);
    let summary = from_partitions(&p, partitions)
        .try_map(move |block: &NumericTable| Ok(reducer.reduce_table(block)?))
        .combine_globally(MergePartials::new(columns), config.fanout)
        .collect_with(&config.runner())
        .context("low-order moments")
        .and_then(single)?;

    info!(rows = summary.n(), columns, "moments finalized");
    Ok(summary)
}

/// Low-order moments of a single table, split by the runner.
///
/// # Errors
/// [`StatsError::EmptyDataset`] if the table has no rows.
pub fn compute_table_moments(table: &NumericTable, config: &RunnerConfig) -> Result<FinalSummary> {
    let p = Pipeline::default();
    from_table(&p, table)
        .combine_globally_lifted(LowOrderMoments::new(table.num_columns()), config.fanout)
        .collect_with(&config.runner())
        .context("low-order moments")
        .and_then(single)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_partitions_is_empty_dataset() {
        let err = compute_moments(Vec::new(), &RunnerConfig::default()).unwrap_err();
        assert_eq!(err.downcast_ref::<StatsError>(), Some(&StatsError::EmptyDataset));
    }

    #[test]
    fn all_empty_partitions_is_empty_dataset() {
        let parts = vec![NumericTable::new(2), NumericTable::new(2)];
        let err = compute_moments(parts, &RunnerConfig::sequential()).unwrap_err();
        assert_eq!(err.downcast_ref::<StatsError>(), Some(&StatsError::EmptyDataset));
    }

    #[test]
    fn ragged_partition_aborts() {
        let parts = vec![
            NumericTable::from_rows(&[[1.0, 2.0]]).unwrap(),
            NumericTable::from_rows(&[[1.0, 2.0, 3.0]]).unwrap(),
        ];
        let err = compute_moments(parts, &RunnerConfig::parallel(2)).unwrap_err();
        assert!(matches!(err.downcast_ref::<StatsError>(), Some(StatsError::InvalidInput(_))));
    }

    #[test]
    fn empty_partition_is_identity_unless_required() -> Result<()> {
        let parts = || vec![NumericTable::from_rows(&[[1.0], [3.0]]).unwrap(), NumericTable::new(1)];

        let stats = compute_moments(parts(), &RunnerConfig::parallel(2))?;
        assert_eq!(stats.n(), 2);
        assert_eq!(stats.mean(), &[2.0]);

        let strict = RunnerConfig::parallel(2).with_require_non_empty(true);
        let err = compute_moments(parts(), &strict).unwrap_err();
        match err.downcast_ref::<StatsError>() {
            Some(StatsError::InvalidInput(msg)) => assert!(msg.contains("no rows"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn empty_table_is_empty_dataset() {
        let err = compute_table_moments(&NumericTable::new(3), &RunnerConfig::parallel(4)).unwrap_err();
        assert_eq!(err.downcast_ref::<StatsError>(), Some(&StatsError::EmptyDataset));
    }
}
