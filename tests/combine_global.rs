//! Moments through the execution engine: sequential, parallel, various fanouts.

use anyhow::Result;
use ironstats::moments::{
    FinalSummary, LocalReducer, LowOrderMoments, MergePartials, compute_moments, compute_table_moments, finalize,
    local_reduce,
};
use ironstats::testing::{DEFAULT_REL_TOL, assert_vec_close, fixtures};
use ironstats::*;

fn reference(table: &NumericTable) -> FinalSummary {
    finalize(&local_reduce(table.num_columns(), &table.to_rows()).unwrap()).unwrap()
}

fn assert_stats_close(got: &FinalSummary, want: &FinalSummary) {
    assert_eq!(got.n(), want.n());
    assert_eq!(got.min(), want.min());
    assert_eq!(got.max(), want.max());
    assert_vec_close(got.sum(), want.sum(), DEFAULT_REL_TOL);
    assert_vec_close(got.sum_sq(), want.sum_sq(), DEFAULT_REL_TOL);
    assert_vec_close(got.mean(), want.mean(), DEFAULT_REL_TOL);
    assert_vec_close(got.variance(), want.variance(), DEFAULT_REL_TOL);
    assert_vec_close(got.stddev(), want.stddev(), DEFAULT_REL_TOL);
    assert_vec_close(got.sum_squares_centered(), want.sum_squares_centered(), DEFAULT_REL_TOL);
}

#[test]
fn lifted_rows_match_reference_across_partitions_and_fanouts() -> Result<()> {
    let table = fixtures::wide_table(1_000, 3);
    let want = reference(&table);

    for partitions in [1usize, 2, 5, 32] {
        for fanout in [2usize, 3, 16] {
            let p = Pipeline::default();
            let got = from_table(&p, &table)
                .combine_globally_lifted(LowOrderMoments::new(3), Some(fanout))
                .collect_par(None, Some(partitions))?;
            assert_eq!(got.len(), 1);
            assert_stats_close(&got[0], &want);
        }
    }
    Ok(())
}

#[test]
fn unlifted_rows_match_sequential() -> Result<()> {
    let table = fixtures::wide_table(300, 2);
    let p = Pipeline::default();
    let seq = from_table(&p, &table).combine_globally(LowOrderMoments::new(2), None).collect_seq()?;
    let p = Pipeline::default();
    let par = from_table(&p, &table).combine_globally(LowOrderMoments::new(2), Some(2)).collect_par(Some(4), Some(9))?;
    assert_stats_close(&par[0], &seq[0]);
    Ok(())
}

#[test]
fn map_then_merge_partials() -> Result<()> {
    let table = fixtures::wide_table(120, 4);
    let p = Pipeline::default();
    let reducer = LocalReducer::new(4);
    let got = from_partitions(&p, table.split_rows(6))
        .try_map(move |b: &NumericTable| Ok(reducer.reduce_table(b)?))
        .combine_globally(MergePartials::new(4), Some(2))
        .collect_par(None, Some(3))?;
    assert_stats_close(&got[0], &reference(&table));
    Ok(())
}

#[test]
fn driver_worked_example() -> Result<()> {
    let parts = vec![
        NumericTable::from_rows(&[[1.0, 2.0]])?,
        NumericTable::from_rows(&[[3.0, 4.0], [5.0, 6.0]])?,
    ];
    let stats = compute_moments(parts, &RunnerConfig::parallel(2))?;
    assert_eq!(stats.n(), 3);
    assert_eq!(stats.sum(), &[9.0, 12.0]);
    assert_eq!(stats.sum_sq(), &[35.0, 56.0]);
    assert_eq!(stats.mean(), &[3.0, 4.0]);
    assert_vec_close(stats.variance(), [8.0 / 3.0, 8.0 / 3.0], 1e-12);
    Ok(())
}

#[test]
fn driver_skips_empty_partitions() -> Result<()> {
    let table = fixtures::small_grid();
    let mut parts = table.split_rows(3);
    parts.insert(1, NumericTable::new(2));
    parts.push(NumericTable::new(0));
    let stats = compute_moments(parts, &RunnerConfig::sequential())?;
    assert_stats_close(&stats, &reference(&table));
    Ok(())
}

#[test]
fn table_driver_agrees_with_block_driver() -> Result<()> {
    let table = fixtures::wide_table(500, 3);
    let cfg = RunnerConfig::parallel(8).with_fanout(4);
    let a = compute_table_moments(&table, &cfg)?;
    let b = compute_moments(table.split_rows(5), &cfg)?;
    assert_stats_close(&a, &b);
    Ok(())
}

#[test]
fn empty_dataset_through_engine() {
    let p = Pipeline::default();
    let err = from_vec(&p, Vec::<Vec<f64>>::new())
        .combine_globally_lifted(LowOrderMoments::new(2), None)
        .collect_par(None, Some(4))
        .unwrap_err();
    assert_eq!(err.downcast_ref::<StatsError>(), Some(&StatsError::EmptyDataset));
}

#[test]
fn ragged_row_through_engine() {
    let p = Pipeline::default();
    let err = from_vec(&p, vec![vec![1.0, 2.0], vec![3.0], vec![4.0, 5.0]])
        .combine_globally(LowOrderMoments::new(2), None)
        .collect_seq()
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<StatsError>(), Some(StatsError::InvalidInput(_))));
}
