//! Properties of the local reduce / combine / finalize pipeline.

use ironstats::moments::{PartialSummary, combine, finalize, local_reduce};
use ironstats::testing::{DEFAULT_REL_TOL, assert_vec_close, fixtures};
use ironstats::{NumericTable, StatsError};

fn summary_of(table: &NumericTable) -> PartialSummary {
    local_reduce(table.num_columns(), &table.to_rows()).unwrap()
}

fn assert_summary_close(a: &PartialSummary, b: &PartialSummary) {
    assert_eq!(a.n(), b.n());
    assert_eq!(a.min(), b.min());
    assert_eq!(a.max(), b.max());
    assert_vec_close(a.sum(), b.sum(), DEFAULT_REL_TOL);
    assert_vec_close(a.sum_sq(), b.sum_sq(), DEFAULT_REL_TOL);
}

#[test]
fn worked_example_two_partitions() -> anyhow::Result<()> {
    let left = local_reduce(2, &[[1.0, 2.0]])?;
    assert_eq!(left.n(), 1);
    assert_eq!(left.min(), &[1.0, 2.0]);
    assert_eq!(left.max(), &[1.0, 2.0]);
    assert_eq!(left.sum(), &[1.0, 2.0]);
    assert_eq!(left.sum_sq(), &[1.0, 4.0]);

    let right = local_reduce(2, &[[3.0, 4.0], [5.0, 6.0]])?;
    assert_eq!(right.n(), 2);
    assert_eq!(right.min(), &[3.0, 4.0]);
    assert_eq!(right.max(), &[5.0, 6.0]);
    assert_eq!(right.sum(), &[8.0, 10.0]);
    assert_eq!(right.sum_sq(), &[34.0, 52.0]);

    let all = combine(&left, &right)?;
    assert_eq!(all.n(), 3);
    assert_eq!(all.min(), &[1.0, 2.0]);
    assert_eq!(all.max(), &[5.0, 6.0]);
    assert_eq!(all.sum(), &[9.0, 12.0]);
    assert_eq!(all.sum_sq(), &[35.0, 56.0]);

    let stats = finalize(&all)?;
    assert_eq!(stats.mean(), &[3.0, 4.0]);
    assert_vec_close(stats.variance(), [35.0 / 3.0 - 9.0, 56.0 / 3.0 - 16.0], 1e-12);
    assert_vec_close(stats.variance(), [8.0 / 3.0, 8.0 / 3.0], 1e-12);
    assert_vec_close(stats.stddev(), [(8.0f64 / 3.0).sqrt(); 2], 1e-12);
    assert_vec_close(
        stats.variation(),
        [(8.0f64 / 3.0).sqrt() / 3.0, (8.0f64 / 3.0).sqrt() / 4.0],
        1e-12,
    );
    Ok(())
}

#[test]
fn any_split_matches_single_partition() -> anyhow::Result<()> {
    let table = fixtures::wide_table(257, 4);
    let whole = finalize(&summary_of(&table))?;

    for n in [2usize, 3, 7, 16, 64, 257] {
        let parts = table.split_rows(n);
        let mut acc = PartialSummary::identity(4);
        for p in &parts {
            acc = combine(&acc, &summary_of(p))?;
        }
        let split = finalize(&acc)?;
        assert_eq!(split.n(), whole.n());
        assert_eq!(split.min(), whole.min());
        assert_eq!(split.max(), whole.max());
        assert_vec_close(split.mean(), whole.mean(), DEFAULT_REL_TOL);
        assert_vec_close(split.variance(), whole.variance(), DEFAULT_REL_TOL);
    }
    Ok(())
}

#[test]
fn combine_is_associative() -> anyhow::Result<()> {
    let parts = fixtures::wide_table(90, 3).split_rows(3);
    let (a, b, c) = (summary_of(&parts[0]), summary_of(&parts[1]), summary_of(&parts[2]));
    let left = combine(&combine(&a, &b)?, &c)?;
    let right = combine(&a, &combine(&b, &c)?)?;
    assert_summary_close(&left, &right);
    Ok(())
}

#[test]
fn combine_is_commutative_exactly() -> anyhow::Result<()> {
    let parts = fixtures::wide_table(50, 5).split_rows(2);
    let (a, b) = (summary_of(&parts[0]), summary_of(&parts[1]));
    assert_eq!(combine(&a, &b)?, combine(&b, &a)?);
    Ok(())
}

#[test]
fn identity_leaves_summary_unchanged() -> anyhow::Result<()> {
    let a = summary_of(&fixtures::wide_table(20, 3));
    let e = PartialSummary::identity(3);
    assert_eq!(combine(&a, &e)?, a);
    assert_eq!(combine(&e, &a)?, a);
    assert_eq!(combine(&e, &e)?, e);
    Ok(())
}

#[test]
fn empty_partition_reduces_to_identity() -> anyhow::Result<()> {
    let empty: Vec<Vec<f64>> = Vec::new();
    let p = local_reduce(3, &empty)?;
    assert!(p.is_identity());
    assert_eq!(p.min(), &[f64::INFINITY; 3]);
    assert_eq!(p.max(), &[f64::NEG_INFINITY; 3]);
    assert_eq!(p.sum(), &[0.0; 3]);
    assert_eq!(p.sum_sq(), &[0.0; 3]);
    Ok(())
}

#[test]
fn column_mismatch_on_combine() {
    let a = PartialSummary::identity(2);
    let b = PartialSummary::identity(3);
    assert_eq!(combine(&a, &b), Err(StatsError::ColumnMismatch { left: 2, right: 3 }));
}

#[test]
fn finalize_of_only_empty_partitions_fails() -> anyhow::Result<()> {
    let e = PartialSummary::identity(2);
    let all = combine(&e, &e)?;
    assert_eq!(finalize(&all), Err(StatsError::EmptyDataset));
    Ok(())
}

#[test]
fn large_offset_keeps_variance_non_negative() -> anyhow::Result<()> {
    // Catastrophic cancellation territory for the raw-moment formula.
    let rows: Vec<[f64; 1]> = (0..1000).map(|i| [1e9 + f64::from(i % 2) * 1e-3]).collect();
    let stats = finalize(&local_reduce(1, &rows)?)?;
    assert!(stats.variance()[0] >= 0.0);
    assert!(stats.stddev()[0].is_finite());
    Ok(())
}
