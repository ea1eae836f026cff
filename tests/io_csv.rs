#![cfg(feature = "io-csv")]

use anyhow::Result;
use ironstats::io::json::{read_json, write_json};
use ironstats::moments::{FinalSummary, compute_moments};
use ironstats::testing::{DEFAULT_REL_TOL, assert_vec_close, fixtures};
use ironstats::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn write_then_read_table() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("nested/out.csv");
    let table = fixtures::wide_table(25, 3);

    let written = write_csv_table(&path, &table, Some(&["a", "b", "c"]))?;
    assert_eq!(written, 25);
    let contents = fs::read_to_string(&path)?;
    assert!(contents.starts_with("a,b,c\n"));

    let back = read_csv_table(&path, true)?;
    assert_eq!(back, table);
    Ok(())
}

#[test]
fn header_width_must_match() -> Result<()> {
    let dir = TempDir::new()?;
    let err = write_csv_table(dir.path().join("x.csv"), &fixtures::small_grid(), Some(&["only"])).unwrap_err();
    assert!(matches!(err.downcast_ref::<StatsError>(), Some(StatsError::InvalidInput(_))));
    Ok(())
}

#[test]
fn reads_whitespace_and_no_header() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("data.csv");
    fs::write(&path, "1, 2\n3 ,4\n5,6\n")?;
    let t = read_csv_table(&path, false)?;
    assert_eq!(t, fixtures::small_grid());
    Ok(())
}

#[test]
fn ragged_csv_is_invalid_input() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("ragged.csv");
    fs::write(&path, "1,2\n3\n")?;
    let err = read_csv_table(&path, false).unwrap_err();
    assert!(matches!(err.downcast_ref::<StatsError>(), Some(StatsError::InvalidInput(_))));
    Ok(())
}

#[test]
fn non_numeric_cell_names_position() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("bad.csv");
    fs::write(&path, "1,2\n3,oops\n")?;
    let err = read_csv_table(&path, false).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("record #2 column #2"), "{msg}");
    Ok(())
}

#[test]
fn empty_file_is_empty_table() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("empty.csv");
    fs::write(&path, "")?;
    let t = read_csv_table(&path, false)?;
    assert!(t.is_empty());
    assert_eq!(t.num_columns(), 0);
    Ok(())
}

#[test]
fn glob_partitions_feed_moments_driver() -> Result<()> {
    let dir = TempDir::new()?;
    let table = fixtures::wide_table(40, 2);
    for (i, part) in table.split_rows(4).iter().enumerate() {
        write_csv_table(dir.path().join(format!("train_{}.csv", i + 1)), part, None)?;
    }
    fs::write(dir.path().join("train_labels.csv"), "9,9\n")?;

    let pattern = format!("{}/train_?.csv", dir.path().display());
    let parts = read_csv_partitions(&pattern, false)?;
    assert_eq!(parts.len(), 4);
    assert_eq!(NumericTable::vstack(&parts)?, table);

    let stats = compute_moments(parts, &RunnerConfig::parallel(4))?;
    assert_eq!(stats.n(), 40);

    let report = dir.path().join("report/moments.json");
    write_json(&report, &stats)?;
    let back: FinalSummary = read_json(&report)?;
    assert_eq!(back.n(), stats.n());
    assert_vec_close(back.mean(), stats.mean(), DEFAULT_REL_TOL);
    Ok(())
}

#[test]
fn glob_without_matches_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let pattern = format!("{}/*.csv", dir.path().display());
    assert!(read_csv_partitions(&pattern, false).is_err());
    Ok(())
}
