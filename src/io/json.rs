//! JSON reports.
//!
//! Results ([`FinalSummary`](crate::moments::FinalSummary),
//! [`LinearModel`](crate::regression::LinearModel)) are written as a single
//! pretty-printed document. JSON has no infinities, so an infinite variation
//! is written as `null`.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{File, create_dir_all};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write `value` as pretty JSON, creating parent directories.
///
/// # Errors
/// Fails if the file cannot be created or serialization fails.
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, value).with_context(|| format!("serialize {}", path.display()))?;
    w.write_all(b"\n")?;
    w.flush()?;
    Ok(())
}

/// Read a JSON document into `T`.
///
/// # Errors
/// Fails if the file cannot be opened or does not deserialize into `T`.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parse JSON {}", path.display()))
}
