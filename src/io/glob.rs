//! File globbing for partitioned inputs.
//!
//! Partitioned datasets are commonly laid out as one file per worker, e.g.
//! `data/train_1.csv`, `data/train_2.csv`, matched by `data/train_?.csv`.
//! Matches are returned in sorted order so partition numbering is stable.
//!
//! ```no_run
//! use ironstats::io::glob::expand_glob;
//!
//! let files = expand_glob("data/train_?.csv")?;
//! # use anyhow::Error; Ok::<(), Error>(())
//! ```

use anyhow::{Context, Result, bail};
use glob::glob;
use std::path::PathBuf;

/// Expand a glob pattern into a sorted vector of matching file paths.
///
/// Supports the standard syntax: `*`, `?`, `**`, `[abc]` and `[!abc]`.
/// Directories are skipped. No match yields an empty vector.
///
/// # Errors
/// Returns an error if the pattern is invalid or a matched entry cannot be read.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut result = Vec::new();
    for entry in paths {
        let path = entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if path.is_file() {
            result.push(path);
        }
    }

    result.sort();
    Ok(result)
}

/// Like [`expand_glob`], but zero matches is an error.
///
/// # Errors
/// As for [`expand_glob`], plus when no file matches.
pub fn expand_glob_required(pattern: &str) -> Result<Vec<PathBuf>> {
    let files = expand_glob(pattern)?;
    if files.is_empty() {
        bail!("no files found matching pattern: {pattern}");
    }
    Ok(files)
}
