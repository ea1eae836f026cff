//! Runner configuration.
//!
//! A [`RunnerConfig`] is the serializable form of a [`Runner`]: execution
//! mode, partition count, worker threads and merge fanout, plus whether the
//! drivers accept empty partitions. Every field is optional in JSON; omitted
//! fields fall back to the runner defaults.
//!
//! ```
//! use ironstats::config::RunnerConfig;
//! use ironstats::ExecMode;
//!
//! let cfg = RunnerConfig::from_json_str(r#"{ "mode": { "parallel": { "partitions": 8 } }, "fanout": 4 }"#)?;
//! assert_eq!(cfg.mode, ExecMode::Parallel { threads: None, partitions: Some(8) });
//! assert_eq!(cfg.runner().default_fanout, 4);
//! # Ok::<_, anyhow::Error>(())
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::runner::{ExecMode, Runner};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Sequential or parallel execution.
    pub mode: ExecMode,
    /// Maximum accumulators merged per call; `None` keeps the runner default.
    pub fanout: Option<usize>,
    /// Fail a partition that has no rows instead of reducing it to the
    /// identity summary.
    pub require_non_empty: bool,
}

impl RunnerConfig {
    #[must_use]
    pub fn sequential() -> Self {
        Self { mode: ExecMode::Sequential, ..Self::default() }
    }

    #[must_use]
    pub fn parallel(partitions: usize) -> Self {
        Self { mode: ExecMode::Parallel { threads: None, partitions: Some(partitions) }, ..Self::default() }
    }

    #[must_use]
    pub fn with_fanout(mut self, fanout: usize) -> Self {
        self.fanout = Some(fanout);
        self
    }

    #[must_use]
    pub fn with_require_non_empty(mut self, yes: bool) -> Self {
        self.require_non_empty = yes;
        self
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    /// Fails on malformed JSON, unknown fields, or a fanout below 2.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse runner config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON file.
    ///
    /// # Errors
    /// Fails if the file cannot be read or does not parse.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json_str(&s).with_context(|| format!("load runner config from {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if let Some(f) = self.fanout
            && f < 2
        {
            bail!("fanout must be at least 2, got {f}");
        }
        if let ExecMode::Parallel { threads: Some(0), .. } = self.mode {
            bail!("threads must be positive");
        }
        if let ExecMode::Parallel { partitions: Some(0), .. } = self.mode {
            bail!("partitions must be positive");
        }
        Ok(())
    }

    /// Build the runner this configuration describes.
    #[must_use]
    pub fn runner(&self) -> Runner {
        let mut r = Runner { mode: self.mode, ..Default::default() };
        if let Some(f) = self.fanout {
            r.default_fanout = f;
        }
        r
    }
}
