//! # Ironstats
//!
//! Distributed statistical aggregation over partitioned numeric tables.
//! Work is expressed as a two-phase reduction: every partition is reduced
//! to a small mergeable summary on a worker, summaries are combined pairwise
//! in a reduction tree, and one finalize step derives the reported
//! statistics.
//!
//! ## Key Features
//!
//! - **Low-order moments** - min, max, sum, sum of squares, mean, raw second
//!   moment, variance, standard deviation and variation per column
//! - **Linear regression** - normal equations accumulated per partition and
//!   solved once on the driver
//! - **Deferred pipeline API** - `map`, `try_map`, `filter`, `flat_map` and
//!   `combine_globally` over a lazily executed graph
//! - **Sequential and parallel execution** - rayon workers with a
//!   configurable merge fanout
//! - **I/O** - numeric CSV tables, glob-partitioned inputs, JSON reports
//!
//! ## Quick Start
//!
//! ```
//! use ironstats::*;
//! use ironstats::moments::compute_moments;
//!
//! # fn main() -> anyhow::Result<()> {
//! let parts = vec![
//!     NumericTable::from_rows(&[[1.0, 2.0]])?,
//!     NumericTable::from_rows(&[[3.0, 4.0], [5.0, 6.0]])?,
//! ];
//! let stats = compute_moments(parts, &RunnerConfig::default())?;
//! assert_eq!(stats.mean(), &[3.0, 4.0]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Pipeline and PCollection
//!
//! A [`Pipeline`] holds the computation graph; a [`PCollection<T>`] is a typed
//! handle to one of its nodes. Nothing runs until a collect method:
//! - [`collect_seq`](PCollection::collect_seq) - single partition, calling thread
//! - [`collect_par`](PCollection::collect_par) - partitioned across rayon workers
//! - [`collect_with`](PCollection::collect_with) - a [`Runner`] built from a [`RunnerConfig`]
//!
//! ### Combiners
//!
//! A [`CombineFn`] supplies `create`, `add_input`, `merge` and `finish`.
//! [`LiftableCombiner`] adds a whole-partition fast path. The statistical
//! kernels ship as combiners:
//! - [`moments::LowOrderMoments`] - rows in, [`moments::FinalSummary`] out
//! - [`moments::MergePartials`] - per-block summaries in
//! - [`regression::NormalEquations`] - per-block cross products in,
//!   [`regression::LinearModel`] out
//!
//! ### Errors
//!
//! Kernels return [`StatsError`]. Pipelines and I/O return [`anyhow::Error`];
//! use `err.downcast_ref::<StatsError>()` to recover the category.
//!
//! ## Architecture
//!
//! 1. Building a pipeline creates a linear chain of nodes
//! 2. The [`runner`] splits the source, fuses stateless nodes per partition,
//!    and treats a global combine as a barrier
//! 3. Partition accumulators merge in rounds of at most `fanout`
//! 4. The single result is finished and materialized
//!
//! Floating-point sums depend on merge order, so different partition counts
//! can disagree in the last few bits.
//!
//! ## Module Overview
//!
//! - [`table`] - row-major numeric tables
//! - [`moments`] - local reduce, combine, finalize
//! - [`regression`] - normal-equations linear regression
//! - [`collection`] / [`pipeline`] / [`runner`] - the execution engine
//! - [`config`] - runner configuration
//! - [`io`] - CSV, glob and JSON
//! - [`testing`] - tolerance assertions and fixtures

pub mod collection;
pub mod config;
pub mod error;
pub mod io;
pub mod moments;
pub mod node;
pub mod node_id;
pub mod pipeline;
pub mod regression;
pub mod runner;
pub mod table;
pub mod testing;
pub mod type_token;
mod helpers;

// General re-exports
pub use collection::{CombineFn, LiftableCombiner, PCollection, RFBound, from_partitions, from_table, from_vec};
pub use config::RunnerConfig;
pub use error::{StatsError, StatsResult};
pub use node_id::NodeId;
pub use pipeline::Pipeline;
pub use runner::{ExecMode, Runner};
pub use table::NumericTable;
pub use type_token::Partition;

// Gated re-exports
#[cfg(feature = "io-csv")]
pub use io::csv::{read_csv_partitions, read_csv_table, write_csv_table};
