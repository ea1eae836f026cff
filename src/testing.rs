//! Testing utilities for statistical pipelines.
//!
//! - **Assertions**: compare floating-point results with a relative tolerance
//! - **Fixtures**: small deterministic datasets with known statistics
//!
//! # Quick Start
//!
//! ```
//! use ironstats::moments::{finalize, local_reduce};
//! use ironstats::testing::*;
//!
//! let grid = fixtures::small_grid();
//! let stats = finalize(&local_reduce(2, &grid.to_rows())?)?;
//! assert_vec_close(stats.mean(), &[3.0, 4.0], DEFAULT_REL_TOL);
//! # Ok::<_, ironstats::StatsError>(())
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
