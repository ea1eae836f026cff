//! Low-order moments computed as a two-phase distributed reduction.
//!
//! 1. **Local reduce**: each partition becomes a [`PartialSummary`] holding
//!    `n`, per-column `min`, `max`, `sum` and `sum_sq`.
//! 2. **Combine**: summaries merge pairwise with [`combine`]. The merge is
//!    associative and commutative, so any reduction tree gives the same
//!    answer up to floating-point summation order; results can differ in the
//!    last bits between partition counts or fanouts.
//! 3. **Finalize**: [`finalize`] derives mean, raw second moment, population
//!    variance, standard deviation and variation from the survivor.
//!
//! ```
//! use ironstats::moments::{combine, finalize, local_reduce};
//!
//! let a = local_reduce(2, &[[1.0, 2.0]])?;
//! let b = local_reduce(2, &[[3.0, 4.0], [5.0, 6.0]])?;
//! let total = finalize(&combine(&a, &b)?)?;
//! assert_eq!(total.mean(), &[3.0, 4.0]);
//! # Ok::<_, ironstats::StatsError>(())
//! ```

mod combiners;
mod driver;
mod finalize;
mod partial;

pub use combiners::{LowOrderMoments, MergePartials};
pub use driver::{compute_moments, compute_table_moments};
pub use finalize::{FinalSummary, finalize};
pub use partial::{LocalReducer, PartialSummary, combine, local_reduce};
