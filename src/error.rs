//! Typed failures of the statistical kernels.
//!
//! The pure functions in [`moments`](crate::moments) and
//! [`regression`](crate::regression) return `Result<_, StatsError>`. Once a
//! failure crosses into the pipeline engine it travels as an
//! [`anyhow::Error`]; recover the category with
//! `err.downcast_ref::<StatsError>()`.

use thiserror::Error;

/// Result alias for the statistical kernels.
pub type StatsResult<T> = Result<T, StatsError>;

/// Error categories raised while reducing, combining or finalizing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// Malformed row or table shape. Aborts the partition that raised it.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Two partial results disagree on their column count.
    #[error("column mismatch: left has {left} columns, right has {right}")]
    ColumnMismatch { left: usize, right: usize },

    /// No rows were seen across any partition.
    #[error("empty dataset: no rows were observed in any partition")]
    EmptyDataset,

    /// The normal-equation system is not positive definite.
    #[error("singular system: cross-product matrix is not positive definite")]
    SingularSystem,
}

impl StatsError {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_shapes() {
        let e = StatsError::ColumnMismatch { left: 2, right: 3 };
        assert_eq!(e.to_string(), "column mismatch: left has 2 columns, right has 3");
        assert!(StatsError::invalid("row #4").to_string().contains("row #4"));
    }

    #[test]
    fn survives_anyhow_round_trip() {
        let err: anyhow::Error = StatsError::EmptyDataset.into();
        let err = err.context("finalize");
        assert_eq!(err.downcast_ref::<StatsError>(), Some(&StatsError::EmptyDataset));
    }
}
