//! I/O for tables and results.
//!
//! - [`glob`]: expand partitioned file patterns
//! - [`json`]: write and read result documents
//! - [`csv`]: numeric tables from and to CSV (feature `io-csv`)

#[cfg(feature = "io-csv")]
pub mod csv;
pub mod glob;
pub mod json;
