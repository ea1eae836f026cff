//! Homogeneous row-major numeric tables.
//!
//! A [`NumericTable`] is the unit of data handed to a worker: every row has
//! exactly [`num_columns`](NumericTable::num_columns) `f64` cells, stored
//! contiguously. Shape problems are reported as
//! [`StatsError::InvalidInput`] or [`StatsError::ColumnMismatch`].

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// Dense row-major table of `f64` values.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct NumericTable {
    columns: usize,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct RawTable {
    columns: usize,
    data: Vec<f64>,
}

impl TryFrom<RawTable> for NumericTable {
    type Error = StatsError;

    fn try_from(raw: RawTable) -> StatsResult<Self> {
        Self::from_flat(raw.columns, raw.data)
    }
}

impl NumericTable {
    /// Empty table with a fixed column count.
    #[must_use]
    pub fn new(columns: usize) -> Self {
        Self { columns, data: Vec::new() }
    }

    /// Build a table from a flat row-major buffer.
    ///
    /// # Errors
    /// Returns [`StatsError::InvalidInput`] when `data.len()` is not a multiple
    /// of `columns`, or when `columns == 0` and `data` is non-empty.
    pub fn from_flat(columns: usize, data: Vec<f64>) -> StatsResult<Self> {
        if columns == 0 {
            if !data.is_empty() {
                return Err(StatsError::invalid(format!(
                    "{} values supplied for a zero-column table",
                    data.len()
                )));
            }
        } else if data.len() % columns != 0 {
            return Err(StatsError::invalid(format!(
                "{} values do not fill rows of {columns} columns",
                data.len()
            )));
        }
        Ok(Self { columns, data })
    }

    /// Build a table from rows; the first row fixes the column count.
    ///
    /// # Errors
    /// Returns [`StatsError::InvalidInput`] naming the first ragged row.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> StatsResult<Self> {
        let columns = rows.first().map_or(0, |r| r.as_ref().len());
        let mut table = Self::new(columns);
        table.data.reserve(columns * rows.len());
        for row in rows {
            table.push_row(row.as_ref())?;
        }
        Ok(table)
    }

    /// Append one row.
    ///
    /// # Errors
    /// Returns [`StatsError::InvalidInput`] if the row length differs from the
    /// table's column count.
    pub fn push_row(&mut self, row: &[f64]) -> StatsResult<()> {
        if row.len() != self.columns {
            return Err(StatsError::invalid(format!(
                "row #{} has {} values, expected {}",
                self.num_rows(),
                row.len(),
                self.columns
            )));
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        if self.columns == 0 { 0 } else { self.data.len() / self.columns }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Row `i`, or `None` past the end.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.num_rows() {
            return None;
        }
        let start = i * self.columns;
        Some(&self.data[start..start + self.columns])
    }

    /// Iterate rows in order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> + '_ {
        // chunks_exact panics on 0, and a zero-column table has no rows anyway.
        self.data.chunks_exact(self.columns.max(1))
    }

    /// Flat row-major view.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Rows as owned vectors, the element type of a row-wise `PCollection`.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    /// Split into at most `n` contiguous partitions of roughly equal size.
    ///
    /// Row order is preserved across the concatenation of the result. A table
    /// with fewer rows than `n` yields one partition per row; an empty table
    /// yields a single empty partition.
    #[must_use]
    pub fn split_rows(&self, n: usize) -> Vec<NumericTable> {
        let rows = self.num_rows();
        if n <= 1 || rows <= 1 {
            return vec![self.clone()];
        }
        let chunk = rows.div_ceil(n) * self.columns;
        self.data
            .chunks(chunk)
            .map(|c| NumericTable { columns: self.columns, data: c.to_vec() })
            .collect()
    }

    /// Concatenate tables vertically.
    ///
    /// # Errors
    /// Returns [`StatsError::ColumnMismatch`] if any table disagrees with the
    /// first one's column count.
    pub fn vstack(tables: &[NumericTable]) -> StatsResult<NumericTable> {
        let Some(first) = tables.first() else {
            return Ok(NumericTable::default());
        };
        let mut out = NumericTable::new(first.columns);
        for t in tables {
            if t.columns != first.columns {
                return Err(StatsError::ColumnMismatch { left: first.columns, right: t.columns });
            }
            out.data.extend_from_slice(&t.data);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_rejects_partial_rows() {
        let err = serde_json::from_str::<NumericTable>(r#"{"columns":2,"data":[1,2,3]}"#).unwrap_err();
        assert!(err.to_string().contains("do not fill rows"), "{err}");
        assert!(serde_json::from_str::<NumericTable>(r#"{"columns":0,"data":[1]}"#).is_err());

        let t: NumericTable = serde_json::from_str(r#"{"columns":2,"data":[1,2,3,4]}"#).unwrap();
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.row(1), Some(&[3.0, 4.0][..]));
    }

    #[test]
    fn ragged_rows_are_rejected_with_index() {
        let err = NumericTable::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        match err {
            StatsError::InvalidInput(msg) => assert!(msg.contains("row #1"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn flat_buffer_must_fill_rows() {
        assert!(NumericTable::from_flat(3, vec![1.0; 7]).is_err());
        assert!(NumericTable::from_flat(0, vec![1.0]).is_err());
        let t = NumericTable::from_flat(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(t.row(2), None);
    }

    #[test]
    fn split_preserves_order_and_rows() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![f64::from(i), 0.5]).collect();
        let t = NumericTable::from_rows(&rows).unwrap();
        let parts = t.split_rows(3);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts.iter().map(NumericTable::num_rows).sum::<usize>(), 10);
        assert_eq!(NumericTable::vstack(&parts).unwrap(), t);
    }

    #[test]
    fn split_of_empty_table_is_one_empty_partition() {
        let parts = NumericTable::new(4).split_rows(8);
        assert_eq!(parts.len(), 1);
        assert!(parts[0].is_empty());
        assert_eq!(parts[0].num_columns(), 4);
    }

    #[test]
    fn vstack_rejects_mixed_widths() {
        let a = NumericTable::new(2);
        let b = NumericTable::new(3);
        assert_eq!(
            NumericTable::vstack(&[a, b]),
            Err(StatsError::ColumnMismatch { left: 2, right: 3 })
        );
    }

    #[test]
    fn zero_column_table_has_no_rows() {
        let t = NumericTable::new(0);
        assert_eq!(t.num_rows(), 0);
        assert_eq!(t.rows().count(), 0);
    }
}
