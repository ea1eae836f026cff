//! Deterministic datasets with known statistics.

use crate::table::NumericTable;

/// `[[1, 2], [3, 4], [5, 6]]`: mean `[3, 4]`, population variance `8/3`.
///
/// # Panics
/// Never; the rows are rectangular.
#[must_use]
pub fn small_grid() -> NumericTable {
    NumericTable::from_flat(2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("rectangular fixture")
}

/// A `rows × columns` table of irregular, reproducible values with mixed
/// signs and magnitudes up to about `10³`.
///
/// # Panics
/// Never; the buffer length is `rows * columns`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn wide_table(rows: usize, columns: usize) -> NumericTable {
    let mut data = Vec::with_capacity(rows * columns);
    for i in 0..rows {
        for j in 0..columns {
            let k = (i * 31 + j * 17 + 7) % 101;
            let v = (k as f64 - 50.0) * (1.0 + j as f64 * 10.0) / 7.0 + (i as f64).sin();
            data.push(v);
        }
    }
    NumericTable::from_flat(columns, data).expect("rectangular fixture")
}

/// Features and responses of the exact plane `y = beta[0] + Σ beta[j+1]·x[j]`.
///
/// Features come from [`wide_table`], so the design is well conditioned for
/// `rows` comfortably above `beta.len()`.
///
/// # Panics
/// Panics if `beta` is empty.
#[must_use]
pub fn linear_dataset(rows: usize, beta: &[f64]) -> (NumericTable, NumericTable) {
    let features = beta.len().saturating_sub(1);
    let x = wide_table(rows, features);
    let mut y = NumericTable::new(1);
    for row in x.rows() {
        let v = beta[0] + beta[1..].iter().zip(row).map(|(b, xi)| b * xi).sum::<f64>();
        y.push_row(&[v]).expect("single response column");
    }
    (x, y)
}
