//! Type-erased payloads.
//!
//! Between nodes the runner only sees [`Partition`]s. What is inside depends
//! on the stage: a block of rows (`Vec<Vec<f64>>`) or of tables
//! (`Vec<NumericTable>`) before a combine, a single
//! [`PartialSummary`](crate::moments::PartialSummary) or
//! [`NormEqPartial`](crate::regression::NormEqPartial) accumulator while
//! merging, and a one-element `Vec` of the finished result afterwards.
//!
//! A source node keeps its payload together with a [`VecOps`] built by
//! [`vec_ops_for`], so the runner can count, split and clone it without
//! knowing the element type, and a [`TypeTag`] for naming that type in
//! errors. A wrongly typed payload yields `None`, which the runner reports
//! as an error instead of panicking.

use std::any::{Any, TypeId, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

/// One worker's share of a stage: a `Vec<T>` block or a combine accumulator.
pub type Partition = Box<dyn Any + Send + Sync>;

/// Element type of a source, kept for error messages.
///
/// ```
/// use ironstats::type_token::TypeTag;
/// let tag = TypeTag::of::<f64>();
/// assert_eq!(tag.name, "f64");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeTag {
    pub id: TypeId,
    /// `std::any::type_name`, e.g. `alloc::vec::Vec<f64>` for table rows.
    pub name: &'static str,
}

impl TypeTag {
    /// Construct a tag for `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self { id: TypeId::of::<T>(), name: type_name::<T>() }
    }
}

/// What the runner needs from a source payload without knowing `T`.
///
/// Every method returns `None` when `data` is not the `Vec<T>` the ops were
/// built for.
pub trait VecOps: Send + Sync {
    /// Element count: rows for a row source, blocks for a partitioned one.
    fn len(&self, data: &dyn Any) -> Option<usize>;

    /// Split into at most `n` contiguous partitions, one per worker.
    ///
    /// Yields a single partition for `n <= 1` or at most one element.
    /// Concatenating the partitions gives back the original order, so a
    /// partitioned source keeps its blocks in file order.
    fn split(&self, data: &dyn Any, n: usize) -> Option<Vec<Partition>>;

    /// The whole payload as one partition, for sequential runs.
    fn clone_any(&self, data: &dyn Any) -> Option<Partition>;
}

/// [`VecOps`] for `Vec<T>`.
pub struct VecOpsImpl<T: Clone + Send + Sync + 'static>(PhantomData<T>);

impl<T: Clone + Send + Sync + 'static> VecOps for VecOpsImpl<T> {
    fn len(&self, data: &dyn Any) -> Option<usize> {
        data.downcast_ref::<Vec<T>>().map(Vec::len)
    }

    fn split(&self, data: &dyn Any, n: usize) -> Option<Vec<Partition>> {
        let v = data.downcast_ref::<Vec<T>>()?;
        let len = v.len();

        if n <= 1 || len <= 1 {
            return Some(vec![Box::new(v.clone())]);
        }

        // The last chunk may be shorter.
        let chunk = len.div_ceil(n);
        let parts = v.chunks(chunk).map(|c| Box::new(c.to_vec()) as Partition).collect();
        Some(parts)
    }

    fn clone_any(&self, data: &dyn Any) -> Option<Partition> {
        data.downcast_ref::<Vec<T>>().map(|v| Box::new(v.clone()) as Partition)
    }
}

/// Ops for a source of `T` elements.
///
/// ```
/// use ironstats::NumericTable;
/// use ironstats::type_token::vec_ops_for;
///
/// let ops = vec_ops_for::<NumericTable>();
/// let blocks = vec![NumericTable::new(2), NumericTable::new(2), NumericTable::new(2)];
/// assert_eq!(ops.len(&blocks), Some(3));
/// assert_eq!(ops.split(&blocks, 2).map(|p| p.len()), Some(2));
/// ```
#[must_use]
pub fn vec_ops_for<T: Clone + Send + Sync + 'static>() -> Arc<dyn VecOps> {
    Arc::new(VecOpsImpl::<T>(PhantomData))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::table::NumericTable;

    #[test]
    fn rows_are_not_tables() {
        let ops = vec_ops_for::<NumericTable>();
        let rows: Vec<Vec<f64>> = vec![vec![1.0]];
        assert!(ops.split(&rows, 2).is_none());
        assert!(ops.len(&rows).is_none());
        assert!(ops.clone_any(&rows).is_none());
    }

    #[test]
    fn row_split_keeps_order() {
        let ops = vec_ops_for::<Vec<f64>>();
        let rows: Vec<Vec<f64>> = (0..7).map(|i| vec![f64::from(i), 1.0]).collect();
        let parts = ops.split(&rows, 3).unwrap();
        assert_eq!(parts.len(), 3);
        let joined: Vec<Vec<f64>> = parts
            .into_iter()
            .flat_map(|p| *p.downcast::<Vec<Vec<f64>>>().unwrap())
            .collect();
        assert_eq!(joined, rows);
    }

    #[test]
    fn tag_names_the_element_type() {
        assert!(TypeTag::of::<NumericTable>().name.ends_with("NumericTable"));
    }
}
