use crate::type_token::{Partition, TypeTag, VecOps};
use anyhow::Result;
use std::any::Any;
use std::sync::Arc;

/// A type-erased element-wise transform applied to one partition.
pub trait DynOp: Send + Sync {
    fn apply(&self, input: Partition) -> Result<Partition>;
}

/// Partition-level closure: one partition (or accumulator) in, one out.
pub type PartitionFn = Arc<dyn Fn(Partition) -> Result<Partition> + Send + Sync>;

/// Merge closure: a group of accumulators in, one accumulator out.
pub type MergeFn = Arc<dyn Fn(Vec<Partition>) -> Result<Partition> + Send + Sync>;

#[derive(Clone)]
pub enum Node {
    Source {
        payload: Arc<dyn Any + Send + Sync>,
        vec_ops: Arc<dyn VecOps>,
        elem_tag: TypeTag,
    },
    Stateless(Vec<Arc<dyn DynOp>>),

    /// Global combine:
    /// - `local`: `Vec<T>` → `A` once per partition
    /// - `merge`: `Vec<A>` → `A`, applied in rounds of at most `fanout`
    /// - `finish`: `A` → `Vec<O>` holding exactly one element
    CombineGlobal {
        local: PartitionFn,
        merge: MergeFn,
        finish: PartitionFn,
        fanout: Option<usize>,
    },
}

impl Node {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Node::Source { .. } => "source",
            Node::Stateless(_) => "stateless",
            Node::CombineGlobal { .. } => "combine_global",
        }
    }
}
