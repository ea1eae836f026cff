//! Deferred collections and the combiner traits.
//!
//! A [`PCollection<T>`] is a typed handle to one node in a [`Pipeline`]
//! graph. Element-wise transforms append stateless nodes that the runner
//! fuses per partition; [`combine_globally`](PCollection::combine_globally)
//! appends a barrier that folds every partition into one output.

use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use serde::{Serialize, de::DeserializeOwned};

use crate::node::{DynOp, Node};
use crate::node_id::NodeId;
use crate::pipeline::Pipeline;
use crate::runner::{ExecMode, Runner};
use crate::table::NumericTable;
use crate::type_token::{Partition, TypeTag, vec_ops_for};

pub trait RFBound: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}
impl<T> RFBound for T where T: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}

#[derive(Clone)]
pub struct PCollection<T> {
    pub(crate) pipeline: Pipeline,
    pub(crate) id: NodeId,
    pub(crate) _t: PhantomData<T>,
}

/// Attach an in-memory vector as a source.
pub fn from_vec<T>(p: &Pipeline, data: Vec<T>) -> PCollection<T>
where
    T: RFBound,
{
    let id = p.insert_node(Node::Source {
        payload: Arc::new(data),
        vec_ops: vec_ops_for::<T>(),
        elem_tag: TypeTag::of::<T>(),
    });
    PCollection { pipeline: p.clone(), id, _t: PhantomData }
}

/// Attach a table as a row-wise source; each element is one row.
pub fn from_table(p: &Pipeline, table: &NumericTable) -> PCollection<Vec<f64>> {
    from_vec(p, table.to_rows())
}

/// Attach pre-partitioned tables; each element is one worker block.
pub fn from_partitions(p: &Pipeline, parts: Vec<NumericTable>) -> PCollection<NumericTable> {
    from_vec(p, parts)
}

pub(crate) fn downcast_vec<T: 'static>(input: Partition, what: &str) -> Result<Vec<T>> {
    input
        .downcast::<Vec<T>>()
        .map(|b| *b)
        .map_err(|_| anyhow!("{what}: expected Vec<{}>", std::any::type_name::<T>()))
}

/// ---- Stateless DynOps ----
struct MapOp<I, O, F>(F, PhantomData<(I, O)>);
impl<I, O, F> DynOp for MapOp<I, O, F>
where
    I: RFBound,
    O: RFBound,
    F: Send + Sync + Fn(&I) -> O + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let v = downcast_vec::<I>(input, "map")?;
        let out: Vec<O> = v.iter().map(|i| self.0(i)).collect();
        Ok(Box::new(out))
    }
}

struct TryMapOp<I, O, F>(F, PhantomData<(I, O)>);
impl<I, O, F> DynOp for TryMapOp<I, O, F>
where
    I: RFBound,
    O: RFBound,
    F: Send + Sync + Fn(&I) -> Result<O> + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let v = downcast_vec::<I>(input, "try_map")?;
        let out = v.iter().map(|i| self.0(i)).collect::<Result<Vec<O>>>()?;
        Ok(Box::new(out))
    }
}

struct FilterOp<T, P>(P, PhantomData<T>);
impl<T, P> DynOp for FilterOp<T, P>
where
    T: RFBound,
    P: Send + Sync + Fn(&T) -> bool + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let v = downcast_vec::<T>(input, "filter")?;
        Ok(Box::new(v.into_iter().filter(|t| self.0(t)).collect::<Vec<T>>()))
    }
}

struct FlatMapOp<I, O, F>(F, PhantomData<(I, O)>);
impl<I, O, F> DynOp for FlatMapOp<I, O, F>
where
    I: RFBound,
    O: RFBound,
    F: Send + Sync + Fn(&I) -> Vec<O> + 'static,
{
    fn apply(&self, input: Partition) -> Result<Partition> {
        let v = downcast_vec::<I>(input, "flat_map")?;
        let mut out: Vec<O> = Vec::new();
        for i in &v {
            out.extend(self.0(i));
        }
        Ok(Box::new(out))
    }
}

impl<T: RFBound> PCollection<T> {
    fn then_stateless<O>(self, op: Arc<dyn DynOp>) -> PCollection<O> {
        let id = self.pipeline.insert_node(Node::Stateless(vec![op]));
        self.pipeline.connect(self.id, id);
        PCollection { pipeline: self.pipeline, id, _t: PhantomData }
    }

    pub fn map<O, F>(self, f: F) -> PCollection<O>
    where
        O: RFBound,
        F: 'static + Send + Sync + Fn(&T) -> O,
    {
        self.then_stateless(Arc::new(MapOp::<T, O, F>(f, PhantomData)))
    }

    /// Like [`map`](Self::map), but the first `Err` aborts the whole run and
    /// is returned from the collect call.
    pub fn try_map<O, F>(self, f: F) -> PCollection<O>
    where
        O: RFBound,
        F: 'static + Send + Sync + Fn(&T) -> Result<O>,
    {
        self.then_stateless(Arc::new(TryMapOp::<T, O, F>(f, PhantomData)))
    }

    pub fn filter<F>(self, pred: F) -> PCollection<T>
    where
        F: 'static + Send + Sync + Fn(&T) -> bool,
    {
        self.then_stateless(Arc::new(FilterOp::<T, F>(pred, PhantomData)))
    }

    pub fn flat_map<O, F>(self, f: F) -> PCollection<O>
    where
        O: RFBound,
        F: 'static + Send + Sync + Fn(&T) -> Vec<O>,
    {
        self.then_stateless(Arc::new(FlatMapOp::<T, O, F>(f, PhantomData)))
    }

    /// Execute on the calling thread as a single partition.
    pub fn collect_seq(self) -> Result<Vec<T>> {
        let r = Runner { mode: ExecMode::Sequential, ..Default::default() };
        r.run_collect::<T>(&self.pipeline, self.id)
    }

    /// Execute across rayon workers.
    ///
    /// `threads` sizes a dedicated pool for this run; `partitions` overrides
    /// the runner's default split.
    pub fn collect_par(self, threads: Option<usize>, partitions: Option<usize>) -> Result<Vec<T>> {
        let r = Runner { mode: ExecMode::Parallel { threads, partitions }, ..Default::default() };
        r.run_collect::<T>(&self.pipeline, self.id)
    }

    /// Execute with an explicit runner, usually built from a
    /// [`RunnerConfig`](crate::config::RunnerConfig).
    pub fn collect_with(self, runner: &Runner) -> Result<Vec<T>> {
        runner.run_collect::<T>(&self.pipeline, self.id)
    }
}

/// Combiner contract: `create` an empty accumulator, fold inputs with
/// `add_input`, `merge` accumulators from different partitions, and `finish`
/// into the output.
///
/// `merge` must be associative and commutative; the runner merges in any
/// tree shape. Every step may fail, and the first failure aborts the run.
pub trait CombineFn<V, A, O>: Send + Sync + 'static {
    fn create(&self) -> A;
    fn add_input(&self, acc: &mut A, v: V) -> Result<()>;
    fn merge(&self, acc: &mut A, other: A) -> Result<()>;
    fn finish(&self, acc: A) -> Result<O>;
}

/// Combiners that can build an accumulator straight from a whole partition.
pub trait LiftableCombiner<V, A, O>: CombineFn<V, A, O> {
    fn build_from_group(&self, values: &[V]) -> Result<A>;
}
