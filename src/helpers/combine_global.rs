//! Global (non-keyed) combiners.
//!
//! Beam-style `CombineGlobally` with an optional fanout and a lifted
//! fast-path that builds accumulators from whole partitions.
//!
//! - `combine_globally`: folds all elements `T` into a single `O` via a
//!   user-provided `CombineFn<T, A, O>`.
//! - `combine_globally_lifted`: same, but uses `LiftableCombiner::build_from_group`
//!   to construct `A` from each partition's full slice.
//!
//! Both APIs accept an optional `fanout`: during parallel execution the runner
//! reduces accumulators in rounds, merging at most `fanout` accumulators per
//! call. `Some(2)` is a binary reduction tree; `None` uses the runner default.

use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{Result, anyhow};

use crate::collection::{CombineFn, LiftableCombiner, downcast_vec};
use crate::node::{MergeFn, Node, PartitionFn};
use crate::type_token::Partition;
use crate::{PCollection, RFBound};

fn downcast_acc<A: 'static>(p: Partition, what: &str) -> Result<A> {
    p.downcast::<A>()
        .map(|b| *b)
        .map_err(|_| anyhow!("{what}: unexpected accumulator type, wanted {}", std::any::type_name::<A>()))
}

// merge: Vec<A> -> A. An empty group yields `create()`.
fn merge_fn<T, A, O, C>(comb: Arc<C>) -> MergeFn
where
    T: 'static,
    C: CombineFn<T, A, O>,
    A: Send + Sync + 'static,
    O: 'static,
{
    Arc::new(move |parts: Vec<Partition>| -> Result<Partition> {
        let mut it = parts.into_iter();
        let mut acc = match it.next() {
            Some(first) => downcast_acc::<A>(first, "combine_globally merge")?,
            None => comb.create(),
        };
        for p in it {
            comb.merge(&mut acc, downcast_acc::<A>(p, "combine_globally merge")?)?;
        }
        Ok(Box::new(acc) as Partition)
    })
}

// finish: A -> Vec<O> (singleton)
fn finish_fn<T, A, O, C>(comb: Arc<C>) -> PartitionFn
where
    T: 'static,
    C: CombineFn<T, A, O>,
    A: Send + Sync + 'static,
    O: RFBound,
{
    Arc::new(move |p: Partition| -> Result<Partition> {
        let acc = downcast_acc::<A>(p, "combine_globally finish")?;
        Ok(Box::new(vec![comb.finish(acc)?]) as Partition)
    })
}

impl<T: RFBound> PCollection<T> {
    /// Combine all elements (no key) into a single output using a [`CombineFn`].
    ///
    /// Produces exactly **one** element even for empty inputs (by calling
    /// `finish(create())`), unless `finish` itself fails.
    ///
    /// # Examples
    /// ```
    /// use ironstats::*;
    /// use ironstats::moments::LowOrderMoments;
    ///
    /// let p = Pipeline::default();
    /// let rows = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
    /// let out = from_vec(&p, rows)
    ///     .combine_globally(LowOrderMoments::new(1), Some(2))
    ///     .collect_par(None, Some(4))?;
    /// assert_eq!(out[0].n(), 4);
    /// assert_eq!(out[0].mean(), &[2.5]);
    /// # Ok::<_, anyhow::Error>(())
    /// ```
    pub fn combine_globally<C, A, O>(self, comb: C, fanout: Option<usize>) -> PCollection<O>
    where
        C: CombineFn<T, A, O> + 'static,
        A: Send + Sync + 'static,
        O: RFBound,
    {
        let comb = Arc::new(comb);

        // local: Vec<T> -> A (via create and add_input)
        let local: PartitionFn = {
            let comb = Arc::clone(&comb);
            Arc::new(move |p: Partition| -> Result<Partition> {
                let rows = downcast_vec::<T>(p, "combine_globally local")?;
                let mut acc = comb.create();
                for v in rows {
                    comb.add_input(&mut acc, v)?;
                }
                Ok(Box::new(acc) as Partition)
            })
        };

        self.attach_combine(
            local,
            merge_fn::<T, A, O, C>(Arc::clone(&comb)),
            finish_fn::<T, A, O, C>(comb),
            fanout,
        )
    }

    /// Combine all elements (no key) with a **lifted** local path.
    ///
    /// Uses [`LiftableCombiner::build_from_group`] to build each partition
    /// accumulator directly from `&[T]`.
    pub fn combine_globally_lifted<C, A, O>(self, comb: C, fanout: Option<usize>) -> PCollection<O>
    where
        C: LiftableCombiner<T, A, O> + 'static,
        A: Send + Sync + 'static,
        O: RFBound,
    {
        let comb = Arc::new(comb);

        let local: PartitionFn = {
            let comb = Arc::clone(&comb);
            Arc::new(move |p: Partition| -> Result<Partition> {
                let rows = downcast_vec::<T>(p, "combine_globally_lifted local")?;
                Ok(Box::new(comb.build_from_group(&rows)?) as Partition)
            })
        };

        self.attach_combine(
            local,
            merge_fn::<T, A, O, C>(Arc::clone(&comb)),
            finish_fn::<T, A, O, C>(comb),
            fanout,
        )
    }

    fn attach_combine<O>(
        self,
        local: PartitionFn,
        merge: MergeFn,
        finish: PartitionFn,
        fanout: Option<usize>,
    ) -> PCollection<O> {
        let id = self.pipeline.insert_node(Node::CombineGlobal { local, merge, finish, fanout });
        self.pipeline.connect(self.id, id);
        PCollection { pipeline: self.pipeline, id, _t: PhantomData }
    }
}
