//! Execution engine.
//!
//! The runner walks the graph back from the terminal node to its source,
//! then executes the resulting linear plan:
//!
//! - **Sequential**: the whole source is one partition, processed in order on
//!   the calling thread.
//! - **Parallel**: the source is split into contiguous partitions, consecutive
//!   stateless nodes are fused and run per partition on rayon workers, and a
//!   global combine acts as a barrier. Its per-partition accumulators are
//!   merged in rounds of at most `fanout` until one remains.
//!
//! Every node step is fallible; the first error stops the run.

use crate::node::{DynOp, MergeFn, Node};
use crate::node_id::NodeId;
use crate::pipeline::Pipeline;
use crate::type_token::Partition;
use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

/// Merge breadth used when a combine node does not set its own fanout.
pub const DEFAULT_FANOUT: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecMode {
    Sequential,
    Parallel {
        #[serde(default)]
        threads: Option<usize>,
        #[serde(default)]
        partitions: Option<usize>,
    },
}

impl Default for ExecMode {
    fn default() -> Self {
        ExecMode::Parallel { threads: None, partitions: None }
    }
}

pub struct Runner {
    pub mode: ExecMode,
    pub default_partitions: usize,
    pub default_fanout: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::default(),
            default_partitions: 2 * num_cpus::get().max(2),
            default_fanout: DEFAULT_FANOUT,
        }
    }
}

impl Runner {
    /// Execute the chain ending at `terminal` and materialize its elements.
    ///
    /// # Errors
    /// Fails if the graph is malformed, if a node reports an error, or if the
    /// terminal payload is not a `Vec<T>`.
    pub fn run_collect<T: 'static + Send + Sync + Clone>(
        &self,
        p: &Pipeline,
        terminal: NodeId,
    ) -> Result<Vec<T>> {
        let plan = linear_plan(p, terminal)?;
        debug!(nodes = plan.len(), mode = ?self.mode, "running plan");

        match self.mode {
            ExecMode::Sequential => exec_seq::<T>(plan),
            ExecMode::Parallel { threads, partitions } => {
                let parts = partitions.unwrap_or(self.default_partitions);
                match threads {
                    Some(t) => {
                        let pool = rayon::ThreadPoolBuilder::new()
                            .num_threads(t)
                            .build()
                            .context("build rayon thread pool")?;
                        pool.install(|| exec_parallel::<T>(plan, parts, self.default_fanout))
                    }
                    None => exec_parallel::<T>(plan, parts, self.default_fanout),
                }
            }
        }
    }
}

/// Linear backwalk: terminal → … → source, returned source-first.
fn linear_plan(p: &Pipeline, terminal: NodeId) -> Result<Vec<(NodeId, Node)>> {
    let (mut nodes, edges) = p.snapshot();
    let mut chain: Vec<(NodeId, Node)> = Vec::new();
    let mut cur = terminal;
    loop {
        let n = nodes.remove(&cur).ok_or_else(|| anyhow!("missing node {cur:?}"))?;
        chain.push((cur, n));
        match edges.iter().find(|(_, to)| *to == cur) {
            Some((from, _)) => cur = *from,
            None => break,
        }
    }
    chain.reverse();
    Ok(chain)
}

/// Run a fused stateless stage
fn fuse_stateless(ops: &[Arc<dyn DynOp>], input: Partition) -> Result<Partition> {
    ops.iter().try_fold(input, |acc, op| op.apply(acc))
}

fn into_terminal<T: 'static>(out: Partition) -> Result<Vec<T>> {
    out.downcast::<Vec<T>>()
        .map(|b| *b)
        .map_err(|_| anyhow!("terminal type mismatch: expected Vec<{}>", std::any::type_name::<T>()))
}

/// Sequential executor (single partition in-process)
fn exec_seq<T: 'static + Send + Sync + Clone>(plan: Vec<(NodeId, Node)>) -> Result<Vec<T>> {
    let mut buf: Option<Partition> = None;

    for (id, node) in plan {
        let kind = node.kind();
        buf = Some(match node {
            Node::Source { payload, vec_ops, elem_tag } => {
                if buf.is_some() {
                    bail!("unexpected additional source {id:?} in plan");
                }
                vec_ops
                    .clone_any(payload.as_ref())
                    .ok_or_else(|| anyhow!("source {id:?} is not a Vec<{}>", elem_tag.name))?
            }
            Node::Stateless(ops) => {
                let input = buf.take().ok_or_else(|| anyhow!("{kind} node {id:?} has no input"))?;
                fuse_stateless(&ops, input)?
            }
            Node::CombineGlobal { local, finish, .. } => {
                let input = buf.take().ok_or_else(|| anyhow!("{kind} node {id:?} has no input"))?;
                finish(local(input)?)?
            }
        });
    }

    into_terminal(buf.ok_or_else(|| anyhow!("empty plan"))?)
}

/// Parallel executor (partition source → fuse stateless per partition → barriers)
fn exec_parallel<T: 'static + Send + Sync + Clone>(
    plan: Vec<(NodeId, Node)>,
    partitions: usize,
    default_fanout: usize,
) -> Result<Vec<T>> {
    let Some(((src_id, Node::Source { payload, vec_ops, elem_tag }), rest)) = plan.split_first()
    else {
        bail!("plan must start with a Source node");
    };

    let total_len = vec_ops.len(payload.as_ref()).unwrap_or(0);
    let parts = partitions.max(1).min(total_len.max(1));
    let mut current: Vec<Partition> = vec_ops
        .split(payload.as_ref(), parts)
        .ok_or_else(|| anyhow!("source {src_id:?} is not a Vec<{}>", elem_tag.name))?;
    debug!(elements = total_len, partitions = current.len(), "split source");

    let mut i = 0usize;
    while i < rest.len() {
        match &rest[i].1 {
            Node::Stateless(_) => {
                // Collect contiguous stateless nodes and fuse them
                let mut ops: Vec<Arc<dyn DynOp>> = Vec::new();
                while let Some((_, Node::Stateless(more))) = rest.get(i) {
                    ops.extend(more.iter().cloned());
                    i += 1;
                }
                trace!(ops = ops.len(), "fused stateless stage");
                current = current
                    .into_par_iter()
                    .map(|chunk| fuse_stateless(&ops, chunk))
                    .collect::<Result<Vec<_>>>()?;
            }
            Node::CombineGlobal { local, merge, finish, fanout } => {
                let locals = current
                    .into_par_iter()
                    .map(|chunk| local(chunk))
                    .collect::<Result<Vec<_>>>()?;
                let merged = reduce_in_rounds(locals, merge, fanout.unwrap_or(default_fanout))?;
                current = vec![finish(merged)?];
                i += 1;
            }
            Node::Source { .. } => bail!("unexpected additional source {:?} in plan", rest[i].0),
        }
    }

    let mut out = Vec::<T>::new();
    for part in current {
        out.extend(into_terminal::<T>(part)?);
    }
    Ok(out)
}

/// Tree reduction: merge groups of at most `fanout` accumulators per round,
/// each round's groups in parallel, until one accumulator is left.
pub(crate) fn reduce_in_rounds(
    mut parts: Vec<Partition>,
    merge: &MergeFn,
    fanout: usize,
) -> Result<Partition> {
    let fanout = fanout.max(2);
    let mut round = 0usize;
    while parts.len() > 1 {
        let mut groups: Vec<Vec<Partition>> = Vec::with_capacity(parts.len().div_ceil(fanout));
        let mut it = parts.into_iter().peekable();
        while it.peek().is_some() {
            groups.push(it.by_ref().take(fanout).collect());
        }
        trace!(round, groups = groups.len(), fanout, "merge round");
        parts = groups.into_par_iter().map(|g| merge(g)).collect::<Result<Vec<_>>>()?;
        round += 1;
    }
    match parts.pop() {
        Some(one) => Ok(one),
        None => merge(Vec::new()),
    }
}
