//! Solver family. Every solver owns its distance array and bucket/frontier
//! state for the duration of one `solve` call; the graph is only read.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::Serialize;

use crate::atomic::AtomicArray;
use crate::distance::Distance;
use crate::error::{Result, SsspError};
use crate::graph::Graph;
use crate::NodeId;

pub mod bellman_ford;
pub mod delta_stepping;
pub mod dijkstra;
pub mod rho_stepping;

pub use bellman_ford::BellmanFord;
pub use delta_stepping::DeltaStepping;
pub use dijkstra::Dijkstra;
pub use rho_stepping::RhoStepping;

/// Per-call counters, logged at debug level by the harness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SolveStats {
    /// Phases (stepping) or rounds (Bellman-Ford) executed.
    pub phases: u64,
    /// Successful `write_min` calls.
    pub relaxations: u64,
    pub light_relaxations: u64,
    pub heavy_relaxations: u64,
    /// Distinct non-empty buckets processed (delta-stepping only).
    pub buckets_visited: u64,
    pub max_frontier: usize,
}

pub trait Solver<W: Distance>: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve_with_stats(&self, source: NodeId) -> Result<(Vec<W>, SolveStats)>;

    /// Distance from `source` to every node, `W::MAX` where unreachable.
    fn solve(&self, source: NodeId) -> Result<Vec<W>> {
        self.solve_with_stats(source).map(|(dist, _)| dist)
    }
}

pub(crate) fn check_source<W>(graph: &Graph<W>, source: NodeId) -> Result<()> {
    if source as usize >= graph.n {
        return Err(SsspError::InvalidSource { vertex: source, n: graph.n });
    }
    Ok(())
}

/// Fresh distance array: `ZERO` at the source, `MAX` elsewhere.
pub(crate) fn init_distances<W: Distance>(n: usize, source: NodeId) -> AtomicArray<W> {
    let dist = AtomicArray::filled(n, W::MAX);
    dist.set(source as usize, W::ZERO);
    dist
}

pub(crate) fn new_flags(n: usize) -> Vec<AtomicBool> {
    (0..n).into_par_iter().map(|_| AtomicBool::new(false)).collect()
}

pub(crate) fn clear_flags(flags: &[AtomicBool], nodes: &[NodeId]) {
    nodes.par_iter().for_each(|&v| flags[v as usize].store(false, Ordering::Relaxed));
}

/// Keeps the members of `nodes` whose flag was clear and sets it, so each node
/// survives once.
pub(crate) fn claim_unique(flags: &[AtomicBool], nodes: &[NodeId]) -> Vec<NodeId> {
    nodes
        .par_iter()
        .copied()
        .filter(|&v| !flags[v as usize].swap(true, Ordering::AcqRel))
        .collect()
}

pub(crate) struct Relaxed {
    /// Nodes improved this step whose flag this step set. Deduplicated.
    pub improved: Vec<NodeId>,
    pub relaxations: u64,
}

/// Relaxes, in parallel, every edge `(u, v, w)` with `u` in `nodes` and
/// `take(w)`, using `write_min` on `dist[v]`. A node is reported in `improved`
/// only by the writer that flips its flag, so the caller must clear the flags
/// of `improved` (or otherwise track them) before the next step.
pub(crate) fn relax_edges<W, F>(
    graph: &Graph<W>,
    dist: &AtomicArray<W>,
    nodes: &[NodeId],
    flags: &[AtomicBool],
    take: F,
) -> Relaxed
where
    W: Distance,
    F: Fn(W) -> bool + Sync,
{
    let (improved, relaxations) = nodes
        .par_iter()
        .fold(
            || (Vec::new(), 0u64),
            |(mut out, mut count), &u| {
                let du = dist.get(u as usize);
                for (v, w) in graph.neighbors(u) {
                    if !take(w) {
                        continue;
                    }
                    if dist.write_min(v as usize, du.relax(w)) {
                        count += 1;
                        if !flags[v as usize].swap(true, Ordering::AcqRel) {
                            out.push(v);
                        }
                    }
                }
                (out, count)
            },
        )
        .reduce(
            || (Vec::new(), 0u64),
            |(mut a, ca), (b, cb)| {
                a.extend(b);
                (a, ca + cb)
            },
        );
    Relaxed { improved, relaxations }
}
