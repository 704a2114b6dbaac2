//! Parallel delta-stepping (Meyer & Sanders).
//!
//! Buckets hold nodes keyed by `floor(dist / delta)`. The lowest non-empty
//! bucket `i` is drained in phases: each phase relaxes the light edges
//! (`w <= delta`) of the drained nodes, and any node improved back into bucket
//! `i` is picked up by the next phase. Once bucket `i` stays empty the heavy
//! edges (`w > delta`) of every node settled in it are relaxed once; those can
//! only land in buckets above `i`.
//!
//! Entries are never removed from a bucket when a node moves to a lower one.
//! A drained entry is dropped instead if its node's current bucket differs.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::debug;

use super::{check_source, claim_unique, clear_flags, init_distances, new_flags, relax_edges, SolveStats, Solver};
use crate::atomic::AtomicArray;
use crate::distance::Distance;
use crate::error::{Result, SsspError};
use crate::graph::Graph;
use crate::NodeId;

pub struct DeltaStepping<'g, W> {
    graph: &'g Graph<W>,
    delta: W,
}

impl<'g, W: Distance> DeltaStepping<'g, W> {
    pub fn new(graph: &'g Graph<W>, delta: W) -> Result<Self> {
        if !delta.is_valid_step() {
            return Err(SsspError::InvalidParameter {
                algorithm: "delta-stepping",
                value: delta.to_string(),
                reason: "delta must be positive and finite".into(),
            });
        }
        Ok(Self { graph, delta })
    }

    pub fn delta(&self) -> W {
        self.delta
    }

    /// Moves `nodes` into the bucket of their current distance. Called after
    /// the relaxation barrier, so buckets reflect a consistent snapshot.
    fn distribute(&self, buckets: &mut BTreeMap<usize, Vec<NodeId>>, dist: &AtomicArray<W>, nodes: &[NodeId]) {
        let keyed: Vec<(usize, NodeId)> = nodes
            .par_iter()
            .map(|&v| (dist.get(v as usize).bucket(self.delta), v))
            .collect();
        for (b, v) in keyed {
            buckets.entry(b).or_default().push(v);
        }
    }
}

impl<W: Distance> Solver<W> for DeltaStepping<'_, W> {
    fn name(&self) -> &'static str {
        "delta-stepping"
    }

    fn solve_with_stats(&self, source: NodeId) -> Result<(Vec<W>, SolveStats)> {
        let g = self.graph;
        check_source(g, source)?;
        let delta = self.delta;
        let dist = init_distances::<W>(g.n, source);
        // `queued` dedups within a step; `settled` dedups a bucket's settled set.
        let queued = new_flags(g.n);
        let settled = new_flags(g.n);
        let mut buckets: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
        buckets.insert(0, vec![source]);
        let mut stats = SolveStats::default();

        while let Some(&i) = buckets.keys().next() {
            stats.buckets_visited += 1;
            let mut settled_here: Vec<NodeId> = Vec::new();

            while let Some(drained) = buckets.remove(&i) {
                let live: Vec<NodeId> = drained
                    .into_par_iter()
                    .filter(|&v| dist.get(v as usize).bucket(delta) == i)
                    .collect();
                let frontier = claim_unique(&queued, &live);
                clear_flags(&queued, &frontier);
                if frontier.is_empty() {
                    continue;
                }
                stats.phases += 1;
                stats.max_frontier = stats.max_frontier.max(frontier.len());
                settled_here.extend(claim_unique(&settled, &frontier));

                let light = relax_edges(g, &dist, &frontier, &queued, |w| w <= delta);
                stats.relaxations += light.relaxations;
                stats.light_relaxations += light.relaxations;
                clear_flags(&queued, &light.improved);
                self.distribute(&mut buckets, &dist, &light.improved);
            }

            let heavy = relax_edges(g, &dist, &settled_here, &queued, |w| w > delta);
            stats.relaxations += heavy.relaxations;
            stats.heavy_relaxations += heavy.relaxations;
            clear_flags(&queued, &heavy.improved);
            clear_flags(&settled, &settled_here);
            self.distribute(&mut buckets, &dist, &heavy.improved);
        }

        debug!(
            delta = %delta,
            buckets = stats.buckets_visited,
            phases = stats.phases,
            light = stats.light_relaxations,
            heavy = stats.heavy_relaxations,
            "delta-stepping finished"
        );
        Ok((dist.to_vec(), stats))
    }
}
