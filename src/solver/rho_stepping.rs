//! Parallel rho-stepping.
//!
//! Instead of a fixed distance width, every phase takes roughly the `rho`
//! frontier nodes with the smallest tentative distance, relaxes all their
//! outgoing edges, and feeds improved nodes back into the frontier. The phase
//! threshold comes from a selection over the frontier keys, never a full sort.

use std::sync::atomic::Ordering;

use rayon::prelude::*;
use tracing::debug;

use super::{check_source, clear_flags, init_distances, new_flags, relax_edges, SolveStats, Solver};
use crate::distance::Distance;
use crate::error::{Result, SsspError};
use crate::graph::Graph;
use crate::NodeId;

/// Frontiers up to this size get an exact selection.
const EXACT_SELECT_LIMIT: usize = 4096;
const SAMPLE_SIZE: usize = 1024;

pub struct RhoStepping<'g, W> {
    graph: &'g Graph<W>,
    rho: usize,
}

impl<'g, W: Distance> RhoStepping<'g, W> {
    pub fn new(graph: &'g Graph<W>, rho: usize) -> Result<Self> {
        if rho == 0 {
            return Err(SsspError::InvalidParameter {
                algorithm: "rho-stepping",
                value: rho.to_string(),
                reason: "rho must be at least 1".into(),
            });
        }
        Ok(Self { graph, rho })
    }

    pub fn rho(&self) -> usize {
        self.rho
    }
}

fn by_value<W: Distance>(a: &W, b: &W) -> std::cmp::Ordering {
    a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
}

/// Distance threshold such that about `rho` of `keys` are `<=` it.
/// `keys.len()` must exceed `rho`.
fn select_threshold<W: Distance>(keys: &[W], rho: usize) -> W {
    if keys.len() <= EXACT_SELECT_LIMIT {
        let mut scratch = keys.to_vec();
        let (_, kth, _) = scratch.select_nth_unstable_by(rho - 1, by_value);
        return *kth;
    }
    // Deterministic stride sample; the rank of rho scales into the sample.
    let stride = keys.len() / SAMPLE_SIZE;
    let mut sample: Vec<W> = (0..SAMPLE_SIZE).map(|i| keys[i * stride]).collect();
    let rank = (rho * SAMPLE_SIZE / keys.len()).min(SAMPLE_SIZE - 1);
    let (_, kth, _) = sample.select_nth_unstable_by(rank, by_value);
    *kth
}

impl<W: Distance> Solver<W> for RhoStepping<'_, W> {
    fn name(&self) -> &'static str {
        "rho-stepping"
    }

    fn solve_with_stats(&self, source: NodeId) -> Result<(Vec<W>, SolveStats)> {
        let g = self.graph;
        check_source(g, source)?;
        let dist = init_distances::<W>(g.n, source);
        // Set while a node sits in the frontier.
        let in_frontier = new_flags(g.n);
        in_frontier[source as usize].store(true, Ordering::Relaxed);
        let mut frontier: Vec<NodeId> = vec![source];
        let mut stats = SolveStats::default();

        while !frontier.is_empty() {
            stats.phases += 1;
            stats.max_frontier = stats.max_frontier.max(frontier.len());

            let (active, rest) = if frontier.len() <= self.rho {
                (std::mem::take(&mut frontier), Vec::new())
            } else {
                let keys: Vec<W> = frontier.par_iter().map(|&v| dist.get(v as usize)).collect();
                let threshold = select_threshold(&keys, self.rho);
                frontier
                    .par_iter()
                    .zip(keys.par_iter())
                    .partition_map(|(&v, &d)| {
                        if d <= threshold {
                            rayon::iter::Either::Left(v)
                        } else {
                            rayon::iter::Either::Right(v)
                        }
                    })
            };

            // Leave the frontier before relaxing so a later improvement re-enters it.
            clear_flags(&in_frontier, &active);
            let relaxed = relax_edges(g, &dist, &active, &in_frontier, |_| true);
            stats.relaxations += relaxed.relaxations;

            frontier = rest;
            frontier.extend(relaxed.improved);
        }

        debug!(
            rho = self.rho,
            phases = stats.phases,
            relaxations = stats.relaxations,
            max_frontier = stats.max_frontier,
            "rho-stepping finished"
        );
        Ok((dist.to_vec(), stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diamond_distances_for_any_rho() {
        let g = Graph::<u32>::from_edges(4, &[(0, 1, 1), (1, 2, 2), (0, 2, 5), (2, 3, 1)]).unwrap();
        for rho in [1, 2, 3, 1 << 20] {
            assert_eq!(RhoStepping::new(&g, rho).unwrap().solve(0).unwrap(), vec![0, 1, 3, 4], "rho {rho}");
        }
    }

    #[test]
    fn rho_one_settles_in_distance_order() {
        // Star with distinct weights: with rho = 1 each phase handles one node.
        let edges: Vec<_> = (1..6u32).map(|v| (0, v, 10 - v)).collect();
        let g = Graph::<u32>::from_edges(6, &edges).unwrap();
        let (dist, stats) = RhoStepping::new(&g, 1).unwrap().solve_with_stats(0).unwrap();
        assert_eq!(dist, vec![0, 9, 8, 7, 6, 5]);
        assert_eq!(stats.phases, 6);
        assert_eq!(stats.max_frontier, 5);
    }

    #[test]
    fn threshold_selection() {
        let keys: Vec<u32> = (0..100).rev().collect();
        assert_eq!(select_threshold(&keys, 10), 9);
        assert_eq!(select_threshold(&keys, 1), 0);

        let big: Vec<u64> = (0..100_000u64).map(|i| (i * 7919) % 100_000).collect();
        let t = select_threshold(&big, 50_000);
        let below = big.iter().filter(|&&k| k <= t).count();
        assert!((40_000..60_000).contains(&below), "{below} keys under threshold {t}");
    }

    #[test]
    fn zero_rho_is_rejected() {
        let g = Graph::<u32>::from_edges(1, &[]).unwrap();
        assert!(matches!(RhoStepping::new(&g, 0), Err(SsspError::InvalidParameter { .. })));
    }
}
