//! Frontier-based parallel Bellman-Ford.
//!
//! Each round relaxes every outgoing edge of the frontier; the next frontier is
//! exactly the set of nodes improved during the round, each listed once.

use tracing::debug;

use super::{check_source, clear_flags, init_distances, new_flags, relax_edges, SolveStats, Solver};
use crate::distance::Distance;
use crate::error::{Result, SsspError};
use crate::graph::Graph;
use crate::NodeId;

pub struct BellmanFord<'g, W> {
    graph: &'g Graph<W>,
    round_limit: Option<usize>,
}

impl<'g, W: Distance> BellmanFord<'g, W> {
    pub fn new(graph: &'g Graph<W>) -> Self {
        Self { graph, round_limit: None }
    }

    /// Fails with `RoundLimitExceeded` instead of running more than `limit` rounds.
    pub fn with_round_limit(graph: &'g Graph<W>, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(SsspError::InvalidParameter {
                algorithm: "bellman-ford",
                value: limit.to_string(),
                reason: "round limit must be at least 1".into(),
            });
        }
        Ok(Self { graph, round_limit: Some(limit) })
    }

    /// With non-negative weights the frontier empties after at most `n` rounds
    /// (`n - 1` improving rounds plus one that finds nothing).
    fn effective_limit(&self) -> usize {
        let natural = self.graph.n.max(1);
        self.round_limit.map_or(natural, |l| l.min(natural))
    }
}

impl<W: Distance> Solver<W> for BellmanFord<'_, W> {
    fn name(&self) -> &'static str {
        "bellman-ford"
    }

    fn solve_with_stats(&self, source: NodeId) -> Result<(Vec<W>, SolveStats)> {
        let g = self.graph;
        check_source(g, source)?;
        let limit = self.effective_limit();
        let dist = init_distances::<W>(g.n, source);
        let flags = new_flags(g.n);
        let mut frontier: Vec<NodeId> = vec![source];
        let mut stats = SolveStats::default();

        while !frontier.is_empty() {
            if stats.phases as usize >= limit {
                return Err(SsspError::RoundLimitExceeded { limit, frontier: frontier.len() });
            }
            stats.phases += 1;
            stats.max_frontier = stats.max_frontier.max(frontier.len());
            clear_flags(&flags, &frontier);
            let relaxed = relax_edges(g, &dist, &frontier, &flags, |_| true);
            stats.relaxations += relaxed.relaxations;
            frontier = relaxed.improved;
        }

        debug!(rounds = stats.phases, relaxations = stats.relaxations, "bellman-ford finished");
        Ok((dist.to_vec(), stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: u32) -> Graph<u32> {
        let edges: Vec<_> = (0..n - 1).map(|u| (u, u + 1, 1)).collect();
        Graph::from_edges(n as usize, &edges).unwrap()
    }

    #[test]
    fn diamond() {
        let g = Graph::<u32>::from_edges(4, &[(0, 1, 1), (1, 2, 2), (0, 2, 5), (2, 3, 1)]).unwrap();
        assert_eq!(BellmanFord::new(&g).solve(0).unwrap(), vec![0, 1, 3, 4]);
    }

    #[test]
    fn path_needs_n_rounds() {
        let g = path(6);
        let (dist, stats) = BellmanFord::new(&g).solve_with_stats(0).unwrap();
        assert_eq!(dist, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(stats.phases, 6);
        assert_eq!(stats.max_frontier, 1);
    }

    #[test]
    fn round_cap_is_reported_not_truncated() {
        let g = path(6);
        let err = BellmanFord::with_round_limit(&g, 3).unwrap().solve(0).unwrap_err();
        assert!(matches!(err, SsspError::RoundLimitExceeded { limit: 3, frontier: 1 }));
        assert!(BellmanFord::with_round_limit(&g, 6).unwrap().solve(0).is_ok());
        // caps above n are clamped but never hit
        assert!(BellmanFord::with_round_limit(&g, 100).unwrap().solve(0).is_ok());
        assert!(BellmanFord::with_round_limit(&g, 0).is_err());
    }

    #[test]
    fn cycle_converges() {
        let g = Graph::<u32>::from_edges(3, &[(0, 1, 2), (1, 2, 2), (2, 0, 2), (2, 1, 1)]).unwrap();
        assert_eq!(BellmanFord::new(&g).solve(1).unwrap(), vec![4, 0, 2]);
    }
}
