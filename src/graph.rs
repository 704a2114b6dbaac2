//! Immutable compressed-sparse-row graph.
//!
//! The edges of node `v` occupy `edges[offsets[v]..offsets[v + 1]]`, with
//! `weights` aligned to `edges`. Once built the graph is read-only and can be
//! shared by any number of concurrent solves.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::distance::Distance;
use crate::error::{Result, SsspError};
use crate::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub struct Graph<W> {
    pub n: usize,
    pub m: usize,
    pub offsets: Vec<usize>,
    pub edges: Vec<NodeId>,
    pub weights: Vec<W>,
    pub symmetrized: bool,
    pub weighted: bool,
}

impl<W: Distance> Graph<W> {
    /// Builds a graph from raw CSR arrays, checking every structural invariant.
    /// `weights == None` fills unit weights and marks the graph unweighted.
    pub fn from_csr(
        offsets: Vec<usize>,
        edges: Vec<NodeId>,
        weights: Option<Vec<W>>,
        symmetrized: bool,
    ) -> Result<Self> {
        if offsets.is_empty() {
            return Err(SsspError::MalformedGraph("offsets array is empty".into()));
        }
        let n = offsets.len() - 1;
        let m = edges.len();
        if offsets[0] != 0 {
            return Err(SsspError::MalformedGraph(format!("offsets[0] is {}, expected 0", offsets[0])));
        }
        if offsets[n] != m {
            return Err(SsspError::MalformedGraph(format!("offsets[n] is {} but there are {m} edges", offsets[n])));
        }
        if let Some(v) = offsets.windows(2).position(|w| w[0] > w[1]) {
            return Err(SsspError::MalformedGraph(format!("offsets decrease at node {v}")));
        }
        if let Some(&bad) = edges.par_iter().find_any(|&&d| d as usize >= n) {
            return Err(SsspError::MalformedGraph(format!("edge destination {bad} out of range (n = {n})")));
        }
        let weighted = weights.is_some();
        let weights = match weights {
            Some(w) if w.len() != m => {
                return Err(SsspError::MalformedGraph(format!("{} weights for {m} edges", w.len())));
            }
            Some(w) => w,
            None => vec![W::from_u64(1); m],
        };
        Ok(Self { n, m, offsets, edges, weights, symmetrized, weighted })
    }

    /// Builds a weighted graph from an edge list; each node's edges are sorted by destination.
    pub fn from_edges(n: usize, edge_list: &[(NodeId, NodeId, W)]) -> Result<Self> {
        let mut sorted: Vec<(NodeId, NodeId, W)> = edge_list.to_vec();
        if let Some(&(u, v, _)) = sorted.iter().find(|&&(u, v, _)| u as usize >= n || v as usize >= n) {
            return Err(SsspError::MalformedGraph(format!("edge ({u}, {v}) out of range (n = {n})")));
        }
        sorted.par_sort_unstable_by_key(|&(u, v, _)| (u, v));
        let mut offsets = vec![0usize; n + 1];
        for &(u, _, _) in &sorted {
            offsets[u as usize + 1] += 1;
        }
        for i in 0..n {
            offsets[i + 1] += offsets[i];
        }
        let edges = sorted.iter().map(|&(_, v, _)| v).collect();
        let weights = sorted.iter().map(|&(_, _, w)| w).collect();
        Self::from_csr(offsets, edges, Some(weights), false)
    }

    #[inline]
    pub fn degree(&self, v: NodeId) -> usize {
        let v = v as usize;
        self.offsets[v + 1] - self.offsets[v]
    }

    /// `(destination, weight)` pairs of `v`'s outgoing edges.
    #[inline]
    pub fn neighbors(&self, v: NodeId) -> impl Iterator<Item = (NodeId, W)> + '_ {
        let range = self.offsets[v as usize]..self.offsets[v as usize + 1];
        self.edges[range.clone()].iter().copied().zip(self.weights[range].iter().copied())
    }

    pub fn max_degree(&self) -> usize {
        (0..self.n).into_par_iter().map(|v| self.degree(v as NodeId)).max().unwrap_or(0)
    }

    /// Every `(u, v, w)` has a matching `(v, u, w)`.
    pub fn is_symmetric(&self) -> bool {
        (0..self.n as NodeId).into_par_iter().all(|u| {
            self.neighbors(u).all(|(v, w)| self.neighbors(v).any(|(x, wx)| x == u && wx == w))
        })
    }

    /// Adds the reverse of every edge. Parallel edges collapse to the lightest one,
    /// so both directions of a pair carry the same weight.
    pub fn symmetrize(&self) -> Result<Self> {
        let mut pairs: Vec<(NodeId, NodeId, W)> = (0..self.n as NodeId)
            .into_par_iter()
            .flat_map_iter(|u| self.neighbors(u).flat_map(move |(v, w)| [(u, v, w), (v, u, w)]))
            .filter(|&(u, v, _)| u != v)
            .collect();
        pairs.par_sort_unstable_by(|a, b| {
            (a.0, a.1).cmp(&(b.0, b.1)).then(a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
        });
        pairs.dedup_by_key(|&mut (u, v, _)| (u, v));
        let mut g = Self::from_edges(self.n, &pairs)?;
        g.symmetrized = true;
        g.weighted = self.weighted;
        Ok(g)
    }

    /// Replaces all weights with uniform integers in `[lo, hi)`. The weight of an
    /// edge depends only on its unordered endpoint pair and `seed`.
    pub fn generate_random_weights(&mut self, lo: u64, hi: u64, seed: u64) {
        let hi = hi.max(lo + 1);
        let offsets = &self.offsets;
        let edges = &self.edges;
        self.weights.par_iter_mut().enumerate().for_each(|(e, w)| {
            // owner of edge e: last node whose offset is <= e
            let u = offsets.partition_point(|&o| o <= e) - 1;
            let v = edges[e] as u64;
            let (a, b) = if (u as u64) < v { (u as u64, v) } else { (v, u as u64) };
            let mut rng = SmallRng::seed_from_u64(seed ^ (a << 32 | b).wrapping_mul(0x9E37_79B9_7F4A_7C15));
            *w = W::from_u64(rng.gen_range(lo..hi));
        });
        self.weighted = true;
    }
}

/// Random directed graph with `degree` out-edges per node (self loops dropped,
/// duplicates merged). Weights are unit until [`Graph::generate_random_weights`].
pub fn generate_random_graph<W: Distance>(n: usize, degree: usize, seed: u64, symmetrized: bool) -> Result<Graph<W>> {
    if n == 0 {
        return Err(SsspError::MalformedGraph("random graph needs at least one node".into()));
    }
    let mut pairs: Vec<(NodeId, NodeId, W)> = (0..n as NodeId)
        .into_par_iter()
        .flat_map_iter(|u| {
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(u as u64).wrapping_mul(0x2545_F491_4F6C_DD1D));
            (0..degree)
                .map(move |_| (u, rng.gen_range(0..n as NodeId), W::from_u64(1)))
                .collect::<Vec<_>>()
        })
        .filter(|&(u, v, _)| u != v)
        .collect();
    pairs.par_sort_unstable_by_key(|&(u, v, _)| (u, v));
    pairs.dedup_by_key(|&mut (u, v, _)| (u, v));
    let mut g = Graph::from_edges(n, &pairs)?;
    g.weighted = false;
    if symmetrized {
        g = g.symmetrize()?;
    }
    Ok(g)
}
