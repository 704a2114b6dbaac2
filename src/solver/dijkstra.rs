//! Serial Dijkstra used as the ground-truth oracle for verification.

use super::{check_source, SolveStats, Solver};
use crate::distance::Distance;
use crate::error::Result;
use crate::graph::Graph;
use crate::NodeId;

#[derive(Copy, Clone)]
struct HeapItem<W> {
    node: NodeId,
    dist: W,
}

// Binary min-heap with explicit sift ops; only needs `PartialOrd`, so float
// distances work without a total-order wrapper.
struct MinHeap<W> {
    data: Vec<HeapItem<W>>,
}

impl<W: Distance> MinHeap<W> {
    #[inline]
    fn with_capacity(cap: usize) -> Self {
        Self { data: Vec::with_capacity(cap) }
    }

    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn push(&mut self, item: HeapItem<W>) {
        self.data.push(item);
        self.sift_up(self.data.len() - 1);
    }

    #[inline]
    fn pop(&mut self) -> Option<HeapItem<W>> {
        let len = self.data.len();
        if len == 0 {
            return None;
        }
        self.data.swap(0, len - 1);
        let out = self.data.pop();
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        out
    }

    #[inline]
    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.data[idx].dist < self.data[parent].dist {
                self.data.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
    }

    #[inline]
    fn sift_down(&mut self, mut idx: usize) {
        let n = self.data.len();
        loop {
            let left = idx * 2 + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            let mut best = left;
            if right < n && self.data[right].dist < self.data[left].dist {
                best = right;
            }
            if self.data[best].dist < self.data[idx].dist {
                self.data.swap(idx, best);
                idx = best;
            } else {
                break;
            }
        }
    }
}

pub struct Dijkstra<'g, W> {
    graph: &'g Graph<W>,
}

impl<'g, W: Distance> Dijkstra<'g, W> {
    pub fn new(graph: &'g Graph<W>) -> Self {
        Self { graph }
    }
}

impl<W: Distance> Solver<W> for Dijkstra<'_, W> {
    fn name(&self) -> &'static str {
        "dijkstra"
    }

    fn solve_with_stats(&self, source: NodeId) -> Result<(Vec<W>, SolveStats)> {
        let g = self.graph;
        check_source(g, source)?;
        let mut dist = vec![W::MAX; g.n];
        dist[source as usize] = W::ZERO;
        let mut heap = MinHeap::with_capacity(g.n.min(1024));
        heap.push(HeapItem { node: source, dist: W::ZERO });
        let mut stats = SolveStats::default();

        while let Some(item) = heap.pop() {
            // stale entry
            if item.dist > dist[item.node as usize] {
                continue;
            }
            stats.phases += 1;
            for (v, w) in g.neighbors(item.node) {
                let nd = item.dist.relax(w);
                if nd < dist[v as usize] {
                    dist[v as usize] = nd;
                    stats.relaxations += 1;
                    heap.push(HeapItem { node: v, dist: nd });
                    stats.max_frontier = stats.max_frontier.max(heap.len());
                }
            }
        }
        Ok((dist, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_graph() {
        let g = Graph::<f32>::from_edges(3, &[(0, 1, 1.0), (1, 2, 2.0)]).unwrap();
        assert_eq!(Dijkstra::new(&g).solve(0).unwrap(), vec![0.0, 1.0, 3.0]);
    }

    #[test]
    fn heap_pops_in_order() {
        let mut heap = MinHeap::with_capacity(8);
        for (i, d) in [5u32, 1, 4, 1, 3, 9, 0].into_iter().enumerate() {
            heap.push(HeapItem { node: i as NodeId, dist: d });
        }
        let mut popped = Vec::new();
        while let Some(item) = heap.pop() {
            popped.push(item.dist);
        }
        assert_eq!(popped, vec![0, 1, 1, 3, 4, 5, 9]);
    }

    #[test]
    fn isolated_node_stays_unreached() {
        let g = Graph::<u64>::from_edges(3, &[(0, 1, 7)]).unwrap();
        let (dist, stats) = Dijkstra::new(&g).solve_with_stats(0).unwrap();
        assert_eq!(dist, vec![0, 7, u64::MAX]);
        assert_eq!(stats.phases, 2);
        assert_eq!(stats.relaxations, 1);
    }
}
