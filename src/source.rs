//! Source selection for repeated trials: a fixed vertex, a list loaded from a
//! file, or uniform random non-isolated vertices.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

use crate::distance::Distance;
use crate::error::{Result, SsspError};
use crate::graph::Graph;
use crate::NodeId;

pub const DEFAULT_SEED: u64 = 27491095;

/// Uniform integers in `[0, max_value]` from a raw 64-bit generator, rejecting
/// draws from the incomplete top block so the modulo is unbiased.
#[derive(Debug, Clone)]
pub struct UniformNode {
    no_mod: bool,
    modulus: u64,
    cutoff: u64,
}

impl UniformNode {
    pub fn new(max_value: u64) -> Self {
        let no_mod = max_value == u64::MAX;
        let modulus = max_value.wrapping_add(1);
        let (cutoff, modulus) = if no_mod {
            (0, 0)
        } else {
            let remainder_sub_1 = u64::MAX % modulus;
            let cutoff = if remainder_sub_1 == modulus - 1 { 0 } else { u64::MAX - remainder_sub_1 };
            (cutoff, modulus)
        };
        Self { no_mod, modulus, cutoff }
    }

    pub fn sample<R: RngCore>(&self, rng: &mut R) -> u64 {
        let mut x = rng.next_u64();
        if self.no_mod {
            return x;
        }
        if self.cutoff != 0 {
            while x >= self.cutoff {
                x = rng.next_u64();
            }
        }
        x % self.modulus
    }
}

#[derive(Debug)]
enum Policy {
    Fixed(NodeId),
    List { sources: Vec<NodeId>, cursor: usize },
    Random { rng: SmallRng, uniform: UniformNode, max_attempts: usize, has_candidate: bool },
}

#[derive(Debug)]
pub struct SourcePicker<'g, W> {
    graph: &'g Graph<W>,
    policy: Policy,
}

impl<'g, W: Distance> SourcePicker<'g, W> {
    pub fn fixed(graph: &'g Graph<W>, source: NodeId) -> Self {
        Self { graph, policy: Policy::Fixed(source) }
    }

    pub fn from_list(graph: &'g Graph<W>, sources: Vec<NodeId>) -> Self {
        Self { graph, policy: Policy::List { sources, cursor: 0 } }
    }

    pub fn random(graph: &'g Graph<W>, seed: u64) -> Self {
        let n = graph.n;
        let has_candidate = (0..n).any(|v| graph.degree(v as NodeId) > 0);
        Self {
            graph,
            policy: Policy::Random {
                rng: SmallRng::seed_from_u64(seed),
                uniform: UniformNode::new(n.saturating_sub(1) as u64),
                max_attempts: n.saturating_mul(64).max(1024),
                has_candidate,
            },
        }
    }

    /// Fixed source if given, else the file list, else random.
    pub fn new(graph: &'g Graph<W>, fixed: Option<NodeId>, list: Option<Vec<NodeId>>, seed: u64) -> Self {
        match (fixed, list) {
            (Some(s), _) => Self::fixed(graph, s),
            (None, Some(list)) if !list.is_empty() => Self::from_list(graph, list),
            _ => Self::random(graph, seed),
        }
    }

    pub fn pick_next(&mut self) -> Result<NodeId> {
        let n = self.graph.n;
        let graph = self.graph;
        let s = match &mut self.policy {
            Policy::Fixed(s) => *s,
            Policy::List { sources, cursor } => {
                let s = *sources.get(*cursor).ok_or(SsspError::OutOfSources {
                    requested: *cursor + 1,
                    available: sources.len(),
                })?;
                *cursor += 1;
                s
            }
            Policy::Random { rng, uniform, max_attempts, has_candidate } => {
                if !*has_candidate {
                    return Err(SsspError::NoValidSource { attempts: 0 });
                }
                let mut found = None;
                for _ in 0..*max_attempts {
                    let s = uniform.sample(rng) as NodeId;
                    if graph.degree(s) > 0 {
                        found = Some(s);
                        break;
                    }
                }
                found.ok_or(SsspError::NoValidSource { attempts: *max_attempts })?
            }
        };
        if s as usize >= n {
            return Err(SsspError::InvalidSource { vertex: s, n });
        }
        Ok(s)
    }
}
