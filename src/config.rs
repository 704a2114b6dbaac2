//! Run configuration consumed by the harness. The CLI parses into this; the
//! library never reads the environment itself.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::distance::Distance;
use crate::error::{Result, SsspError};
use crate::graph::Graph;
use crate::io::SourceFormat;
use crate::solver::{BellmanFord, DeltaStepping, RhoStepping, Solver};
use crate::source::DEFAULT_SEED;
use crate::NodeId;

pub const DEFAULT_ROUNDS: usize = 22;
pub const DEFAULT_SOURCES: usize = 1;
pub const DEFAULT_RHO: usize = 1 << 20;
pub const DEFAULT_DELTA: u64 = 1 << 15;
pub const LOG2_WEIGHT: u32 = 18;
pub const WEIGHT_RANGE: u64 = 1 << LOG2_WEIGHT;
pub const DEFAULT_RANDOM_NODES: usize = 1 << 16;
pub const DEFAULT_RANDOM_DEGREE: usize = 8;
pub const DEFAULT_DUMP_PATH: &str = "sssp.out";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    RhoStepping,
    DeltaStepping,
    BellmanFord,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::RhoStepping => "rho-stepping",
            Algorithm::DeltaStepping => "delta-stepping",
            Algorithm::BellmanFord => "bellman-ford",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = SsspError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "rho-stepping" => Ok(Algorithm::RhoStepping),
            "delta-stepping" => Ok(Algorithm::DeltaStepping),
            "bellman-ford" => Ok(Algorithm::BellmanFord),
            other => Err(SsspError::UnknownAlgorithm(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphInput {
    File(PathBuf),
    Random { nodes: usize, degree: usize },
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: GraphInput,
    pub algorithm: Algorithm,
    /// Raw `-p` value; its meaning depends on the algorithm.
    pub parameter: Option<String>,
    pub symmetrized: bool,
    pub verify: bool,
    pub dump: Option<PathBuf>,
    pub sources: usize,
    pub rounds: usize,
    pub sources_file: Option<PathBuf>,
    pub sources_format: SourceFormat,
    pub fixed_source: Option<NodeId>,
    pub seed: u64,
    /// Random weights are drawn from `[1, weight_max)` when the input is unweighted.
    pub weight_max: u64,
    pub json_report: Option<PathBuf>,
    pub save_graph: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: GraphInput::Random { nodes: DEFAULT_RANDOM_NODES, degree: DEFAULT_RANDOM_DEGREE },
            algorithm: Algorithm::default(),
            parameter: None,
            symmetrized: false,
            verify: false,
            dump: None,
            sources: DEFAULT_SOURCES,
            rounds: DEFAULT_ROUNDS,
            sources_file: None,
            sources_format: SourceFormat::Text,
            fixed_source: None,
            seed: DEFAULT_SEED,
            weight_max: WEIGHT_RANGE,
            json_report: None,
            save_graph: None,
        }
    }
}

impl RunConfig {
    pub fn input_label(&self) -> String {
        match &self.input {
            GraphInput::File(p) => p.display().to_string(),
            GraphInput::Random { .. } => "random".to_string(),
        }
    }
}

/// Builds the solver for `algorithm`, interpreting `parameter` as rho,
/// delta, or a Bellman-Ford round cap. `None` selects the default.
pub fn build_solver<'g, W: Distance>(
    graph: &'g Graph<W>,
    algorithm: Algorithm,
    parameter: Option<&str>,
) -> Result<Box<dyn Solver<W> + 'g>> {
    let invalid = |value: &str, reason: &str| SsspError::InvalidParameter {
        algorithm: algorithm.as_str(),
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let solver: Box<dyn Solver<W> + 'g> = match algorithm {
        Algorithm::RhoStepping => {
            let rho = match parameter {
                Some(p) => p.trim().parse::<usize>().map_err(|_| invalid(p, "expected a positive integer"))?,
                None => DEFAULT_RHO,
            };
            Box::new(RhoStepping::new(graph, rho)?)
        }
        Algorithm::DeltaStepping => {
            let delta = match parameter {
                Some(p) => W::parse_param(p).ok_or_else(|| invalid(p, "expected a positive number"))?,
                None => W::from_u64(DEFAULT_DELTA),
            };
            Box::new(DeltaStepping::new(graph, delta)?)
        }
        Algorithm::BellmanFord => match parameter {
            Some(p) => {
                let cap = p.trim().parse::<usize>().map_err(|_| invalid(p, "expected a round count"))?;
                Box::new(BellmanFord::with_round_limit(graph, cap)?)
            }
            None => Box::new(BellmanFord::new(graph)),
        },
    };
    Ok(solver)
}
