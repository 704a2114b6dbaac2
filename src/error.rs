//! Error taxonomy shared by the library and the `sssp` binary.

use std::path::PathBuf;

use crate::NodeId;

pub type Result<T> = std::result::Result<T, SsspError>;

#[derive(Debug, thiserror::Error)]
pub enum SsspError {
    #[error("unknown algorithm `{0}` (expected rho-stepping, delta-stepping or bellman-ford)")]
    UnknownAlgorithm(String),

    #[error("invalid parameter `{value}` for {algorithm}: {reason}")]
    InvalidParameter {
        algorithm: &'static str,
        value: String,
        reason: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed graph: {0}")]
    MalformedGraph(String),

    #[error("malformed sources file {}: {reason}", path.display())]
    MalformedSources { path: PathBuf, reason: String },

    #[error("malformed distance file {}: {reason}", path.display())]
    MalformedDistances { path: PathBuf, reason: String },

    #[error("source {vertex} is out of range for a graph with {n} nodes")]
    InvalidSource { vertex: NodeId, n: usize },

    #[error("source list exhausted: trial {requested} requested but only {available} sources were loaded")]
    OutOfSources { requested: usize, available: usize },

    #[error("no valid source: no vertex with non-zero degree found after {attempts} draws")]
    NoValidSource { attempts: usize },

    #[error("bellman-ford did not converge within {limit} rounds ({frontier} nodes still active)")]
    RoundLimitExceeded { limit: usize, frontier: usize },

    #[error("verification failed for source {root}: node {node} expected {expected}, got {actual} ({mismatches} mismatching nodes)")]
    VerificationFailed {
        root: NodeId,
        node: NodeId,
        expected: String,
        actual: String,
        mismatches: usize,
    },

    #[error("failed to encode report: {0}")]
    Report(#[from] serde_json::Error),
}

impl SsspError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SsspError::Io {
            path: path.into(),
            source,
        }
    }
}
