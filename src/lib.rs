//! Parallel single-source shortest paths on CSR graphs.
//!
//! Three shared-memory solvers (delta-stepping, rho-stepping and a
//! frontier-based Bellman-Ford) relax edges concurrently through lock-free
//! `write_min` on an atomic distance array. A serial Dijkstra serves as the
//! verifier. The [`harness`] module drives repeated timed trials the way the
//! `sssp` binary runs them.
//!
//! ```no_run
//! use sssp_parallel::{Graph, Solver, DeltaStepping};
//!
//! let g = Graph::<u32>::from_edges(4, &[(0, 1, 1), (1, 2, 2), (0, 2, 5), (2, 3, 1)])?;
//! let dist = DeltaStepping::new(&g, 2)?.solve(0)?;
//! assert_eq!(dist, vec![0, 1, 3, 4]);
//! # Ok::<(), sssp_parallel::SsspError>(())
//! ```

pub mod atomic;
pub mod cli;
pub mod config;
pub mod distance;
pub mod error;
pub mod graph;
pub mod harness;
pub mod io;
pub mod solver;
pub mod source;

/// Vertex identifier. Graphs hold at most `u32::MAX` nodes.
pub type NodeId = u32;

pub use config::{build_solver, Algorithm, GraphInput, RunConfig};
pub use distance::Distance;
pub use error::{Result, SsspError};
pub use graph::{generate_random_graph, Graph};
pub use harness::TrialReport;
pub use solver::{BellmanFord, DeltaStepping, Dijkstra, RhoStepping, SolveStats, Solver};
pub use source::SourcePicker;
