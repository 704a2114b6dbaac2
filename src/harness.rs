//! Benchmark loop: load or generate the graph, pick sources, time repeated
//! solves, optionally verify against Dijkstra and dump the distances.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{build_solver, GraphInput, RunConfig};
use crate::distance::Distance;
use crate::error::{Result, SsspError};
use crate::graph::{generate_random_graph, Graph};
use crate::io::{dump_distances, read_graph, read_sources, write_graph};
use crate::solver::{Dijkstra, Solver};
use crate::source::SourcePicker;
use crate::NodeId;

const STDOUT: &str = "<stdout>";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialReport<W> {
    pub source: NodeId,
    pub round_seconds: Vec<f64>,
    pub average_seconds: f64,
    /// Largest finite distance; `None` only if nothing is reached.
    pub longest_distance: Option<W>,
    pub reached: usize,
    pub verified: bool,
}

/// Reads or generates the input graph. Unweighted inputs get random integer
/// weights in `[1, weight_max)`.
pub fn load_graph<W: Distance>(cfg: &RunConfig) -> Result<Graph<W>> {
    let mut graph = match &cfg.input {
        GraphInput::File(path) => read_graph::<W>(path, cfg.symmetrized)?,
        GraphInput::Random { nodes, degree } => {
            info!(nodes, degree, seed = cfg.seed, "generating random graph");
            generate_random_graph::<W>(*nodes, *degree, cfg.seed, cfg.symmetrized)?
        }
    };
    if cfg.symmetrized && !graph.is_symmetric() {
        warn!("input was marked symmetrized but has unmatched edges");
    }
    if !graph.weighted {
        info!(max = cfg.weight_max, "input is unweighted, generating random weights");
        graph.generate_random_weights(1, cfg.weight_max, cfg.seed);
    }
    if let Some(path) = &cfg.save_graph {
        write_graph(path, &graph)?;
        info!(path = %path.display(), "graph saved");
    }
    Ok(graph)
}

/// Compares `actual` against the Dijkstra distances in `expected`.
pub fn verify_distances<W: Distance>(root: NodeId, expected: &[W], actual: &[W]) -> Result<()> {
    let mismatches: Vec<usize> = expected
        .par_iter()
        .zip(actual.par_iter())
        .enumerate()
        .filter(|(_, (e, a))| !e.approx_eq(**a))
        .map(|(i, _)| i)
        .collect();
    match mismatches.first() {
        None if expected.len() == actual.len() => Ok(()),
        None => Err(SsspError::VerificationFailed {
            root,
            node: expected.len().min(actual.len()) as NodeId,
            expected: format!("{} entries", expected.len()),
            actual: format!("{} entries", actual.len()),
            mismatches: expected.len().abs_diff(actual.len()),
        }),
        Some(&node) => Err(SsspError::VerificationFailed {
            root,
            node: node as NodeId,
            expected: expected[node].to_string(),
            actual: actual[node].to_string(),
            mismatches: mismatches.len(),
        }),
    }
}

fn longest_and_reached<W: Distance>(dist: &[W]) -> (Option<W>, usize) {
    let reached = dist.par_iter().filter(|d| d.is_reached()).count();
    let longest = dist
        .par_iter()
        .copied()
        .filter(|d| d.is_reached())
        .reduce_with(|a, b| if b > a { b } else { a });
    (longest, reached)
}

/// Runs every trial source `cfg.rounds` times and prints per-round timings
/// and a summary to `out`.
pub fn run_trials<W: Distance>(
    graph: &Graph<W>,
    solver: &dyn Solver<W>,
    picker: &mut SourcePicker<'_, W>,
    cfg: &RunConfig,
    out: &mut dyn Write,
) -> Result<Vec<TrialReport<W>>> {
    let rounds = if cfg.rounds == 0 {
        warn!("rounds must be at least 1, running one round");
        1
    } else {
        cfg.rounds
    };
    let mut reports = Vec::with_capacity(cfg.sources);
    let mut last: Option<Vec<W>> = None;

    for trial in 0..cfg.sources {
        let source = picker.pick_next()?;
        writeln!(out, "source: {source}").map_err(|e| SsspError::io(STDOUT, e))?;
        let mut round_seconds = Vec::with_capacity(rounds);
        let mut dist = Vec::new();
        for round in 0..rounds {
            let start = Instant::now();
            let (d, stats) = solver.solve_with_stats(source)?;
            let secs = start.elapsed().as_secs_f64();
            debug!(trial, round, solver = solver.name(), ?stats, "solve finished");
            writeln!(out, "Round {round}: {secs:.6}").map_err(|e| SsspError::io(STDOUT, e))?;
            round_seconds.push(secs);
            dist = d;
        }
        let average_seconds = round_seconds.iter().sum::<f64>() / round_seconds.len() as f64;
        let (longest_distance, reached) = longest_and_reached(&dist);
        writeln!(out, "Average time: {average_seconds:.6}").map_err(|e| SsspError::io(STDOUT, e))?;
        let longest = match longest_distance {
            Some(d) => writeln!(out, "Longest distance: {d}"),
            None => writeln!(out, "Longest distance: -"),
        };
        longest.map_err(|e| SsspError::io(STDOUT, e))?;
        writeln!(out, "Reached nodes: {reached}\n").map_err(|e| SsspError::io(STDOUT, e))?;

        let verified = if cfg.verify {
            let expected = Dijkstra::new(graph).solve(source)?;
            verify_distances(source, &expected, &dist)?;
            info!(source, "verification passed");
            true
        } else {
            false
        };
        reports.push(TrialReport { source, round_seconds, average_seconds, longest_distance, reached, verified });
        last = Some(dist);
    }

    if let (Some(path), Some(dist)) = (&cfg.dump, &last) {
        dump_distances(path, dist)?;
        info!(path = %path.display(), "distances written");
    }
    Ok(reports)
}

pub fn write_report<W: Distance>(path: &Path, reports: &[TrialReport<W>]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SsspError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(reports)?;
    fs::write(path, json).map_err(|e| SsspError::io(path, e))
}

/// Full run as driven by the `sssp` binary.
pub fn run<W: Distance>(cfg: &RunConfig, out: &mut dyn Write) -> Result<Vec<TrialReport<W>>> {
    let graph = load_graph::<W>(cfg)?;
    writeln!(out, "Running on {}: |V|={}, |E|={}\n", cfg.input_label(), graph.n, graph.m)
        .map_err(|e| SsspError::io(STDOUT, e))?;

    let list = match &cfg.sources_file {
        Some(path) => Some(read_sources(path, cfg.sources_format)?),
        None => None,
    };
    let mut picker = SourcePicker::new(&graph, cfg.fixed_source, list, cfg.seed);
    let solver = build_solver(&graph, cfg.algorithm, cfg.parameter.as_deref())?;
    info!(algorithm = %cfg.algorithm, sources = cfg.sources, rounds = cfg.rounds, "starting trials");

    let reports = run_trials(&graph, solver.as_ref(), &mut picker, cfg, out)?;
    if let Some(path) = &cfg.json_report {
        write_report(path, &reports)?;
        info!(path = %path.display(), "report written");
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Algorithm;
    use crate::io::read_distances;

    fn diamond_file(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("diamond.adj");
        let g = Graph::<u32>::from_edges(4, &[(0, 1, 1), (1, 2, 2), (0, 2, 5), (2, 3, 1)]).unwrap();
        write_graph(&path, &g).unwrap();
        path
    }

    #[test]
    fn verify_reports_first_mismatch() {
        assert!(verify_distances(0, &[0u32, 1, 3], &[0, 1, 3]).is_ok());
        let err = verify_distances(2, &[0u32, 1, 3, 4], &[0, 2, 3, 5]).unwrap_err();
        match err {
            SsspError::VerificationFailed { root, node, expected, actual, mismatches } => {
                assert_eq!((root, node, mismatches), (2, 1, 2));
                assert_eq!((expected.as_str(), actual.as_str()), ("1", "2"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(verify_distances(0, &[0u32, 1], &[0]).is_err());
        assert!(verify_distances(0, &[0.0f32, 0.1 + 0.2], &[0.0, 0.3]).is_ok());
    }

    #[test]
    fn longest_ignores_unreached() {
        assert_eq!(longest_and_reached(&[0u32, 7, u32::MAX, 3]), (Some(7), 3));
        assert_eq!(longest_and_reached::<u32>(&[]), (None, 0));
    }

    #[test]
    fn fixed_source_run_prints_rounds_and_dumps() {
        let dir = tempfile::tempdir().unwrap();
        let dump = dir.path().join("sssp.out");
        let cfg = RunConfig {
            input: GraphInput::File(diamond_file(dir.path())),
            algorithm: Algorithm::DeltaStepping,
            parameter: Some("2".into()),
            verify: true,
            dump: Some(dump.clone()),
            sources: 2,
            rounds: 3,
            fixed_source: Some(0),
            json_report: Some(dir.path().join("reports/run.json")),
            ..RunConfig::default()
        };
        let mut out = Vec::new();
        let reports = run::<u32>(&cfg, &mut out).unwrap();
        assert_eq!(reports.len(), 2);
        for r in &reports {
            assert_eq!(r.source, 0);
            assert_eq!(r.round_seconds.len(), 3);
            assert_eq!(r.longest_distance, Some(4));
            assert_eq!(r.reached, 4);
            assert!(r.verified);
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Running on "));
        assert!(text.contains("|V|=4, |E|=4"));
        assert_eq!(text.matches("Round ").count(), 6);
        assert_eq!(read_distances::<u32>(&dump).unwrap(), vec![0, 1, 3, 4]);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("reports/run.json")).unwrap()).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(2));
        assert_eq!(json[0]["longest_distance"], 4);
    }

    #[test]
    fn source_list_shorter_than_trials_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sources = dir.path().join("sources.txt");
        fs::write(&sources, "1\n").unwrap();
        let cfg = RunConfig {
            input: GraphInput::File(diamond_file(dir.path())),
            sources: 2,
            rounds: 1,
            sources_file: Some(sources),
            ..RunConfig::default()
        };
        let err = run::<u32>(&cfg, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, SsspError::OutOfSources { requested: 2, available: 1 }));
    }

    #[test]
    fn random_input_gets_weights_and_runs() {
        let cfg = RunConfig {
            input: GraphInput::Random { nodes: 300, degree: 4 },
            algorithm: Algorithm::BellmanFord,
            verify: true,
            sources: 3,
            rounds: 1,
            ..RunConfig::default()
        };
        let reports = run::<u64>(&cfg, &mut Vec::new()).unwrap();
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.verified && r.reached >= 1));
    }
}
