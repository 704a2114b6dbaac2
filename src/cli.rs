//! Command-line surface of the `sssp` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    Algorithm, GraphInput, RunConfig, DEFAULT_DUMP_PATH, DEFAULT_RANDOM_DEGREE, DEFAULT_RANDOM_NODES,
    DEFAULT_ROUNDS, DEFAULT_SOURCES, WEIGHT_RANGE,
};
use crate::error::Result;
use crate::io::SourceFormat;
use crate::source::DEFAULT_SEED;
use crate::NodeId;

/// Parallel single-source shortest paths benchmark
#[derive(Parser, Debug)]
#[command(name = "sssp", version, about, long_about = None)]
pub struct Cli {
    /// Input graph (`.adj` text or binary CSR), or `random`
    #[arg(short = 'i', long, default_value = "random")]
    pub input: String,

    /// rho-stepping, delta-stepping or bellman-ford
    #[arg(short = 'a', long, default_value = "rho-stepping")]
    pub algorithm: String,

    /// rho, delta, or a Bellman-Ford round cap
    #[arg(short = 'p', long = "param")]
    pub parameter: Option<String>,

    /// Input is symmetrized
    #[arg(short = 's', long)]
    pub symmetrized: bool,

    /// Verify every trial against Dijkstra
    #[arg(short = 'v', long)]
    pub verify: bool,

    /// Dump the last distance array
    #[arg(short = 'd', long)]
    pub dump: bool,

    /// Where `-d` writes; implies `-d`
    #[arg(long)]
    pub dump_path: Option<PathBuf>,

    /// Number of sources to trial
    #[arg(short = 'S', long, default_value_t = DEFAULT_SOURCES)]
    pub sources: usize,

    /// Rounds per source
    #[arg(short = 'n', long, default_value_t = DEFAULT_ROUNDS)]
    pub rounds: usize,

    /// File of sources, consumed in order
    #[arg(short = 'z', long)]
    pub sources_file: Option<PathBuf>,

    /// Sources file is binary (i64 count, then u32 ids)
    #[arg(long)]
    pub sources_binary: bool,

    /// Single fixed source; overrides `-z` and random selection
    #[arg(short = 'r', long)]
    pub source: Option<NodeId>,

    /// Worker threads, 0 for the rayon default
    #[arg(long, env = "SSSP_THREADS", default_value_t = 0)]
    pub threads: usize,

    #[arg(long, env = "SSSP_SEED", default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Exclusive upper bound of generated weights
    #[arg(long, env = "SSSP_WEIGHT_MAX", default_value_t = WEIGHT_RANGE)]
    pub weight_max: u64,

    #[arg(long, default_value_t = DEFAULT_RANDOM_NODES)]
    pub random_nodes: usize,

    #[arg(long, default_value_t = DEFAULT_RANDOM_DEGREE)]
    pub random_degree: usize,

    /// Write per-trial reports as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Save the (weighted) input graph before running
    #[arg(long)]
    pub save_graph: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Log filter, e.g. `debug` or `sssp_parallel=trace`
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn into_run_config(self) -> Result<RunConfig> {
        let algorithm: Algorithm = self.algorithm.parse()?;
        let input = if self.input == "random" {
            GraphInput::Random { nodes: self.random_nodes, degree: self.random_degree }
        } else {
            GraphInput::File(PathBuf::from(self.input))
        };
        let dump = match (self.dump, self.dump_path) {
            (_, Some(path)) => Some(path),
            (true, None) => Some(PathBuf::from(DEFAULT_DUMP_PATH)),
            (false, None) => None,
        };
        Ok(RunConfig {
            input,
            algorithm,
            parameter: self.parameter,
            symmetrized: self.symmetrized,
            verify: self.verify,
            dump,
            sources: self.sources,
            rounds: self.rounds,
            sources_file: self.sources_file,
            sources_format: if self.sources_binary { SourceFormat::Binary } else { SourceFormat::Text },
            fixed_source: self.source,
            seed: self.seed,
            weight_max: self.weight_max,
            json_report: self.json,
            save_graph: self.save_graph,
        })
    }

    /// Filter directive for the log subscriber.
    pub fn log_filter(&self) -> &str {
        match (&self.log_level, self.quiet) {
            (Some(level), _) => level,
            (None, true) => "warn",
            (None, false) => "info",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SsspError;

    #[test]
    fn defaults() {
        let cfg = Cli::try_parse_from(["sssp"]).unwrap().into_run_config().unwrap();
        assert_eq!(cfg.input, GraphInput::Random { nodes: 1 << 16, degree: 8 });
        assert_eq!(cfg.algorithm, Algorithm::RhoStepping);
        assert_eq!((cfg.sources, cfg.rounds), (1, 22));
        assert!(cfg.dump.is_none());
    }

    #[test]
    fn short_flags() {
        let cli = Cli::try_parse_from([
            "sssp", "-i", "g.adj", "-a", "delta-stepping", "-p", "64", "-s", "-v", "-d", "-S", "5", "-n", "3", "-z",
            "src.bin", "--sources-binary", "-r", "7",
        ])
        .unwrap();
        assert_eq!(cli.log_filter(), "info");
        let cfg = cli.into_run_config().unwrap();
        assert_eq!(cfg.input, GraphInput::File("g.adj".into()));
        assert_eq!(cfg.algorithm, Algorithm::DeltaStepping);
        assert_eq!(cfg.parameter.as_deref(), Some("64"));
        assert!(cfg.symmetrized && cfg.verify);
        assert_eq!(cfg.dump, Some(PathBuf::from("sssp.out")));
        assert_eq!((cfg.sources, cfg.rounds), (5, 3));
        assert_eq!(cfg.sources_format, SourceFormat::Binary);
        assert_eq!(cfg.fixed_source, Some(7));
    }

    #[test]
    fn dump_path_implies_dump_and_quiet_lowers_logging() {
        let cli = Cli::try_parse_from(["sssp", "--dump-path", "out/d.txt", "-q"]).unwrap();
        assert_eq!(cli.log_filter(), "warn");
        assert_eq!(cli.into_run_config().unwrap().dump, Some(PathBuf::from("out/d.txt")));
        let cli = Cli::try_parse_from(["sssp", "-q", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_filter(), "debug");
    }

    #[test]
    fn unknown_algorithm() {
        let err = Cli::try_parse_from(["sssp", "-a", "a-star"]).unwrap().into_run_config().unwrap_err();
        assert!(matches!(err, SsspError::UnknownAlgorithm(_)));
    }
}
