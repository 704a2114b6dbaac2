use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use sssp_parallel::cli::Cli;
use sssp_parallel::harness;

#[cfg(feature = "float")]
type EdgeTy = f32;
#[cfg(not(feature = "float"))]
type EdgeTy = u32;

fn setup_logging(cli: &Cli) {
    // --log-level beats RUST_LOG, which beats -q
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("failed to build the worker pool")?;
    }
    let cfg = cli.into_run_config()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    harness::run::<EdgeTy>(&cfg, &mut out).with_context(|| format!("run on {} failed", cfg.input_label()))?;
    out.flush().context("failed to flush stdout")?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
