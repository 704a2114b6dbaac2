//! Sweeps random graphs and writes a JSON timing table comparing every solver
//! against serial Dijkstra.
//!
//! cargo run --release --example bench_sweep -- --sizes 10000,100000 --degrees 4,8 --out bench_out/sweep.json

use std::time::Instant;

use serde_json::json;
use sssp_parallel::{
    generate_random_graph, BellmanFord, DeltaStepping, Dijkstra, Distance, Graph, RhoStepping, Solver,
};

fn arg<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter().position(|a| a == name).and_then(|i| args.get(i + 1)).map(String::as_str)
}

fn list(arg: Option<&str>, default: &[usize]) -> Vec<usize> {
    arg.map(|s| s.split(',').filter_map(|v| v.trim().parse().ok()).collect())
        .unwrap_or_else(|| default.to_vec())
}

fn time_solver(solver: &dyn Solver<u32>, baseline: &[u32]) -> serde_json::Value {
    let t = Instant::now();
    let (dist, stats) = solver.solve_with_stats(0).expect("solve");
    let ms = t.elapsed().as_secs_f64() * 1000.0;
    let mismatches = dist.iter().zip(baseline).filter(|(a, b)| !a.approx_eq(**b)).count();
    assert_eq!(mismatches, 0, "{} disagrees with dijkstra", solver.name());
    json!({ "ms": ms, "stats": stats })
}

fn run_one(n: usize, degree: usize, seed: u64) -> serde_json::Value {
    let mut g: Graph<u32> = generate_random_graph(n, degree, seed, false).expect("graph");
    g.generate_random_weights(1, 1 << 18, seed);

    let t = Instant::now();
    let baseline = Dijkstra::new(&g).solve(0).expect("dijkstra");
    let dijkstra_ms = t.elapsed().as_secs_f64() * 1000.0;
    let reached = baseline.iter().filter(|d| d.is_reached()).count();

    let delta = time_solver(&DeltaStepping::new(&g, 1 << 15).expect("delta"), &baseline);
    let rho = time_solver(&RhoStepping::new(&g, 1 << 20).expect("rho"), &baseline);
    let bf = time_solver(&BellmanFord::new(&g), &baseline);
    json!({
        "n": g.n, "m": g.m, "degree": degree, "reached": reached,
        "dijkstra_ms": dijkstra_ms,
        "delta_stepping": delta,
        "rho_stepping": rho,
        "bellman_ford": bf,
    })
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help") {
        eprintln!("Usage: bench_sweep --sizes 10000,20000 --degrees 2,4,8 --seed 42 --out bench_out/sweep.json");
        return;
    }
    let sizes = list(arg(&args, "--sizes"), &[10_000, 20_000]);
    let degrees = list(arg(&args, "--degrees"), &[4]);
    let seed: u64 = arg(&args, "--seed").and_then(|v| v.parse().ok()).unwrap_or(42);
    let out_path = arg(&args, "--out").unwrap_or("bench_out/sweep.json");

    let mut results = Vec::new();
    for &n in &sizes {
        for &d in &degrees {
            results.push(run_one(n, d, seed));
        }
    }
    if let Some(dir) = std::path::Path::new(out_path).parent() {
        std::fs::create_dir_all(dir).ok();
    }
    let text = serde_json::to_string_pretty(&serde_json::Value::Array(results)).expect("encode");
    std::fs::write(out_path, text).expect("write output");
    eprintln!("wrote {out_path}");
}
