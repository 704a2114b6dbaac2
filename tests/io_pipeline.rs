use std::ffi::OsString;
use std::fs;

use clap::Parser;
use sssp_parallel::cli::Cli;
use sssp_parallel::io::{dump_distances, read_distances, read_graph, read_sources, write_graph, write_sources, SourceFormat};
use sssp_parallel::{generate_random_graph, harness, DeltaStepping, Graph, RhoStepping, Solver, SourcePicker, SsspError};

#[test]
fn binary_graph_survives_save_and_solve() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("g.bin");
    let mut g = generate_random_graph::<u32>(500, 5, 3, false).unwrap();
    g.generate_random_weights(1, 1000, 3);
    write_graph(&path, &g).unwrap();
    let back = read_graph::<u32>(&path, false).unwrap();
    assert_eq!(back, g);
    let a = DeltaStepping::new(&g, 100).unwrap().solve(0).unwrap();
    let b = DeltaStepping::new(&back, 100).unwrap().solve(0).unwrap();
    assert_eq!(a, b);
}

#[test]
fn float_distances_dump_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let g = Graph::<f64>::from_edges(4, &[(0, 1, 0.1), (1, 2, 0.2), (2, 3, 1.0 / 3.0)]).unwrap();
    let dist = RhoStepping::new(&g, 2).unwrap().solve(0).unwrap();
    let out = dir.path().join("sssp.out");
    dump_distances(&out, &dist).unwrap();
    let back = read_distances::<f64>(&out).unwrap();
    assert_eq!(back.len(), dist.len());
    for (a, b) in dist.iter().zip(&back) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn unreached_entries_dump_as_max() {
    let dir = tempfile::tempdir().unwrap();
    let g = Graph::<u32>::from_edges(3, &[(0, 1, 4)]).unwrap();
    let dist = DeltaStepping::new(&g, 2).unwrap().solve(0).unwrap();
    let out = dir.path().join("d.txt");
    dump_distances(&out, &dist).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), format!("0\n4\n{}\n", u32::MAX));
}

#[test]
fn binary_sources_drive_the_picker() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sources.bin");
    write_sources(&path, &[2, 0, 9], SourceFormat::Binary).unwrap();
    let sources = read_sources(&path, SourceFormat::Binary).unwrap();
    assert_eq!(sources, vec![2, 0, 9]);

    let g = Graph::<u32>::from_edges(4, &[(0, 1, 1), (2, 3, 1)]).unwrap();
    let mut picker = SourcePicker::new(&g, None, Some(sources), 1);
    assert_eq!(picker.pick_next().unwrap(), 2);
    assert_eq!(picker.pick_next().unwrap(), 0);
    // 9 is out of range for four nodes
    assert!(matches!(picker.pick_next(), Err(SsspError::InvalidSource { vertex: 9, n: 4 })));
}

#[test]
fn text_sources_ignore_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sources.txt");
    fs::write(&path, "3 1\n4\n").unwrap();
    assert_eq!(read_sources(&path, SourceFormat::Text).unwrap(), vec![3, 1, 4]);
}

#[test]
fn cli_run_saves_graph_dumps_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let saved = dir.path().join("random.bin");
    let dump = dir.path().join("dist.out");
    let json = dir.path().join("out/report.json");
    let args: Vec<OsString> = vec![
        "sssp".into(),
        "-a".into(),
        "bellman-ford".into(),
        "-v".into(),
        "-S".into(),
        "2".into(),
        "-n".into(),
        "2".into(),
        "--random-nodes".into(),
        "200".into(),
        "--seed".into(),
        "5".into(),
        "--save-graph".into(),
        saved.clone().into_os_string(),
        "--dump-path".into(),
        dump.clone().into_os_string(),
        "--json".into(),
        json.clone().into_os_string(),
    ];
    let cli = Cli::try_parse_from(args).unwrap();
    let cfg = cli.into_run_config().unwrap();
    let mut out = Vec::new();
    let reports = harness::run::<u32>(&cfg, &mut out).unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.verified && r.round_seconds.len() == 2));

    let graph = read_graph::<u32>(&saved, false).unwrap();
    assert_eq!(graph.n, 200);
    assert!(graph.weighted);
    let dist = read_distances::<u32>(&dump).unwrap();
    assert_eq!(dist.len(), 200);
    assert_eq!(dist[reports[1].source as usize], 0);
    assert!(fs::metadata(&json).unwrap().len() > 0);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("|V|=200"));
    assert_eq!(text.matches("Average time:").count(), 2);
}
