//! Graph files, source lists and distance dumps.
//!
//! Binary CSR layout (little-endian):
//! `n: u64 | m: u64 | sizes: u64 | offsets: [u64; n + 1] | edges: [u32; m] | weights?`
//! where `sizes` is the total byte length and the optional trailing block holds
//! `m` weights in the distance type's width.
//!
//! Text adjacency layout: `AdjacencyGraph` or `WeightedAdjacencyGraph`, then
//! `n`, `m`, `n` offsets, `m` destinations and (weighted) `m` weights.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::distance::Distance;
use crate::error::{Result, SsspError};
use crate::graph::Graph;
use crate::NodeId;

const HEADER_BYTES: usize = 3 * 8;
const UNWEIGHTED_HEADER: &str = "AdjacencyGraph";
const WEIGHTED_HEADER: &str = "WeightedAdjacencyGraph";

/// How a sources file is encoded. Chosen by the caller, never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    #[default]
    Text,
    Binary,
}

fn is_text_graph(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "adj")
}

pub fn read_graph<W: Distance>(path: &Path, symmetrized: bool) -> Result<Graph<W>> {
    let bytes = fs::read(path).map_err(|e| SsspError::io(path, e))?;
    let g = if is_text_graph(path) {
        let text = String::from_utf8(bytes)
            .map_err(|_| SsspError::MalformedGraph(format!("{} is not valid UTF-8", path.display())))?;
        parse_adjacency_graph(&text, symmetrized)?
    } else {
        decode_binary_graph(&bytes, symmetrized)?
    };
    debug!(path = %path.display(), n = g.n, m = g.m, weighted = g.weighted, "graph loaded");
    Ok(g)
}

pub fn write_graph<W: Distance>(path: &Path, g: &Graph<W>) -> Result<()> {
    let data = if is_text_graph(path) {
        encode_adjacency_graph(g).into_bytes()
    } else {
        encode_binary_graph(g)
    };
    fs::write(path, data).map_err(|e| SsspError::io(path, e))
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

fn to_usize(v: u64, what: &str) -> Result<usize> {
    usize::try_from(v).map_err(|_| SsspError::MalformedGraph(format!("{what} {v} does not fit in memory")))
}

pub fn decode_binary_graph<W: Distance>(bytes: &[u8], symmetrized: bool) -> Result<Graph<W>> {
    if bytes.len() < HEADER_BYTES {
        return Err(SsspError::MalformedGraph(format!("{} bytes is too short for a header", bytes.len())));
    }
    let n = to_usize(read_u64(bytes, 0), "node count")?;
    let m = to_usize(read_u64(bytes, 8), "edge count")?;
    let sizes = read_u64(bytes, 16);
    if sizes != bytes.len() as u64 {
        warn!(header = sizes, actual = bytes.len(), "binary graph size field disagrees with file length");
    }
    let offsets_end = n
        .checked_add(1)
        .and_then(|k| k.checked_mul(8))
        .and_then(|k| k.checked_add(HEADER_BYTES))
        .ok_or_else(|| SsspError::MalformedGraph("node count overflows".into()))?;
    let edges_end = m
        .checked_mul(4)
        .and_then(|k| k.checked_add(offsets_end))
        .ok_or_else(|| SsspError::MalformedGraph("edge count overflows".into()))?;
    if bytes.len() < edges_end {
        return Err(SsspError::MalformedGraph(format!(
            "expected at least {edges_end} bytes for n = {n}, m = {m}, found {}",
            bytes.len()
        )));
    }
    let offsets = bytes[HEADER_BYTES..offsets_end]
        .chunks_exact(8)
        .map(|c| to_usize(read_u64(c, 0), "offset"))
        .collect::<Result<Vec<_>>>()?;
    let edges: Vec<NodeId> = bytes[offsets_end..edges_end]
        .chunks_exact(4)
        .map(|c| NodeId::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    let rest = &bytes[edges_end..];
    let weights = if rest.is_empty() {
        None
    } else if rest.len() == m * W::BYTES {
        Some(rest.chunks_exact(W::BYTES).map(W::read_le).collect())
    } else {
        return Err(SsspError::MalformedGraph(format!(
            "{} trailing bytes do not hold {m} weights of {} bytes",
            rest.len(),
            W::BYTES
        )));
    };
    Graph::from_csr(offsets, edges, weights, symmetrized)
}

pub fn encode_binary_graph<W: Distance>(g: &Graph<W>) -> Vec<u8> {
    let weight_bytes = if g.weighted { g.m * W::BYTES } else { 0 };
    let total = HEADER_BYTES + (g.n + 1) * 8 + g.m * 4 + weight_bytes;
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&(g.n as u64).to_le_bytes());
    out.extend_from_slice(&(g.m as u64).to_le_bytes());
    out.extend_from_slice(&(total as u64).to_le_bytes());
    for &o in &g.offsets {
        out.extend_from_slice(&(o as u64).to_le_bytes());
    }
    for &e in &g.edges {
        out.extend_from_slice(&e.to_le_bytes());
    }
    if g.weighted {
        for &w in &g.weights {
            w.write_le(&mut out);
        }
    }
    out
}

pub fn parse_adjacency_graph<W: Distance>(text: &str, symmetrized: bool) -> Result<Graph<W>> {
    let mut tokens = text.split_ascii_whitespace();
    let weighted = match tokens.next() {
        Some(UNWEIGHTED_HEADER) => false,
        Some(WEIGHTED_HEADER) => true,
        other => {
            return Err(SsspError::MalformedGraph(format!("unknown adjacency header {other:?}")));
        }
    };
    let mut next_num = |what: &str| -> Result<u64> {
        let tok = tokens
            .next()
            .ok_or_else(|| SsspError::MalformedGraph(format!("unexpected end of file reading {what}")))?;
        tok.parse()
            .map_err(|_| SsspError::MalformedGraph(format!("bad {what} `{tok}`")))
    };
    let n = to_usize(next_num("node count")?, "node count")?;
    let m = to_usize(next_num("edge count")?, "edge count")?;
    let mut offsets = Vec::with_capacity(n + 1);
    for _ in 0..n {
        offsets.push(to_usize(next_num("offset")?, "offset")?);
    }
    offsets.push(m);
    let mut edges = Vec::with_capacity(m);
    for _ in 0..m {
        let v = next_num("edge")?;
        edges.push(NodeId::try_from(v).map_err(|_| SsspError::MalformedGraph(format!("edge {v} overflows a node id")))?);
    }
    let weights = if weighted {
        let mut w = Vec::with_capacity(m);
        for _ in 0..m {
            let tok = tokens
                .next()
                .ok_or_else(|| SsspError::MalformedGraph("unexpected end of file reading weight".into()))?;
            w.push(W::parse_param(tok).ok_or_else(|| SsspError::MalformedGraph(format!("bad weight `{tok}`")))?);
        }
        Some(w)
    } else {
        None
    };
    Graph::from_csr(offsets, edges, weights, symmetrized)
}

pub fn encode_adjacency_graph<W: Distance>(g: &Graph<W>) -> String {
    let mut out = String::new();
    out.push_str(if g.weighted { WEIGHTED_HEADER } else { UNWEIGHTED_HEADER });
    out.push('\n');
    out.push_str(&format!("{}\n{}\n", g.n, g.m));
    for o in &g.offsets[..g.n] {
        out.push_str(&format!("{o}\n"));
    }
    for e in &g.edges {
        out.push_str(&format!("{e}\n"));
    }
    if g.weighted {
        for w in &g.weights {
            out.push_str(&format!("{w}\n"));
        }
    }
    out
}

pub fn read_sources(path: &Path, format: SourceFormat) -> Result<Vec<NodeId>> {
    let bytes = fs::read(path).map_err(|e| SsspError::io(path, e))?;
    let malformed = |reason: String| SsspError::MalformedSources { path: path.to_path_buf(), reason };
    match format {
        SourceFormat::Text => {
            let text = std::str::from_utf8(&bytes).map_err(|_| malformed("not valid UTF-8".into()))?;
            text.split_ascii_whitespace()
                .map(|tok| tok.parse::<NodeId>().map_err(|_| malformed(format!("bad node id `{tok}`"))))
                .collect()
        }
        SourceFormat::Binary => {
            if bytes.len() < 8 {
                return Err(malformed("missing 8-byte count".into()));
            }
            let count = i64::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]]);
            let count = usize::try_from(count).map_err(|_| malformed(format!("negative count {count}")))?;
            let body = &bytes[8..];
            if body.len() < count.saturating_mul(4) {
                return Err(malformed(format!("count says {count} ids but only {} bytes follow", body.len())));
            }
            Ok(body[..count * 4]
                .chunks_exact(4)
                .map(|c| NodeId::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect())
        }
    }
}

pub fn write_sources(path: &Path, sources: &[NodeId], format: SourceFormat) -> Result<()> {
    let data = match format {
        SourceFormat::Text => sources.iter().map(|s| format!("{s}\n")).collect::<String>().into_bytes(),
        SourceFormat::Binary => {
            let mut out = Vec::with_capacity(8 + sources.len() * 4);
            out.extend_from_slice(&(sources.len() as i64).to_le_bytes());
            for s in sources {
                out.extend_from_slice(&s.to_le_bytes());
            }
            out
        }
    };
    fs::write(path, data).map_err(|e| SsspError::io(path, e))
}

/// One distance per line, in node id order.
pub fn dump_distances<W: Distance>(path: &Path, dist: &[W]) -> Result<()> {
    let file = fs::File::create(path).map_err(|e| SsspError::io(path, e))?;
    let mut out = BufWriter::new(file);
    for d in dist {
        writeln!(out, "{d}").map_err(|e| SsspError::io(path, e))?;
    }
    out.flush().map_err(|e| SsspError::io(path, e))
}

pub fn read_distances<W: Distance>(path: &Path) -> Result<Vec<W>> {
    let text = fs::read_to_string(path).map_err(|e| SsspError::io(path, e))?;
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .enumerate()
        .map(|(i, l)| {
            W::parse_param(l).ok_or_else(|| SsspError::MalformedDistances {
                path: path.to_path_buf(),
                reason: format!("line {}: bad distance `{l}`", i + 1),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph<u32> {
        Graph::from_edges(4, &[(0, 1, 1), (1, 2, 2), (0, 2, 5), (2, 3, 1)]).unwrap()
    }

    #[test]
    fn binary_graph_round_trip() {
        let g = sample();
        let bytes = encode_binary_graph(&g);
        assert_eq!(read_u64(&bytes, 16) as usize, bytes.len());
        let back: Graph<u32> = decode_binary_graph(&bytes, false).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn unweighted_binary_graph_gets_unit_weights() {
        let mut g = sample();
        g.weighted = false;
        let back: Graph<u32> = decode_binary_graph(&encode_binary_graph(&g), true).unwrap();
        assert!(!back.weighted);
        assert!(back.symmetrized);
        assert!(back.weights.iter().all(|&w| w == 1));
    }

    #[test]
    fn truncated_binary_graph_is_rejected() {
        let bytes = encode_binary_graph(&sample());
        assert!(decode_binary_graph::<u32>(&bytes[..bytes.len() - 20], false).is_err());
        assert!(decode_binary_graph::<u32>(&bytes[..10], false).is_err());
        // trailing garbage that is not a whole weight block
        let mut extra = bytes.clone();
        extra.push(0);
        assert!(decode_binary_graph::<u32>(&extra, false).is_err());
    }

    #[test]
    fn adjacency_text_round_trip() {
        let g: Graph<f64> = Graph::from_edges(3, &[(0, 1, 0.5), (1, 2, 2.25), (2, 0, 1.0)]).unwrap();
        let text = encode_adjacency_graph(&g);
        assert!(text.starts_with("WeightedAdjacencyGraph\n3\n3\n"));
        let back: Graph<f64> = parse_adjacency_graph(&text, false).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn adjacency_text_unweighted_and_errors() {
        let g: Graph<u32> = parse_adjacency_graph("AdjacencyGraph\n3 2\n0 1 2\n1 2\n", false).unwrap();
        assert_eq!(g.offsets, vec![0, 1, 2, 2]);
        assert!(!g.weighted);
        assert!(parse_adjacency_graph::<u32>("Graph 1 0 0", false).is_err());
        assert!(parse_adjacency_graph::<u32>("AdjacencyGraph 2 2 0 1 1", false).is_err());
        assert!(parse_adjacency_graph::<u32>("AdjacencyGraph 2 1 0 1 7", false).is_err());
    }

    #[test]
    fn sources_text_and_binary() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("sources.txt");
        fs::write(&text, "3 1\n4\n\n").unwrap();
        assert_eq!(read_sources(&text, SourceFormat::Text).unwrap(), vec![3, 1, 4]);

        let bin = dir.path().join("sources.bin");
        write_sources(&bin, &[9, 2, 6], SourceFormat::Binary).unwrap();
        assert_eq!(read_sources(&bin, SourceFormat::Binary).unwrap(), vec![9, 2, 6]);

        fs::write(&text, "3 x").unwrap();
        assert!(matches!(read_sources(&text, SourceFormat::Text), Err(SsspError::MalformedSources { .. })));
        assert!(matches!(
            read_sources(&dir.path().join("missing"), SourceFormat::Text),
            Err(SsspError::Io { .. })
        ));
    }

    #[test]
    fn distance_dump_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sssp.out");
        let ints = vec![0u32, 1, 3, 4, u32::MAX];
        dump_distances(&path, &ints).unwrap();
        assert_eq!(read_distances::<u32>(&path).unwrap(), ints);

        let floats = vec![0.0f32, 0.1, 1.0 / 3.0, 2.5e-7, f32::MAX];
        dump_distances(&path, &floats).unwrap();
        let back = read_distances::<f32>(&path).unwrap();
        assert!(floats.iter().zip(&back).all(|(a, b)| a.to_bits() == b.to_bits()));
    }

    #[test]
    fn graph_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let g = sample();
        for name in ["g.bin", "g.adj"] {
            let path = dir.path().join(name);
            write_graph(&path, &g).unwrap();
            assert_eq!(read_graph::<u32>(&path, false).unwrap(), g);
        }
    }
}
