//! File-driven harness around the redpoll core.
//!
//! Reads a plain-text graph description (a header of `<vertices> <edges>
//! <flag>` with flag `0` undirected and `1` directed, then the vertex
//! labels, then the edges as `source-destination` tokens), builds the graph
//! through the public insertion API, prints it together with its transitive
//! closure,
//! and, when the graph is acyclic, prints both transitive reductions.

use std::env;
use std::fs;

use itertools::Itertools;
use thiserror::Error;

use redpoll::graph::{GraphError, LabelGraph};

#[derive(Debug, Error)]
enum HarnessError {
    #[error("usage: redpoll-cli <graph-file>")]
    Usage,

    #[error("could not read `{path}`: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed header: expected `<vertices> <edges> <flag>`")]
    Header,

    #[error("graph has no vertices")]
    NoVertices,

    #[error("graph has no edges")]
    NoEdges,

    #[error("invalid direction flag `{0}` (expected 0 or 1)")]
    Flag(String),

    #[error("expected {expected} {kind} tokens, found {found}")]
    MissingTokens {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("edge token `{0}` is not of the form `source-destination`")]
    EdgeToken(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), HarnessError> {
    let path = env::args().nth(1).ok_or(HarnessError::Usage)?;
    let text = fs::read_to_string(&path).map_err(|source| HarnessError::Io {
        path: path.clone(),
        source,
    })?;

    let mut graph = parse_graph(&text)?;

    println!("vertices: {}", graph.labels().join(", "));
    println!("edges:");
    print!("{graph}");

    graph.compute_closures()?;
    println!("transitive closure:");
    print!("{}", graph.closure_display());

    // only directed cycles invalidate the reductions: an acyclic undirected
    // graph is a forest with nothing to reduce, so undirected input with
    // redundant edges is necessarily cyclic and passes through
    if graph.is_directed() && graph.is_cyclic() {
        eprintln!("graph is cyclic: transitive reduction skipped");
        return Ok(());
    }

    let mut walked = graph.walk_reduction()?;
    walked.compute_closures()?;
    println!("walk reduction:");
    print!("{walked}");

    let mut permuted = graph.permutation_reduction()?;
    permuted.compute_closures()?;
    println!("permutation reduction:");
    print!("{permuted}");

    Ok(())
}

fn parse_graph(text: &str) -> Result<LabelGraph, HarnessError> {
    let mut tokens = text.split_whitespace();

    let vertices: usize = tokens
        .next()
        .ok_or(HarnessError::Header)?
        .parse()
        .map_err(|_| HarnessError::Header)?;
    let edges: usize = tokens
        .next()
        .ok_or(HarnessError::Header)?
        .parse()
        .map_err(|_| HarnessError::Header)?;
    let flag = tokens.next().ok_or(HarnessError::Header)?;

    if vertices == 0 {
        return Err(HarnessError::NoVertices);
    }
    if edges == 0 {
        return Err(HarnessError::NoEdges);
    }
    let directed = match flag {
        "0" => false,
        "1" => true,
        other => return Err(HarnessError::Flag(other.to_owned())),
    };

    // every vertex may neighbour all others, so rows are sized by the
    // vertex count; the header's edge count only bounds the token stream
    let mut graph = LabelGraph::new(vertices, vertices, directed);

    for i in 0..vertices {
        let label = tokens.next().ok_or(HarnessError::MissingTokens {
            kind: "vertex",
            expected: vertices,
            found: i,
        })?;
        graph.add_vertex(label)?;
    }

    for i in 0..edges {
        let token = tokens.next().ok_or(HarnessError::MissingTokens {
            kind: "edge",
            expected: edges,
            found: i,
        })?;
        let (source, destination) = token
            .split_once('-')
            .ok_or_else(|| HarnessError::EdgeToken(token.to_owned()))?;
        graph.add_edge(source, destination)?;
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::{parse_graph, HarnessError};

    #[test]
    fn parses_the_original_input_format() {
        let graph = parse_graph("3 3 1\na b c\na-b b-c a-c\n").unwrap();
        assert!(graph.is_directed());
        assert_eq!(graph.n_vertices(), 3);
        assert_eq!(graph.n_edges(), 3);
    }

    #[test]
    fn rejects_bad_headers() {
        assert!(matches!(parse_graph(""), Err(HarnessError::Header)));
        assert!(matches!(parse_graph("x 3 1"), Err(HarnessError::Header)));
        assert!(matches!(
            parse_graph("0 3 1"),
            Err(HarnessError::NoVertices)
        ));
        assert!(matches!(parse_graph("3 0 1"), Err(HarnessError::NoEdges)));
        assert!(matches!(parse_graph("3 3 2"), Err(HarnessError::Flag(_))));
    }

    #[test]
    fn rejects_malformed_edge_tokens() {
        let err = parse_graph("2 1 1\na b\nab\n").unwrap_err();
        assert!(matches!(err, HarnessError::EdgeToken(_)));
    }

    #[test]
    fn reports_truncated_files() {
        let err = parse_graph("3 2 1\na b\n").unwrap_err();
        assert!(matches!(
            err,
            HarnessError::MissingTokens { kind: "vertex", .. }
        ));
    }
}
