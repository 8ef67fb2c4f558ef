use std::collections::HashSet;

use petgraph::graph::DiGraph;
use serde::Serialize;

use crate::graph::Edge;

pub fn render_dot(graph: &DiGraph<String, ()>) -> String {
    let mut out = String::from("digraph projgraph {\n");
    for idx in graph.node_indices() {
        let escaped = escape_dot_label(&graph[idx]);
        out.push_str(&format!("  n{} [label=\"{}\"];\n", idx.index(), escaped));
    }
    for edge in graph.raw_edges() {
        out.push_str(&format!(
            "  n{} -> n{};\n",
            edge.source().index(),
            edge.target().index()
        ));
    }
    out.push_str("}\n");
    out
}

pub fn render_flat(edges: &[Edge]) -> String {
    let mut out = String::new();
    for edge in edges {
        out.push_str(&edge.from_name);
        out.push_str(" -> ");
        out.push_str(&edge.to_name);
        out.push('\n');
    }
    out
}

#[derive(Serialize)]
struct GraphJson<'a> {
    nodes: Vec<&'a str>,
    edges: &'a [Edge],
}

/// Nodes are listed in order of first appearance; edges keep traversal order.
pub fn render_json(edges: &[Edge]) -> serde_json::Result<String> {
    let json = GraphJson {
        nodes: node_names(edges),
        edges,
    };
    serde_json::to_string_pretty(&json)
}

pub fn node_names(edges: &[Edge]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for edge in edges {
        for name in [edge.from_name.as_str(), edge.to_name.as_str()] {
            if seen.insert(name) {
                names.push(name);
            }
        }
    }
    names
}

fn escape_dot_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
