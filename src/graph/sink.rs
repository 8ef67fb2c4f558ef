use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::Deserialize;

use crate::graph::{viz, Edge, GraphError, Result};

/// Receives the finished edge sequence. Implementations decide how it is
/// shown; the traversal never depends on them.
pub trait EdgeSink {
    fn render(&mut self, edges: &[Edge]) -> Result<()>;
}

/// Collects edges into a petgraph model: one node per distinct display name,
/// one graph edge per input edge, so parallel edges survive.
#[derive(Debug, Default)]
pub struct DiGraphSink {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl DiGraphSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &DiGraph<String, ()> {
        &self.graph
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.nodes.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), idx);
        idx
    }
}

impl EdgeSink for DiGraphSink {
    fn render(&mut self, edges: &[Edge]) -> Result<()> {
        for edge in edges {
            let from = self.node(&edge.from_name);
            let to = self.node(&edge.to_name);
            self.graph.add_edge(from, to, ());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    #[default]
    Dot,
    Flat,
    Json,
}

impl FromStr for GraphFormat {
    type Err = String;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "dot" => Ok(Self::Dot),
            "flat" => Ok(Self::Flat),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown graph format '{input}'")),
        }
    }
}

impl fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dot => "dot",
            Self::Flat => "flat",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

pub struct WriterSink<W: Write> {
    writer: W,
    format: GraphFormat,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, format: GraphFormat) -> Self {
        Self { writer, format }
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EdgeSink for WriterSink<W> {
    fn render(&mut self, edges: &[Edge]) -> Result<()> {
        let text = match self.format {
            GraphFormat::Dot => {
                let mut model = DiGraphSink::new();
                model.render(edges)?;
                viz::render_dot(model.graph())
            }
            GraphFormat::Flat => viz::render_flat(edges),
            GraphFormat::Json => {
                let mut json = viz::render_json(edges)
                    .map_err(|err| GraphError::Render(anyhow::Error::new(err)))?;
                json.push('\n');
                json
            }
        };
        self.writer
            .write_all(text.as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|err| GraphError::Render(anyhow::Error::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::sink::{DiGraphSink, EdgeSink, GraphFormat, WriterSink};
    use crate::graph::Edge;

    #[test]
    fn digraph_sink_dedupes_nodes_but_keeps_parallel_edges() {
        let mut sink = DiGraphSink::new();
        sink.render(&[
            Edge::new("C", "E"),
            Edge::new("D", "E"),
            Edge::new("C", "E"),
        ])
        .expect("render edges");

        let graph = sink.graph();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        let labels: Vec<&str> = graph
            .node_indices()
            .map(|idx| graph[idx].as_str())
            .collect();
        assert_eq!(labels, vec!["C", "E", "D"]);
    }

    #[test]
    fn writer_sink_renders_flat_text() {
        let mut sink = WriterSink::new(Vec::new(), GraphFormat::Flat);
        sink.render(&[Edge::new("A", "B")]).expect("render edges");
        let text = String::from_utf8(sink.into_inner()).expect("utf8 output");
        assert_eq!(text, "A -> B\n");
    }

    #[test]
    fn writer_sink_renders_dot_with_shared_nodes() {
        let mut sink = WriterSink::new(Vec::new(), GraphFormat::Dot);
        sink.render(&[Edge::new("A", "B"), Edge::new("B", "A")])
            .expect("render edges");
        let text = String::from_utf8(sink.into_inner()).expect("utf8 output");
        assert!(text.contains("n0 [label=\"A\"];"));
        assert!(text.contains("n1 [label=\"B\"];"));
        assert!(text.contains("n0 -> n1;"));
        assert!(text.contains("n1 -> n0;"));
    }

    #[test]
    fn graph_format_parses_known_names() {
        assert_eq!("DOT".parse::<GraphFormat>(), Ok(GraphFormat::Dot));
        assert_eq!("json".parse::<GraphFormat>(), Ok(GraphFormat::Json));
        assert!("svg".parse::<GraphFormat>().is_err());
        assert_eq!(GraphFormat::Flat.to_string(), "flat");
    }
}
