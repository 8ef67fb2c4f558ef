use serde::Serialize;
use thiserror::Error;

use crate::core::project::ProjectId;

pub mod builder;
pub mod index;
pub mod ops;
pub mod sink;
pub mod viz;

pub use builder::{GraphBuilder, MissingReference, Traversal, UnknownPolicy};
pub use index::DependencyIndex;
pub use sink::{DiGraphSink, EdgeSink, GraphFormat, WriterSink};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown project: {id}")]
    UnknownProject { id: ProjectId },
    #[error("graph build cancelled")]
    Cancelled,
    #[error("render error: {0}")]
    Render(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

/// A directed "requires" edge between two projects, by display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    #[serde(rename = "from")]
    pub from_name: String,
    #[serde(rename = "to")]
    pub to_name: String,
}

impl Edge {
    pub fn new(from_name: impl Into<String>, to_name: impl Into<String>) -> Self {
        Self {
            from_name: from_name.into(),
            to_name: to_name.into(),
        }
    }
}
