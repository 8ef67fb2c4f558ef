#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod graph;
pub mod source;
pub mod util;

pub use crate::core::project::{ProjectId, ProjectRecord};
pub use crate::graph::{DependencyIndex, Edge, GraphBuilder, GraphError};
