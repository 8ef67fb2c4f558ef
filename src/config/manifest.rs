use std::collections::HashMap;

use serde::Deserialize;

use crate::graph::{GraphFormat, UnknownPolicy};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestConfig {
    #[serde(default)]
    pub solution: SolutionSettings,
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default)]
    pub projects: HashMap<String, ProjectEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolutionSettings {
    #[serde(default)]
    pub name: String,
    /// Startup projects, used as traversal roots when none are given on the
    /// command line.
    #[serde(default)]
    pub startup: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub format: Option<GraphFormat>,
    #[serde(default)]
    pub on_unknown: Option<UnknownPolicy>,
    #[serde(default)]
    pub parallel: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub requires: Vec<String>,
}
