use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::resolve::load_manifest;
use crate::config::{ConfigError, ManifestConfig};
use crate::core::project::{ProjectId, ProjectRecord};
use crate::error::Result;
use crate::graph::{DependencyIndex, GraphFormat};
use crate::source::DependencySource;

/// Projects and startup roots declared in a `projgraph.toml` (or YAML)
/// manifest.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    pub path: PathBuf,
    pub config: ManifestConfig,
}

impl ManifestSource {
    pub fn open(path: PathBuf) -> std::result::Result<Self, ConfigError> {
        let mut config = load_manifest(&path)?;
        validate(&path, &config)?;
        apply_env_overrides(&mut config);
        debug!(
            manifest = %path.display(),
            projects = config.projects.len(),
            startup = config.solution.startup.len(),
            "loaded manifest"
        );
        Ok(Self { path, config })
    }

    pub fn index(&self) -> DependencyIndex {
        self.config
            .projects
            .iter()
            .map(|(id, entry)| {
                ProjectRecord::new(
                    id.clone(),
                    entry.name.clone().unwrap_or_else(|| id.clone()),
                    entry.requires.iter().cloned(),
                )
            })
            .collect()
    }

    pub fn startup(&self) -> Vec<ProjectId> {
        self.config
            .solution
            .startup
            .iter()
            .map(|id| ProjectId::new(id.clone()))
            .collect()
    }
}

impl DependencySource for ManifestSource {
    fn load(&self) -> Result<(DependencyIndex, Vec<ProjectId>)> {
        Ok((self.index(), self.startup()))
    }
}

fn validate(path: &Path, config: &ManifestConfig) -> std::result::Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidManifest {
        path: path.to_path_buf(),
        reason,
    };

    if config.projects.keys().any(|id| id.trim().is_empty()) {
        return Err(invalid("project ids must not be empty".to_string()));
    }
    if config.solution.startup.iter().any(|id| id.trim().is_empty()) {
        return Err(invalid("startup entries must not be empty".to_string()));
    }
    if let Some(parallel) = config.render.parallel.filter(|jobs| *jobs == 0) {
        return Err(invalid(format!("render.parallel must be positive, got {parallel}")));
    }
    Ok(())
}

fn apply_env_overrides(config: &mut ManifestConfig) {
    if let Ok(value) = env::var("PROJGRAPH_FORMAT") {
        match value.parse::<GraphFormat>() {
            Ok(format) => config.render.format = Some(format),
            Err(err) => warn!("ignoring PROJGRAPH_FORMAT: {err}"),
        }
    }
}
