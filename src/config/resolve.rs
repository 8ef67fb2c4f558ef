use std::env;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, ManifestConfig};

pub const MANIFEST_NAMES: [&str; 3] = ["projgraph.toml", "projgraph.yaml", "projgraph.yml"];

pub fn resolve_manifest_with_override(
    start: impl AsRef<Path>,
    manifest_path: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = manifest_path {
        return existing_file(path);
    }

    if let Ok(path) = env::var("PROJGRAPH_MANIFEST") {
        return existing_file(PathBuf::from(path));
    }

    find_manifest_from(start.as_ref())
}

pub fn load_manifest(path: &Path) -> Result<ManifestConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    if is_yaml(path) {
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn existing_file(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ConfigError::ConfigNotFound(path))
    }
}

fn find_manifest_from(start: &Path) -> Result<PathBuf, ConfigError> {
    for ancestor in start.ancestors() {
        for name in MANIFEST_NAMES {
            let candidate = ancestor.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(ConfigError::ManifestNotFound(start.to_path_buf()))
}
