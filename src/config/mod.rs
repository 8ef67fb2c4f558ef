pub mod manifest;
pub mod resolve;

pub use manifest::{ManifestConfig, ProjectEntry, RenderSettings, SolutionSettings};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no projgraph manifest found from {0}")]
    ManifestNotFound(PathBuf),
    #[error("manifest file not found: {0}")]
    ConfigNotFound(PathBuf),
    #[error("invalid manifest at {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to parse manifest at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
