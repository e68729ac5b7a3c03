use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a bundle build
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No version string available (set npm_package_version or pass --pkg-version)")]
    MissingVersion,

    #[error("Invalid bundle spec: {0}")]
    InvalidSpec(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown bundle target '{name}' (available: {available})")]
    UnknownTarget { name: String, available: String },

    #[error("Failed to read header {path}: {source}")]
    ReadHeader {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read module source {path}: {source}")]
    ReadModule {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write bundle {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// True for errors raised before any filesystem access
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BuildError::MissingVersion
                | BuildError::InvalidSpec(_)
                | BuildError::Config(_)
                | BuildError::UnknownTarget { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
