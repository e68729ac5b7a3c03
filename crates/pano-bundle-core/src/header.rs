use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;
use std::path::Path;
use tracing::warn;

/// Preamble prepended to every bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub raw_content: String,
    pub version_placeholder: String,
}

impl Header {
    pub fn new(raw_content: impl Into<String>, version_placeholder: impl Into<String>) -> Self {
        Self {
            raw_content: raw_content.into(),
            version_placeholder: version_placeholder.into(),
        }
    }

    pub fn load(fs: &dyn FileSystem, path: &Path, version_placeholder: &str) -> Result<Self> {
        let raw_content = fs
            .read_to_string(path)
            .map_err(|source| BuildError::ReadHeader {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(raw_content, version_placeholder))
    }

    /// Substitute the version for every occurrence of the placeholder
    pub fn render(&self, version: &str) -> Result<String> {
        if version.is_empty() {
            return Err(BuildError::MissingVersion);
        }

        if !self.raw_content.contains(&self.version_placeholder) {
            warn!(
                "Header does not contain version placeholder {}",
                self.version_placeholder
            );
            return Ok(self.raw_content.clone());
        }

        Ok(self
            .raw_content
            .replace(self.version_placeholder.as_str(), version))
    }
}
