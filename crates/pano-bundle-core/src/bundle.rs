use crate::errors::{BuildError, Result};
use crate::rewrite::RewriteRule;
use std::borrow::Cow;
use std::path::PathBuf;

/// One build request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSpec {
    /// Modules in concatenation order
    pub modules: Vec<String>,
    pub output_name: String,
    /// Applied to the body only, never to the header
    pub rewrite_rule: Option<RewriteRule>,
}

impl BundleSpec {
    pub fn new<S: Into<String>>(
        modules: impl IntoIterator<Item = S>,
        output_name: impl Into<String>,
    ) -> Self {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
            output_name: output_name.into(),
            rewrite_rule: None,
        }
    }

    /// Build a spec from a comma-separated module list
    pub fn from_module_list(list: &str, output_name: impl Into<String>) -> Self {
        Self::new(parse_module_list(list), output_name)
    }

    pub fn with_rewrite(mut self, rule: RewriteRule) -> Self {
        self.rewrite_rule = Some(rule);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_name.is_empty() {
            return Err(BuildError::InvalidSpec(
                "output name must not be empty".to_string(),
            ));
        }
        if self.output_name.contains(['/', '\\']) {
            return Err(BuildError::InvalidSpec(format!(
                "output name '{}' must not contain path separators",
                self.output_name
            )));
        }
        if let Some(module) = self
            .modules
            .iter()
            .find(|m| m.is_empty() || m.contains("..") || m.starts_with('/'))
        {
            return Err(BuildError::InvalidSpec(format!(
                "invalid module name '{}'",
                module
            )));
        }
        if let Some(ref rule) = self.rewrite_rule {
            rule.validate()?;
        }
        Ok(())
    }
}

/// Split `shared,p2ce` into module names, ignoring blank entries
pub fn parse_module_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// A bundle rendered in memory but not yet written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledBundle {
    pub header: String,
    /// Raw module bytes, concatenated without decoding
    pub body: Vec<u8>,
    /// Contributing files in concatenation order
    pub files: Vec<PathBuf>,
    /// Number of rewrite replacements made in the body
    pub replacements: usize,
}

impl AssembledBundle {
    pub fn contents(&self) -> Vec<u8> {
        let mut contents = Vec::with_capacity(self.header.len() + self.body.len());
        contents.extend_from_slice(self.header.as_bytes());
        contents.extend_from_slice(&self.body);
        contents
    }

    /// Contents decoded for display; invalid UTF-8 is replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

/// A bundle written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    pub path: PathBuf,
    pub contents: Vec<u8>,
    pub files: Vec<PathBuf>,
    pub replacements: usize,
    /// BLAKE3 hex digest of `contents`
    pub digest: String,
}

impl BundleArtifact {
    /// Contents decoded for display; invalid UTF-8 is replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }
}
