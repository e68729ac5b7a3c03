use crate::bundle::BundleSpec;
use crate::errors::{BuildError, Result};
use crate::rewrite::RewriteRule;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pano-bundle.yaml";

/// Placeholder the upstream header carries for the package version
pub const DEFAULT_VERSION_PLACEHOLDER: &str = "$npm_package_version$";

/// Where sources live, where bundles go, and how files are recognised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleLayout {
    /// Source root holding one directory per module (default: src)
    #[serde(default = "default_src_dir")]
    pub src_dir: PathBuf,

    /// Header asset prepended to every bundle (default: src/header.d.ts)
    #[serde(default = "default_header")]
    pub header: PathBuf,

    /// Output directory for bundles (default: dist)
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Suffix a module file must end with to be bundled (default: .d.ts)
    #[serde(default = "default_suffix")]
    pub source_suffix: String,

    /// Suffix appended to the output name (default: .d.ts)
    #[serde(default = "default_suffix")]
    pub output_suffix: String,

    #[serde(default = "default_version_placeholder")]
    pub version_placeholder: String,

    /// Descend into nested module directories (default: true)
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Text inserted between consecutive body files (default: none).
    /// Unlike gulp-concat, nothing is inserted between the header and the
    /// first file; a header that should be followed by a blank line must end
    /// with one.
    #[serde(default)]
    pub separator: String,

    /// Glob patterns, relative to the source root, of files to skip
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_src_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_header() -> PathBuf {
    PathBuf::from("src/header.d.ts")
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_suffix() -> String {
    ".d.ts".to_string()
}

fn default_version_placeholder() -> String {
    DEFAULT_VERSION_PLACEHOLDER.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for BundleLayout {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            header: default_header(),
            out_dir: default_out_dir(),
            source_suffix: default_suffix(),
            output_suffix: default_suffix(),
            version_placeholder: default_version_placeholder(),
            recursive: true,
            separator: String::new(),
            exclude: Vec::new(),
        }
    }
}

impl BundleLayout {
    pub fn module_dir(&self, module: &str) -> PathBuf {
        self.src_dir.join(module)
    }

    pub fn output_path(&self, output_name: &str) -> PathBuf {
        self.out_dir
            .join(format!("{}{}", output_name, self.output_suffix))
    }

    /// Compile the exclusion globs
    pub fn exclude_patterns(&self) -> Result<Vec<glob::Pattern>> {
        self.exclude
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|e| {
                    BuildError::Config(format!("invalid exclude pattern '{}': {}", pattern, e))
                })
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_suffix.is_empty() {
            return Err(BuildError::Config(
                "sourceSuffix must not be empty".to_string(),
            ));
        }
        if self.version_placeholder.is_empty() {
            return Err(BuildError::Config(
                "versionPlaceholder must not be empty".to_string(),
            ));
        }
        self.exclude_patterns().map(|_| ())
    }
}

/// A named preset bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleTarget {
    pub name: String,

    /// Modules in concatenation order
    pub modules: Vec<String>,

    #[serde(default)]
    pub rewrite: Option<RewriteRule>,
}

impl BundleTarget {
    pub fn new(name: &str, modules: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            modules: modules.iter().map(|m| m.to_string()).collect(),
            rewrite: None,
        }
    }

    pub fn with_rewrite(mut self, rule: RewriteRule) -> Self {
        self.rewrite = Some(rule);
        self
    }

    pub fn to_spec(&self) -> BundleSpec {
        BundleSpec {
            modules: self.modules.clone(),
            output_name: self.name.clone(),
            rewrite_rule: self.rewrite.clone(),
        }
    }
}

/// The bundles the upstream declarations are published as
pub fn default_targets() -> Vec<BundleTarget> {
    vec![
        BundleTarget::new("panorama", &["shared", "p2ce", "momentum"]),
        BundleTarget::new("csgo", &["shared"]).with_rewrite(RewriteRule {
            from: "Chaos".to_string(),
            to: "CSGO".to_string(),
        }),
        BundleTarget::new("p2ce", &["shared", "p2ce"]),
        BundleTarget::new("momentum", &["shared", "momentum"]),
    ]
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleConfig {
    #[serde(default)]
    pub layout: BundleLayout,

    #[serde(default = "default_targets")]
    pub targets: Vec<BundleTarget>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            layout: BundleLayout::default(),
            targets: default_targets(),
        }
    }
}

/// Values given on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub src_dir: Option<PathBuf>,
    pub header: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub recursive: Option<bool>,
}

impl BundleConfig {
    /// Load configuration from a YAML or JSON file, chosen by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BuildError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_yaml(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| BuildError::Config(e.to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| BuildError::Config(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| BuildError::Config(e.to_string()))
    }

    pub fn merge(&mut self, overrides: &CliOverrides) {
        if let Some(ref src_dir) = overrides.src_dir {
            self.layout.src_dir = src_dir.clone();
        }
        if let Some(ref header) = overrides.header {
            self.layout.header = header.clone();
        }
        if let Some(ref out_dir) = overrides.out_dir {
            self.layout.out_dir = out_dir.clone();
        }
        if let Some(recursive) = overrides.recursive {
            self.layout.recursive = recursive;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        for target in &self.targets {
            if target.name.is_empty() {
                return Err(BuildError::Config("target name must not be empty".to_string()));
            }
            if let Some(ref rule) = target.rewrite {
                rule.validate()?;
            }
        }
        Ok(())
    }

    pub fn target(&self, name: &str) -> Result<&BundleTarget> {
        self.targets
            .iter()
            .find(|target| target.name == name)
            .ok_or_else(|| BuildError::UnknownTarget {
                name: name.to_string(),
                available: self.target_names().join(", "),
            })
    }

    /// Rewrite rule of the target named `output_name`, if any. Building a
    /// bundle under a target's name applies that target's rewrite.
    pub fn rewrite_for(&self, output_name: &str) -> Option<RewriteRule> {
        self.targets
            .iter()
            .find(|target| target.name == output_name)
            .and_then(|target| target.rewrite.clone())
    }

    pub fn target_names(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.name.as_str()).collect()
    }
}
