use crate::bundle::{AssembledBundle, BundleArtifact, BundleSpec};
use crate::config::BundleLayout;
use crate::discovery::discover_module_files;
use crate::errors::{BuildError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::hash::digest;
use crate::header::Header;
use std::sync::Arc;
use tracing::{debug, info};

/// Produces bundle artifacts from bundle specs
///
/// A builder holds only immutable state, so one instance can serve several
/// builds at once.
pub struct BundleBuilder {
    layout: BundleLayout,
    file_system: Arc<dyn FileSystem>,
}

impl BundleBuilder {
    /// Create a builder over the local disk
    pub fn new(layout: BundleLayout) -> Self {
        Self::with_file_system(layout, Arc::new(RealFileSystem::new()))
    }

    /// Create a builder with a custom file system (for testing)
    pub fn with_file_system(layout: BundleLayout, file_system: Arc<dyn FileSystem>) -> Self {
        Self {
            layout,
            file_system,
        }
    }

    pub fn layout(&self) -> &BundleLayout {
        &self.layout
    }

    /// Render the header, concatenate every module and apply the rewrite
    /// rule, without writing anything
    pub fn assemble(&self, spec: &BundleSpec, version: &str) -> Result<AssembledBundle> {
        // Everything that can be checked without I/O is checked first
        if version.is_empty() {
            return Err(BuildError::MissingVersion);
        }
        spec.validate()?;
        self.layout.validate()?;
        let excludes = self.layout.exclude_patterns()?;

        let fs = self.file_system.as_ref();

        let header = Header::load(fs, &self.layout.header, &self.layout.version_placeholder)?
            .render(version)?;
        debug!("Rendered header for version {}", version);

        let mut body = Vec::new();
        let mut files = Vec::new();
        for module in &spec.modules {
            let module_files = discover_module_files(fs, &self.layout, &excludes, module)?;
            debug!("Module '{}': {} file(s)", module, module_files.len());

            for path in module_files {
                let content = fs.read(&path).map_err(|source| BuildError::ReadModule {
                    path: path.clone(),
                    source,
                })?;

                // The separator never lands between the header and the first file
                if !files.is_empty() {
                    body.extend_from_slice(self.layout.separator.as_bytes());
                }
                body.extend_from_slice(&content);
                debug!("Appended: {:?}", path);
                files.push(path);
            }
        }

        let mut replacements = 0;
        if let Some(ref rule) = spec.rewrite_rule {
            let (rewritten, count) = rule.apply(&body);
            debug!("Rewrite {}: {} replacement(s)", rule, count);
            body = rewritten;
            replacements = count;
        }

        Ok(AssembledBundle {
            header,
            body,
            files,
            replacements,
        })
    }

    /// Assemble the bundle and write it to its output path, overwriting any
    /// previous artifact
    pub fn build(&self, spec: &BundleSpec, version: &str) -> Result<BundleArtifact> {
        let assembled = self.assemble(spec, version)?;
        let path = self.layout.output_path(&spec.output_name);
        let contents = assembled.contents();

        self.file_system
            .create_dir_all(&self.layout.out_dir)
            .map_err(|source| BuildError::WriteOutput {
                path: self.layout.out_dir.clone(),
                source,
            })?;

        self.file_system
            .write(&path, &contents)
            .map_err(|source| BuildError::WriteOutput {
                path: path.clone(),
                source,
            })?;

        let digest = digest(&contents);
        info!(
            "Generated: {:?} ({} file(s), {} bytes, blake3 {})",
            path,
            assembled.files.len(),
            contents.len(),
            &digest[..12]
        );

        Ok(BundleArtifact {
            path,
            contents,
            files: assembled.files,
            replacements: assembled.replacements,
            digest,
        })
    }
}
