//! On-disk declaration trees for integration tests

use crate::fixtures;
use pano_bundle_core::BundleLayout;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project directory with `src/` and `dist/` laid out like the
/// default [`BundleLayout`]
pub struct DeclarationTree {
    dir: TempDir,
}

impl DeclarationTree {
    /// Empty project with no header
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::create_dir_all(dir.path().join("src")).expect("create src dir");
        Self { dir }
    }

    pub fn with_header(header: &str) -> Self {
        let tree = Self::empty();
        tree.write("src/header.d.ts", header);
        tree
    }

    /// Header plus shared, p2ce and momentum modules from [`fixtures`]
    pub fn upstream() -> Self {
        let tree = Self::with_header(fixtures::header_template());
        tree.write("src/shared/apis.d.ts", fixtures::shared_apis());
        tree.write("src/shared/events.d.ts", fixtures::shared_chaos_events());
        tree.write("src/shared/panels.d.ts", fixtures::shared_panels());
        tree.write("src/shared/README.md", "# shared\n");
        tree.write("src/p2ce/campaign.d.ts", fixtures::p2ce_campaign());
        tree.write("src/momentum/index.d.ts", fixtures::momentum_index());
        tree
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a file relative to the project root, creating parent directories
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("read file")
    }

    /// Default layout with every path anchored at the project root
    pub fn layout(&self) -> BundleLayout {
        BundleLayout {
            src_dir: self.path("src"),
            header: self.path("src/header.d.ts"),
            out_dir: self.path("dist"),
            ..Default::default()
        }
    }
}
