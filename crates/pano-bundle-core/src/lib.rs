//! Declaration bundle builder
//!
//! Concatenates the `.d.ts` files of one or more modules behind a versioned
//! header and writes the result as a single bundle.

pub mod builder;
pub mod bundle;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod fs;
pub mod hash;
pub mod header;
pub mod rewrite;

pub use builder::BundleBuilder;
pub use bundle::{parse_module_list, AssembledBundle, BundleArtifact, BundleSpec};
pub use config::{BundleConfig, BundleLayout, BundleTarget, CliOverrides};
pub use errors::{BuildError, Result};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use header::Header;
pub use rewrite::RewriteRule;
