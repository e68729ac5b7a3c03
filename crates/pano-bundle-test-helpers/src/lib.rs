//! Test utilities and fixtures for pano-bundle
//!
//! Shared by the integration tests of the core and CLI crates.

pub mod fixtures;
pub mod tree;

pub use tree::DeclarationTree;
