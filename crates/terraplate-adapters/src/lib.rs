//! Infrastructure adapters for Terraplate.
//!
//! This crate implements the ports defined in
//! `terraplate_core::application::ports`. It contains the filesystem and
//! template I/O.

pub mod builtin_templates;
pub mod filesystem;
pub mod manifest_store;
pub mod renderer;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use manifest_store::{InMemoryManifestStore, JsonManifestStore};
pub use renderer::{BuiltinRenderer, DirectoryRenderer};
