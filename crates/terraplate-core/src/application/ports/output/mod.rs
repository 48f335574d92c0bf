//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `terraplate-adapters` crate provides the filesystem, manifest and
//! renderer implementations; the CLI provides the prompters.

use std::path::{Path, PathBuf};

use crate::domain::{InstanceRef, ProjectManifest, RenderContext, ServiceType};
use crate::error::TerraplateResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `terraplate_adapters::filesystem::LocalFilesystem` (production)
/// - `terraplate_adapters::filesystem::MemoryFilesystem` (testing)
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> TerraplateResult<()>;

    /// Write content to a file, replacing any previous content.
    fn write_file(&self, path: &Path, content: &str) -> TerraplateResult<()>;

    /// Read a file, returning `None` if it does not exist.
    fn read_file(&self, path: &Path) -> TerraplateResult<Option<String>>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for loading and persisting the project manifest.
///
/// Implemented by:
/// - `terraplate_adapters::manifest_store::JsonManifestStore` (production)
/// - `terraplate_adapters::manifest_store::InMemoryManifestStore` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait ManifestStore: Send + Sync {
    /// Read the persisted manifest.
    ///
    /// Fails with `ManifestNotFound` when absent and `ManifestParse` when the
    /// content is not a well-formed manifest.
    fn load(&self) -> TerraplateResult<ProjectManifest>;

    /// Persist the manifest, lowercasing the project name.
    ///
    /// On failure the previously stored manifest must be left intact.
    fn save(&self, manifest: &ProjectManifest) -> TerraplateResult<()>;

    /// Whether a manifest is currently stored.
    fn exists(&self) -> bool;

    /// Human-readable location, for messages.
    fn location(&self) -> PathBuf;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `terraplate_adapters::renderer::BuiltinRenderer` (templates compiled in)
/// - `terraplate_adapters::renderer::DirectoryRenderer` (user overrides on disk)
pub trait TemplateRenderer: Send + Sync {
    /// Render the named template of `service`.
    ///
    /// Returns `Ok(None)` when the renderer has no template by that name;
    /// callers skip such templates. Fails with `RenderFailed` naming the
    /// template when rendering itself goes wrong.
    fn render(
        &self,
        service: ServiceType,
        template: &str,
        context: &RenderContext,
    ) -> TerraplateResult<Option<String>>;
}

/// Role of the instances picked in [`Prompter::select_instances`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRole {
    /// The current instance holds the grant; picked instances are accessed.
    Targets,
    /// Picked instances hold the grant on the current instance.
    Holders,
}

/// Port for the interactive choices made while connecting an instance.
///
/// Implementations return a subset of the offered options. Returning an empty
/// selection is valid and simply means "nothing".
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    /// Pick which related service types to connect `current` to.
    fn select_relations(
        &self,
        current: &InstanceRef,
        candidates: &[ServiceType],
    ) -> TerraplateResult<Vec<ServiceType>>;

    /// Pick instances of `service` to relate to `current`.
    fn select_instances(
        &self,
        current: &InstanceRef,
        service: ServiceType,
        role: SelectionRole,
        candidates: &[String],
    ) -> TerraplateResult<Vec<String>>;

    /// Pick access levels for the grant `holder -> target`.
    fn select_access_levels(
        &self,
        holder: &InstanceRef,
        target: &InstanceRef,
        levels: &[&'static str],
    ) -> TerraplateResult<Vec<String>>;
}
