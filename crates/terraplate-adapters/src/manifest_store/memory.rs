//! In-memory manifest store for testing.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use terraplate_core::{
    application::{ApplicationError, ports::ManifestStore},
    domain::{MANIFEST_FILE_NAME, ProjectManifest},
    error::TerraplateResult,
};

/// Manifest store keeping the manifest in memory.
///
/// Clones share state. Saves are counted so tests can assert the
/// save-once behavior of the services.
#[derive(Debug, Clone, Default)]
pub struct InMemoryManifestStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    manifest: Option<ProjectManifest>,
    saves: usize,
}

impl InMemoryManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `manifest`, as if loaded from disk.
    pub fn with_manifest(manifest: ProjectManifest) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.write() {
            inner.manifest = Some(manifest);
        }
        store
    }

    /// The stored manifest, if any.
    pub fn snapshot(&self) -> Option<ProjectManifest> {
        self.inner.read().ok()?.manifest.clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.inner.read().map(|inner| inner.saves).unwrap_or(0)
    }
}

impl ManifestStore for InMemoryManifestStore {
    fn load(&self) -> TerraplateResult<ProjectManifest> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.manifest.clone().ok_or_else(|| {
            ApplicationError::ManifestNotFound {
                path: self.location(),
            }
            .into()
        })
    }

    fn save(&self, manifest: &ProjectManifest) -> TerraplateResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let mut manifest = manifest.clone();
        manifest.normalize();
        inner.manifest = Some(manifest);
        inner.saves += 1;
        Ok(())
    }

    fn exists(&self) -> bool {
        self.inner
            .read()
            .is_ok_and(|inner| inner.manifest.is_some())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from(MANIFEST_FILE_NAME)
    }
}
