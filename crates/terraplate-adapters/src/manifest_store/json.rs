//! JSON file manifest store.
//!
//! The manifest lives at `{root}/.terraplate.json`. Saves go through a
//! sibling temporary file that is renamed over the manifest, so a crash or a
//! failed write never leaves a truncated manifest behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use terraplate_core::{
    application::{ApplicationError, ports::ManifestStore},
    domain::{MANIFEST_FILE_NAME, ProjectManifest},
    error::TerraplateResult,
};

/// Production manifest store backed by a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonManifestStore {
    path: PathBuf,
}

impl JsonManifestStore {
    /// Store for the project rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            path: root.as_ref().join(MANIFEST_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl ManifestStore for JsonManifestStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> TerraplateResult<ProjectManifest> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ApplicationError::ManifestNotFound {
                    path: self.path.clone(),
                }
            } else {
                ApplicationError::ReadFailed {
                    path: self.path.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let manifest: ProjectManifest =
            serde_json::from_str(&raw).map_err(|e| ApplicationError::ManifestParse {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        debug!(services = manifest.services.len(), "Manifest loaded");
        Ok(manifest)
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn save(&self, manifest: &ProjectManifest) -> TerraplateResult<()> {
        let mut manifest = manifest.clone();
        manifest.normalize();

        let mut json = serde_json::to_string_pretty(&manifest).map_err(|e| {
            ApplicationError::WriteFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;
        json.push('\n');

        let tmp = self.temp_path();
        let written = fs::write(&tmp, json.as_bytes()).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(error = %cleanup, tmp = %tmp.display(), "Failed to remove temporary manifest");
                }
            }
            return Err(ApplicationError::WriteFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            }
            .into());
        }

        debug!("Manifest saved");
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}
