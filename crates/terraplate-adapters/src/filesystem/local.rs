//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use terraplate_core::{
    application::{ApplicationError, ports::Filesystem},
    error::TerraplateResult,
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> TerraplateResult<()> {
        std::fs::create_dir_all(path).map_err(|e| {
            ApplicationError::DirectoryFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> TerraplateResult<()> {
        std::fs::write(path, content).map_err(|e| {
            ApplicationError::WriteFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn read_file(&self, path: &Path) -> TerraplateResult<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApplicationError::ReadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
