//! Renderer reading template overrides from a directory.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── lambda/
//! │   ├── lambda.tf.tmpl
//! │   └── iam.tf.tmpl
//! └── s3/
//!     └── s3.tf.tmpl
//! ```
//!
//! Only files present on disk are overridden; every other template falls
//! back to the built-in body. Directories that are not a service type are
//! skipped with a warning.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use terraplate_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::{RenderContext, ServiceType},
    error::TerraplateResult,
};

use super::BuiltinRenderer;

/// File extension of template files.
const TEMPLATE_EXTENSION: &str = "tmpl";

/// Renders user-provided templates, falling back to the built-in ones.
#[derive(Debug, Clone)]
pub struct DirectoryRenderer {
    root: PathBuf,
    overrides: HashMap<(ServiceType, String), String>,
    fallback: BuiltinRenderer,
}

impl DirectoryRenderer {
    /// Read every `{root}/{service}/*.tmpl` file.
    ///
    /// # Errors
    ///
    /// - `TemplateSourceNotFound` if `root` is not a directory
    /// - `ReadFailed` if a template file cannot be read
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn load(root: impl AsRef<Path>) -> TerraplateResult<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ApplicationError::TemplateSourceNotFound {
                path: root.to_path_buf(),
            }
            .into());
        }

        let mut overrides = HashMap::new();
        for entry in WalkDir::new(root).min_depth(2).max_depth(2).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::ReadFailed {
                path: e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf),
                reason: e.to_string(),
            })?;
            let path = entry.path();

            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION)
            {
                continue;
            }

            let Some(service_dir) = path
                .parent()
                .and_then(Path::file_name)
                .and_then(|n| n.to_str())
            else {
                continue;
            };
            let Ok(service) = service_dir.parse::<ServiceType>() else {
                warn!(dir = %service_dir, "Skipping templates of unknown service type");
                continue;
            };
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let body = fs::read_to_string(path).map_err(|e| ApplicationError::ReadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            debug!(%service, template = name, "Template override loaded");
            overrides.insert((service, name.to_string()), body);
        }

        Ok(Self {
            root: root.to_path_buf(),
            overrides,
            fallback: BuiltinRenderer::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of templates read from disk.
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

impl TemplateRenderer for DirectoryRenderer {
    fn render(
        &self,
        service: ServiceType,
        template: &str,
        context: &RenderContext,
    ) -> TerraplateResult<Option<String>> {
        match self.overrides.get(&(service, template.to_string())) {
            Some(body) => super::render_strict(template, body, context).map(Some),
            None => self.fallback.render(service, template, context),
        }
    }
}
