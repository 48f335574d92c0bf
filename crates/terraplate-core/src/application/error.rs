//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not business
//! rules. Business rule violations are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// No manifest at the expected location.
    #[error("No project manifest found at {path}")]
    ManifestNotFound { path: PathBuf },

    /// The manifest exists but is not a well-formed document.
    #[error("Failed to parse manifest {path}: {reason}")]
    ManifestParse { path: PathBuf, reason: String },

    /// A project manifest already exists where `init` would write one.
    #[error("A project already exists at {path}")]
    ManifestExists { path: PathBuf },

    /// A directory used as template source is missing.
    #[error("Template directory not found: {path}")]
    TemplateSourceNotFound { path: PathBuf },

    /// Template rendering failed.
    #[error("Failed to render template '{template}': {reason}")]
    RenderFailed { template: String, reason: String },

    /// Writing a file failed.
    #[error("Failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// Reading a file failed for a reason other than absence.
    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    /// Creating a directory failed.
    #[error("Failed to create directory {path}: {reason}")]
    DirectoryFailed { path: PathBuf, reason: String },

    /// Interactive selection failed.
    #[error("Prompt failed: {reason}")]
    PromptFailed { reason: String },

    /// The user aborted an interactive selection.
    #[error("Operation cancelled")]
    Cancelled,

    /// Store access failed (lock poisoned, etc.).
    #[error("Store lock poisoned")]
    StoreLockError,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ManifestNotFound { path } => vec![
                format!("Looked for: {}", path.display()),
                "Run 'terraplate init' first to initialize your project".into(),
                "Or point at a project with --project-dir".into(),
            ],
            Self::ManifestParse { path, .. } => vec![
                format!("Fix or restore {}", path.display()),
                "The manifest must be a JSON object with project_name, environments, region and services".into(),
            ],
            Self::ManifestExists { path } => vec![
                format!("Manifest already present: {}", path.display()),
                "Use --force to overwrite it (existing instances are forgotten)".into(),
                "Or add services to the existing project: terraplate add <service>".into(),
            ],
            Self::TemplateSourceNotFound { path } => vec![
                format!("Create {} or unset templates.local_path", path.display()),
            ],
            Self::RenderFailed { template, .. } => vec![
                format!("Check the template '{}' for unknown variables", template),
                "Built-in templates can be overridden via templates.local_path".into(),
            ],
            Self::WriteFailed { path, .. }
            | Self::ReadFailed { path, .. }
            | Self::DirectoryFailed { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Generation is idempotent: re-run the command once fixed".into(),
            ],
            Self::PromptFailed { .. } => vec![
                "Interactive input is unavailable".into(),
                "Pass the values as flags instead (see --help)".into(),
            ],
            Self::Cancelled => vec!["No changes were saved".into()],
            Self::StoreLockError => vec!["Try again in a moment".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ManifestNotFound { .. } | Self::TemplateSourceNotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::ManifestParse { .. } => ErrorCategory::Configuration,
            Self::ManifestExists { .. } => ErrorCategory::Conflict,
            Self::PromptFailed { .. } | Self::Cancelled => ErrorCategory::Validation,
            Self::RenderFailed { .. }
            | Self::WriteFailed { .. }
            | Self::ReadFailed { .. }
            | Self::DirectoryFailed { .. }
            | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}
