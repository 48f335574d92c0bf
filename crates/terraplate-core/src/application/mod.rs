//! Application layer for Terraplate.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (ProjectService, RelationshipResolver, InstanceGenerator)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    AddReport, EnvironmentReport, FileOutcome, GenerationReport, InstanceGenerator,
    ProjectService, RegenerateReport, RelationshipResolver,
};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, ManifestStore, Prompter, SelectionRole, TemplateRenderer};

pub use error::ApplicationError;
