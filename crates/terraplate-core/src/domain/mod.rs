// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Terraplate.
//!
//! This module contains pure business logic with no I/O. Loading and saving
//! the manifest, rendering templates and touching the filesystem are handled
//! via ports (traits) defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or terminal access
//! - **Few external crates**: std + thiserror + serde derives
//! - **Rich domain model**: Manifest rules live on `ProjectManifest`, relation
//!   rules live in the permission registry
//!
// Public API - what the world sees
pub mod catalog;
pub mod entities;
pub mod error;
pub mod permissions;
pub mod value_objects;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use catalog::{SERVICE_CATALOG, ServiceDef, service_def};
pub use entities::{
    AccessMap, Grant, InstanceRecord, InstanceRef, MANIFEST_FILE_NAME, ProjectManifest,
    DEFAULT_HANDLER, DEFAULT_HASH_KEY, RenderContext, ServiceConfig, ServiceRecord,
    unresolved_placeholder,
};
pub use error::{DomainError, ErrorCategory};
pub use permissions::{PERMISSION_TEMPLATES, PermissionRegistry, PermissionTemplate, RelationKey};
pub use validation::DomainValidator;
pub use value_objects::{LambdaRuntime, ModuleName, ServiceType, UpdateSide};
