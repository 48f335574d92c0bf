//! Terraplate Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Terraplate
//! Terraform scaffolding tool, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         terraplate-cli (CLI)            │
//! │   (Commands, Prompters, Config)         │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (ProjectService, RelationshipResolver,  │
//! │         InstanceGenerator)              │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (ManifestStore, Filesystem, Renderer,   │
//! │              Prompter)                  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    terraplate-adapters (Infrastructure) │
//! │ (JsonManifestStore, LocalFilesystem,    │
//! │          BuiltinRenderer)               │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (ProjectManifest, PermissionRegistry,   │
//! │          ServiceCatalog)                │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use terraplate_core::prelude::*;
//!
//! let registry = PermissionRegistry::builtin();
//! let service = ProjectService::new(
//!     Box::new(store),
//!     RelationshipResolver::new(registry, Box::new(prompter)),
//!     InstanceGenerator::new(Box::new(filesystem), Box::new(renderer), registry, "."),
//! );
//! service.add_instance(ServiceConfig::lambda("checkout"), true)?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ApplicationError, GenerationReport, InstanceGenerator, ProjectService,
        RelationshipResolver,
        ports::{Filesystem, ManifestStore, Prompter, SelectionRole, TemplateRenderer},
    };
    pub use crate::domain::{
        DomainError, Grant, InstanceRef, LambdaRuntime, PermissionRegistry, ProjectManifest,
        RenderContext, ServiceConfig, ServiceType,
    };
    pub use crate::error::{TerraplateError, TerraplateResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
