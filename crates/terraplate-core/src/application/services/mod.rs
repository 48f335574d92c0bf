//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "add an instance" or "connect two instances".

pub mod access_policy;
pub mod generator_service;
pub mod project_service;
pub mod relationship_service;

pub use access_policy::{AccessBinding, AccessPolicy};
pub use generator_service::{
    EnvironmentReport, FileOutcome, GenerationReport, InstanceGenerator, backend_config,
    module_block, provider_header,
};
pub use project_service::{AddReport, ProjectService, RegenerateReport};
pub use relationship_service::RelationshipResolver;
