pub mod grant;
pub mod manifest;
pub mod render_context;
pub mod service_config;

pub use crate::domain::DomainError;
pub use grant::{Grant, InstanceRef};
pub use manifest::{AccessMap, InstanceRecord, MANIFEST_FILE_NAME, ProjectManifest, ServiceRecord};
pub use render_context::{RenderContext, unresolved_placeholder};
pub use service_config::{DEFAULT_HANDLER, DEFAULT_HASH_KEY, ServiceConfig};
