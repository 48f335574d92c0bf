//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `terraplate-adapters` and the
//! CLI implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `ManifestStore`: Manifest persistence
//!   - `TemplateRenderer`: Template rendering
//!   - `Prompter`: Interactive selections during connection
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{Filesystem, ManifestStore, Prompter, SelectionRole, TemplateRenderer};

#[cfg(test)]
pub use output::{MockManifestStore, MockPrompter};
