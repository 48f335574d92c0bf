// ============================================================================
// domain/error.rs - DOMAIN RULE VIOLATIONS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (the resolver hands them back after discarding its work)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Unknown service type '{name}'")]
    UnknownServiceType { name: String },

    #[error("Invalid {kind} name '{name}': {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: String,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    // ========================================================================
    // Conflicts
    // ========================================================================
    #[error("Instance '{instance}' already exists under {service}")]
    AlreadyExists { service: String, instance: String },

    #[error("Instance '{instance}' would share module name '{module}' with '{existing}' under {service}")]
    ModuleNameTaken {
        service: String,
        instance: String,
        existing: String,
        module: String,
    },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    #[error("Service '{service}' not found in project")]
    ServiceNotFound { service: String },

    #[error("Instance '{instance}' not found under {service}")]
    InstanceNotFound { service: String, instance: String },

    #[error("No permission template relates {service} and {related}")]
    RelationNotFound { service: String, related: String },

    #[error("No {service} instances available to receive the grant")]
    NoInstancesAvailable { service: String },

    // ========================================================================
    // Registry integrity
    // ========================================================================
    #[error("Invalid permission registry: {0}")]
    InvalidRegistry(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownServiceType { name } => vec![
                format!("'{}' is not a supported service", name),
                "Supported services: lambda, dynamodb, s3".into(),
                "Try: terraplate relations".into(),
            ],
            Self::InvalidName { reason, .. } => vec![
                format!("Name rejected: {}", reason),
                "Use letters, digits, '-' and '_' only".into(),
                "Examples: checkout, orders-table, user_uploads".into(),
            ],
            Self::AlreadyExists { service, instance } => vec![
                format!("{} already has an instance called '{}'", service, instance),
                "Choose a different instance name".into(),
                format!("To add grants to it instead: terraplate connect {service} {instance}"),
            ],
            Self::ModuleNameTaken { existing, .. } => vec![
                format!("'-' and '_' map to the same Terraform identifier as '{existing}'"),
                "Choose a name that differs by more than separators".into(),
            ],
            Self::ServiceNotFound { service } => vec![
                format!("No {} instances have been added yet", service),
                format!("Try: terraplate add {service}"),
            ],
            Self::InstanceNotFound { service, .. } => vec![
                "Check the instance name for typos".into(),
                format!("List existing instances with: terraplate list ({service})"),
            ],
            Self::RelationNotFound { service, related } => vec![
                format!("{} and {} cannot be connected", service, related),
                format!("See what {service} can connect to: terraplate relations {service}"),
            ],
            Self::NoInstancesAvailable { service } => vec![
                format!("Add a {} instance first: terraplate add {}", service, service),
            ],
            Self::InvalidRegistry(_) => vec![
                "The permission table is inconsistent".into(),
                "Please report this issue".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownServiceType { .. }
            | Self::InvalidName { .. }
            | Self::InvalidConfig { .. }
            | Self::MissingRequiredField { .. } => ErrorCategory::Validation,
            Self::AlreadyExists { .. } | Self::ModuleNameTaken { .. } => ErrorCategory::Conflict,
            Self::ServiceNotFound { .. }
            | Self::InstanceNotFound { .. }
            | Self::RelationNotFound { .. }
            | Self::NoInstancesAvailable { .. } => ErrorCategory::NotFound,
            Self::InvalidRegistry(_) => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    NotFound,
    Internal,
}
