use crate::domain::{
    entities::{ProjectManifest, ServiceConfig},
    error::DomainError,
};

/// Centralized domain validation.
///
/// Names end up as directory names, S3 bucket prefixes and Terraform
/// identifiers, so all of them share one character set.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_instance_name(name: &str) -> Result<(), DomainError> {
        validate_name("instance", name)
    }

    pub fn validate_project_name(name: &str) -> Result<(), DomainError> {
        validate_name("project", name)
    }

    pub fn validate_environment_name(name: &str) -> Result<(), DomainError> {
        validate_name("environment", name)
    }

    pub fn validate_manifest(manifest: &ProjectManifest) -> Result<(), DomainError> {
        Self::validate_project_name(&manifest.project_name)?;
        if manifest.environments.is_empty() {
            return Err(DomainError::MissingRequiredField {
                field: "environments",
            });
        }
        for env in &manifest.environments {
            Self::validate_environment_name(env)?;
        }
        if manifest.region.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "region" });
        }
        validate_literal("region", &manifest.region)
    }

    /// Instance name plus every free-text value rendered into an HCL string.
    pub fn validate_service_config(config: &ServiceConfig) -> Result<(), DomainError> {
        Self::validate_instance_name(config.instance_name())?;
        match config {
            ServiceConfig::Lambda { handler, .. } => validate_literal("handler", handler),
            ServiceConfig::DynamoDb { hash_key, .. } => validate_literal("hash_key", hash_key),
            ServiceConfig::S3 { .. } => Ok(()),
        }
    }
}

/// Values are pasted between double quotes in templates, unescaped.
fn validate_literal(field: &'static str, value: &str) -> Result<(), DomainError> {
    let invalid = |reason: String| DomainError::InvalidConfig { field, reason };

    if value.trim().is_empty() {
        return Err(invalid("value cannot be empty".into()));
    }
    if let Some(c) = value.chars().find(|c| *c == '"' || *c == '\\' || c.is_control()) {
        return Err(invalid(format!("character {c:?} is not allowed")));
    }
    if let Some(seq) = ["${", "%{", "{{"].into_iter().find(|seq| value.contains(seq)) {
        return Err(invalid(format!("'{seq}' is not allowed")));
    }
    Ok(())
}

fn validate_name(kind: &'static str, name: &str) -> Result<(), DomainError> {
    let invalid = |reason: &str| DomainError::InvalidName {
        kind,
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name cannot be empty"));
    }
    if name.starts_with('.') || name.starts_with('-') {
        return Err(invalid("name cannot start with '.' or '-'"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(invalid(&format!("character '{c}' is not allowed")));
    }
    Ok(())
}
