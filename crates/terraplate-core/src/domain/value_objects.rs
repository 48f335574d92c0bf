//! Domain value objects: ServiceType, UpdateSide, LambdaRuntime, ModuleName.
//!
//! # Design
//!
//! These are pure value types, equality-by-value with no identity. They hold
//! NO relationship logic. Which services may relate, and how, lives in
//! `permissions.rs`; which templates a service renders lives in
//! `catalog.rs`. This file only defines the types, their wire names and
//! their `FromStr` parsers.
//!
//! # Adding New Service Types
//!
//! 1. Add the enum variant here
//! 2. Add the `as_str` arm and the `FromStr` arm here
//! 3. Add a `ServiceDef` in `catalog.rs` (and templates in the adapters)
//! 4. Add `PermissionTemplate` entries in `permissions.rs` for its relations

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── ServiceType ──────────────────────────────────────────────────────────────

/// A category of infrastructure component.
///
/// The ordering is only used to normalize unordered pairs in the permission
/// registry; it carries no meaning beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Lambda,
    #[serde(rename = "dynamodb")]
    DynamoDb,
    S3,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [Self::Lambda, Self::DynamoDb, Self::S3];

    /// Wire name, as used for manifest keys and directory names.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lambda => "lambda",
            Self::DynamoDb => "dynamodb",
            Self::S3 => "s3",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lambda" => Ok(Self::Lambda),
            "dynamodb" | "dynamo" | "ddb" => Ok(Self::DynamoDb),
            "s3" => Ok(Self::S3),
            other => Err(DomainError::UnknownServiceType {
                name: other.to_string(),
            }),
        }
    }
}

// ── UpdateSide ───────────────────────────────────────────────────────────────

/// Which side of a `source-to-target` relation stores the grant.
///
/// `Source` always means the first element of the template's literal key,
/// whichever order a caller passes the pair in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateSide {
    Source,
    Target,
}

impl UpdateSide {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

impl fmt::Display for UpdateSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── LambdaRuntime ─────────────────────────────────────────────────────────────

/// Runtimes offered when adding a Lambda function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LambdaRuntime {
    #[serde(rename = "python3.9")]
    Python39,
    #[serde(rename = "python3.11")]
    Python311,
    #[serde(rename = "nodejs18.x")]
    NodeJs18,
    #[default]
    #[serde(rename = "nodejs20.x")]
    NodeJs20,
}

impl LambdaRuntime {
    pub const ALL: [LambdaRuntime; 4] = [
        Self::Python39,
        Self::Python311,
        Self::NodeJs18,
        Self::NodeJs20,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Python39 => "python3.9",
            Self::Python311 => "python3.11",
            Self::NodeJs18 => "nodejs18.x",
            Self::NodeJs20 => "nodejs20.x",
        }
    }
}

impl fmt::Display for LambdaRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LambdaRuntime {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::InvalidConfig {
                field: "runtime",
                reason: format!(
                    "unsupported runtime '{s}' (expected one of: {})",
                    Self::ALL.map(|r| r.as_str()).join(", ")
                ),
            })
    }
}

// ── ModuleName ────────────────────────────────────────────────────────────────

/// Terraform module identifier derived from an instance name.
///
/// Terraform identifiers may not contain `-`, so it is replaced by `_`. The
/// derived name, not the raw instance name, is what duplicate detection in the
/// aggregation file looks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleName(String);

impl ModuleName {
    pub const FORBIDDEN_SEPARATOR: char = '-';

    pub fn from_instance(instance_name: &str) -> Self {
        Self(instance_name.replace(Self::FORBIDDEN_SEPARATOR, "_"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `module "<name>"` header used both to declare and to detect a block.
    pub fn declaration_header(&self) -> String {
        format!("module \"{}\"", self.0)
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
