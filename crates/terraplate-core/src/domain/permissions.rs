//! Permission registry.
//!
//! # Design Rationale
//!
//! Every relation between two service types is described exactly once by a
//! [`PermissionTemplate`]. A template is stored under its literal
//! `source-to-target` orientation but looked up by the *unordered* pair, so a
//! query for `(dynamodb, lambda)` finds the `lambda-to-dynamodb` entry. All
//! relation checks are O(n) table lookups over a handful of entries.
//!
//! # Adding a New Relation
//!
//! 1. Add one [`PermissionTemplate`] entry to [`PERMISSION_TEMPLATES`]
//! 2. That's it. `available_relations`, lookup and direction resolution all
//!    derive from the table.

use std::collections::BTreeSet;

use crate::domain::error::DomainError;
use crate::domain::value_objects::{ServiceType, UpdateSide};

// ── Relation key ─────────────────────────────────────────────────────────────

/// An unordered pair of service types.
///
/// Construction normalizes the order, so `RelationKey::new(a, b) ==
/// RelationKey::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationKey(ServiceType, ServiceType);

impl RelationKey {
    pub fn new(a: ServiceType, b: ServiceType) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub fn contains(&self, service: ServiceType) -> bool {
        self.0 == service || self.1 == service
    }
}

// ── Permission template ──────────────────────────────────────────────────────

/// Describes how one service type may be granted access to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionTemplate {
    /// First element of the literal key (`source-to-target`).
    pub source: ServiceType,

    /// Second element of the literal key.
    pub target: ServiceType,

    /// Which side's instance record stores the grant. In AWS terms this is
    /// the IAM identity: the side whose role gets the policy statement.
    pub update_side: UpdateSide,

    /// Human-facing access labels, in prompt order.
    pub supported_access_levels: &'static [&'static str],

    /// Access level → concrete IAM actions.
    pub action_map: &'static [(&'static str, &'static [&'static str])],

    /// Naming convention for the referenced resource attribute.
    pub resource_suffix: &'static str,
}

impl PermissionTemplate {
    pub fn key(&self) -> RelationKey {
        RelationKey::new(self.source, self.target)
    }

    /// The literal `source-to-target` name of this relation.
    pub fn name(&self) -> String {
        format!("{}-to-{}", self.source, self.target)
    }

    /// The service type whose instance records receive grants.
    pub const fn updated_service(&self) -> ServiceType {
        match self.update_side {
            UpdateSide::Source => self.source,
            UpdateSide::Target => self.target,
        }
    }

    /// The service type whose instances are referenced by grants.
    pub const fn referenced_service(&self) -> ServiceType {
        match self.update_side {
            UpdateSide::Source => self.target,
            UpdateSide::Target => self.source,
        }
    }

    /// Actions for one access level; unknown levels yield an empty slice.
    pub fn actions_for(&self, level: &str) -> &'static [&'static str] {
        self.action_map
            .iter()
            .find(|(name, _)| *name == level)
            .map(|(_, actions)| *actions)
            .unwrap_or(&[])
    }

    /// Expand access levels into concrete actions.
    ///
    /// Unknown levels are silently dropped. An action reachable through more
    /// than one level is kept once, at its first position.
    pub fn expand<S: AsRef<str>>(&self, levels: &[S]) -> Vec<String> {
        let mut actions: Vec<String> = Vec::new();
        for level in levels {
            for action in self.actions_for(level.as_ref()) {
                if !actions.iter().any(|a| a == action) {
                    actions.push((*action).to_string());
                }
            }
        }
        actions
    }

    /// Snake-cased suffix, usable inside a Terraform identifier.
    pub fn resource_suffix_ident(&self) -> String {
        self.resource_suffix.replace('-', "_")
    }
}

/// Access labels shared by every built-in relation.
const STANDARD_LEVELS: &[&str] = &["Read", "Write", "Delete", "All"];

/// Single source of truth for built-in relations.
pub static PERMISSION_TEMPLATES: &[PermissionTemplate] = &[
    PermissionTemplate {
        source: ServiceType::Lambda,
        target: ServiceType::DynamoDb,
        update_side: UpdateSide::Source,
        supported_access_levels: STANDARD_LEVELS,
        action_map: &[
            (
                "Read",
                &["dynamodb:GetItem", "dynamodb:Scan", "dynamodb:Query"],
            ),
            ("Write", &["dynamodb:PutItem", "dynamodb:UpdateItem"]),
            ("Delete", &["dynamodb:DeleteItem"]),
            ("All", &["dynamodb:*"]),
        ],
        resource_suffix: "table-arn",
    },
    PermissionTemplate {
        source: ServiceType::S3,
        target: ServiceType::Lambda,
        // The function's execution role holds the bucket policy statement.
        update_side: UpdateSide::Target,
        supported_access_levels: STANDARD_LEVELS,
        action_map: &[
            ("Read", &["s3:GetObject", "s3:ListBucket"]),
            ("Write", &["s3:PutObject", "s3:PutObjectAcl"]),
            ("Delete", &["s3:DeleteObject"]),
            ("All", &["s3:*"]),
        ],
        resource_suffix: "bucket-arn",
    },
];

// ── Registry ─────────────────────────────────────────────────────────────────

/// Read-only view over a table of permission templates.
///
/// Production code uses [`PermissionRegistry::builtin`]; tests and embedders
/// can supply their own table through [`PermissionRegistry::new`].
#[derive(Debug, Clone, Copy)]
pub struct PermissionRegistry {
    templates: &'static [PermissionTemplate],
}

impl PermissionRegistry {
    pub const fn new(templates: &'static [PermissionTemplate]) -> Self {
        Self { templates }
    }

    pub const fn builtin() -> Self {
        Self::new(PERMISSION_TEMPLATES)
    }

    pub fn templates(&self) -> &'static [PermissionTemplate] {
        self.templates
    }

    /// Every other service type that some template relates to `service`.
    pub fn available_relations(&self, service: ServiceType) -> BTreeSet<ServiceType> {
        self.templates
            .iter()
            .filter_map(|t| {
                if t.source == service {
                    Some(t.target)
                } else if t.target == service {
                    Some(t.source)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Find the template for a pair, in either orientation.
    pub fn lookup_template(
        &self,
        a: ServiceType,
        b: ServiceType,
    ) -> Option<&'static PermissionTemplate> {
        let key = RelationKey::new(a, b);
        self.templates.iter().find(|t| t.key() == key)
    }

    /// Reorient `(current, target)` as `(service to update, service referenced)`.
    pub fn resolve_update_direction(
        &self,
        current: ServiceType,
        target: ServiceType,
    ) -> Option<(ServiceType, ServiceType)> {
        self.lookup_template(current, target)
            .map(|t| (t.updated_service(), t.referenced_service()))
    }

    /// Check the table for entries that would make lookups ambiguous or
    /// expansions silently empty.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = BTreeSet::new();
        for template in self.templates {
            if template.source == template.target {
                return Err(DomainError::InvalidRegistry(format!(
                    "{} relates a service to itself",
                    template.name()
                )));
            }
            if !seen.insert(template.key()) {
                return Err(DomainError::InvalidRegistry(format!(
                    "{} is declared more than once",
                    template.name()
                )));
            }
            for level in template.supported_access_levels {
                if template.actions_for(level).is_empty() {
                    return Err(DomainError::InvalidRegistry(format!(
                        "{}: access level '{}' has no actions",
                        template.name(),
                        level
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
