//! Terraform rendering of recorded grants.
//!
//! An instance holding grants gets, in its module directory:
//!
//! - one data source per granted target, found by the target's physical name,
//!   plus a `locals` entry `{target_ident}_{suffix}` holding its ARN
//!   (`ACCESS_VARIABLES`)
//! - one IAM policy statement per granted target (`ACCESS_POLICY_STATEMENTS`)

use std::fmt::Write as _;

use tracing::{debug, warn};

use crate::domain::{
    InstanceRecord, InstanceRef, ModuleName, PermissionRegistry, ServiceDef, ServiceType,
    service_def,
};

/// Rendered in place of `ACCESS_VARIABLES` when nothing is granted.
pub const NO_ACCESS_COMMENT: &str = "# No cross-service access granted.\n";

/// One granted target, resolved against the registry and catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessBinding {
    pub target: InstanceRef,
    pub actions: Vec<String>,
    /// Name of the `locals` entry holding the target ARN.
    pub local_name: String,
    physical_name: String,
    def: &'static ServiceDef,
}

impl AccessBinding {
    fn data_label(&self) -> String {
        ModuleName::from_instance(&self.target.instance).to_string()
    }

    fn sid(&self) -> String {
        let mut sid = pascal_case(self.target.service.as_str());
        sid.push_str(&pascal_case(&self.target.instance));
        sid
    }
}

/// The grants of one instance, in one environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    bindings: Vec<AccessBinding>,
}

impl AccessPolicy {
    /// Resolve the grants held by `record`.
    ///
    /// Grants on service types this build does not know, on pairs the
    /// registry no longer relates, or with no actions are left out.
    pub fn build(
        registry: PermissionRegistry,
        holder: ServiceType,
        record: &InstanceRecord,
        project: &str,
        environment: &str,
    ) -> Self {
        let mut bindings = Vec::new();

        for (service_key, targets) in &record.access {
            let Ok(service) = service_key.parse::<ServiceType>() else {
                warn!(service = %service_key, "Skipping grants on unknown service type");
                continue;
            };
            let Some(template) = registry.lookup_template(holder, service) else {
                warn!(%holder, %service, "Skipping grants on unrelated service type");
                continue;
            };
            let def = service_def(service);

            for (instance, actions) in targets {
                if actions.is_empty() {
                    debug!(%service, %instance, "Grant has no actions");
                    continue;
                }
                bindings.push(AccessBinding {
                    target: InstanceRef::new(service, instance.clone()),
                    actions: actions.clone(),
                    local_name: format!(
                        "{}_{}",
                        ModuleName::from_instance(instance),
                        template.resource_suffix_ident()
                    ),
                    physical_name: def.physical_name(project, instance, environment),
                    def,
                });
            }
        }

        Self { bindings }
    }

    pub fn bindings(&self) -> &[AccessBinding] {
        &self.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Data sources and the `locals` block exposing target ARNs.
    pub fn variables_hcl(&self) -> String {
        if self.is_empty() {
            return NO_ACCESS_COMMENT.to_string();
        }

        let mut out = String::new();
        for binding in &self.bindings {
            let _ = writeln!(
                out,
                "data \"{}\" \"{}\" {{\n  {} = \"{}\"\n}}\n",
                binding.def.data_source,
                binding.data_label(),
                binding.def.name_attribute,
                binding.physical_name
            );
        }

        out.push_str("locals {\n");
        for binding in &self.bindings {
            let _ = writeln!(
                out,
                "  {} = data.{}.{}.arn",
                binding.local_name,
                binding.def.data_source,
                binding.data_label()
            );
        }
        out.push_str("}\n");
        out
    }

    /// `statement` blocks for an `aws_iam_policy_document`, indented to sit
    /// inside it. Empty when nothing is granted.
    pub fn statements_hcl(&self) -> String {
        let mut out = String::new();
        for binding in &self.bindings {
            let _ = writeln!(out, "\n  statement {{");
            let _ = writeln!(out, "    sid     = \"{}\"", binding.sid());
            let _ = writeln!(out, "    effect  = \"Allow\"");
            let _ = writeln!(out, "    actions = [");
            for action in &binding.actions {
                let _ = writeln!(out, "      \"{action}\",");
            }
            let _ = writeln!(out, "    ]");
            let _ = writeln!(out, "    resources = [");
            for suffix in binding.def.arn_suffixes {
                if suffix.is_empty() {
                    let _ = writeln!(out, "      local.{},", binding.local_name);
                } else {
                    let _ = writeln!(out, "      \"${{local.{}}}{}\",", binding.local_name, suffix);
                }
            }
            let _ = writeln!(out, "    ]");
            let _ = writeln!(out, "  }}");
        }
        out
    }
}

fn pascal_case(s: &str) -> String {
    s.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
