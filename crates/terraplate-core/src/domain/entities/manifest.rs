//! Project manifest: the durable record of services, instances and grants.
//!
//! The manifest is a plain serde document. Mutation goes through the methods
//! below so that the referential rules (grants only on registered instances,
//! no duplicate instance names) hold regardless of caller.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::entities::grant::{Grant, InstanceRef};
use crate::domain::entities::service_config::ServiceConfig;
use crate::domain::error::DomainError;
use crate::domain::value_objects::{ModuleName, ServiceType};

/// Fixed manifest file name, relative to the project root.
pub const MANIFEST_FILE_NAME: &str = ".terraplate.json";

/// Target service type → target instance → granted actions.
pub type AccessMap = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Root entity, one per project.
///
/// `BTreeMap` keeps the serialized form stable across runs, which keeps
/// manifest diffs readable under version control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    #[serde(alias = "ProjectName")]
    pub project_name: String,

    #[serde(alias = "Environments", default, deserialize_with = "null_as_default")]
    pub environments: Vec<String>,

    #[serde(alias = "Region", default)]
    pub region: String,

    #[serde(alias = "Services", default, deserialize_with = "null_as_default")]
    pub services: BTreeMap<String, ServiceRecord>,
}

/// One per distinct service type present in the project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub instances: BTreeMap<String, InstanceRecord>,
}

/// One per concrete instance of a service type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub access: AccessMap,

    /// Configuration the instance was generated from. Absent in manifests
    /// written before it was recorded; such instances cannot be regenerated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ServiceConfig>,
}

impl InstanceRecord {
    /// Granted actions on one target instance, if any.
    pub fn actions_on(&self, service: ServiceType, instance: &str) -> Option<&[String]> {
        self.access
            .get(service.as_str())
            .and_then(|instances| instances.get(instance))
            .map(Vec::as_slice)
    }

    /// Total number of target instances this record holds grants for.
    pub fn grant_count(&self) -> usize {
        self.access.values().map(BTreeMap::len).sum()
    }
}

impl ProjectManifest {
    pub fn new(
        project_name: impl Into<String>,
        environments: Vec<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            environments,
            region: region.into(),
            services: BTreeMap::new(),
        }
    }

    /// Lowercase the project name; applied by stores before writing.
    pub fn normalize(&mut self) {
        self.project_name = self.project_name.to_lowercase();
    }

    /// Add an empty service record if the type is not present yet.
    pub fn register_service(&mut self, service: ServiceType) {
        self.services
            .entry(service.as_str().to_string())
            .or_default();
    }

    /// Register a new, empty instance under `service`.
    pub fn register_instance(
        &mut self,
        service: ServiceType,
        instance: &str,
    ) -> Result<(), DomainError> {
        self.insert_instance(service, instance, InstanceRecord::default())
    }

    /// Register a new instance, keeping the configuration it is generated from.
    pub fn register_configured_instance(
        &mut self,
        config: &ServiceConfig,
    ) -> Result<(), DomainError> {
        let record = InstanceRecord {
            config: Some(config.clone()),
            ..InstanceRecord::default()
        };
        self.insert_instance(config.service_type(), config.instance_name(), record)
    }

    fn insert_instance(
        &mut self,
        service: ServiceType,
        instance: &str,
        new_record: InstanceRecord,
    ) -> Result<(), DomainError> {
        self.register_service(service);

        let record = self
            .services
            .get_mut(service.as_str())
            .ok_or_else(|| DomainError::ServiceNotFound {
                service: service.to_string(),
            })?;

        if record.instances.contains_key(instance) {
            return Err(DomainError::AlreadyExists {
                service: service.to_string(),
                instance: instance.to_string(),
            });
        }

        let module = ModuleName::from_instance(instance);
        if let Some(existing) = record
            .instances
            .keys()
            .find(|name| ModuleName::from_instance(name) == module)
        {
            return Err(DomainError::ModuleNameTaken {
                service: service.to_string(),
                instance: instance.to_string(),
                existing: existing.clone(),
                module: module.to_string(),
            });
        }

        record.instances.insert(instance.to_string(), new_record);
        Ok(())
    }

    /// Record `actions` on `(updated_service, updated_instance)` for the
    /// target instance.
    ///
    /// Replaces any earlier grant for the same target key; grants are not
    /// merged.
    pub fn grant_access(
        &mut self,
        updated_service: ServiceType,
        updated_instance: &str,
        target_service: ServiceType,
        target_instance: &str,
        actions: Vec<String>,
    ) -> Result<(), DomainError> {
        let record = self
            .services
            .get_mut(updated_service.as_str())
            .ok_or_else(|| DomainError::ServiceNotFound {
                service: updated_service.to_string(),
            })?;

        let instance = record.instances.get_mut(updated_instance).ok_or_else(|| {
            DomainError::InstanceNotFound {
                service: updated_service.to_string(),
                instance: updated_instance.to_string(),
            }
        })?;

        instance
            .access
            .entry(target_service.as_str().to_string())
            .or_default()
            .insert(target_instance.to_string(), actions);
        Ok(())
    }

    /// Apply a resolved grant.
    pub fn apply_grant(&mut self, grant: &Grant) -> Result<(), DomainError> {
        self.grant_access(
            grant.holder.service,
            &grant.holder.instance,
            grant.target.service,
            &grant.target.instance,
            grant.actions.clone(),
        )
    }

    /// Raw service keys, including types this build does not know about.
    pub fn list_service_types(&self) -> BTreeSet<String> {
        self.services.keys().cloned().collect()
    }

    /// Instance names of a service type, empty if the type is absent.
    pub fn list_instances(&self, service: ServiceType) -> Vec<String> {
        self.services
            .get(service.as_str())
            .map(|s| s.instances.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_instances(&self, service: ServiceType) -> bool {
        self.services
            .get(service.as_str())
            .is_some_and(|s| !s.instances.is_empty())
    }

    pub fn instance(&self, service: ServiceType, instance: &str) -> Option<&InstanceRecord> {
        self.services
            .get(service.as_str())
            .and_then(|s| s.instances.get(instance))
    }

    pub fn contains_instance(&self, service: ServiceType, instance: &str) -> bool {
        self.instance(service, instance).is_some()
    }

    /// Every instance of every known service type, in manifest order.
    ///
    /// Service keys this build does not recognize are skipped.
    pub fn instance_refs(&self) -> Vec<InstanceRef> {
        self.services
            .iter()
            .filter_map(|(key, record)| key.parse::<ServiceType>().ok().map(|s| (s, record)))
            .flat_map(|(service, record)| {
                record
                    .instances
                    .keys()
                    .map(move |name| InstanceRef::new(service, name.clone()))
            })
            .collect()
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> ProjectManifest {
        ProjectManifest::new("Shop", vec!["dev".into(), "prod".into()], "us-east-1")
    }

    #[test]
    fn register_service_is_idempotent() {
        let mut m = manifest();
        m.register_service(ServiceType::Lambda);
        m.register_instance(ServiceType::Lambda, "checkout").unwrap();
        m.register_service(ServiceType::Lambda);
        assert_eq!(m.list_instances(ServiceType::Lambda), vec!["checkout"]);
    }

    #[test]
    fn separator_variants_share_a_module_name() {
        let mut m = manifest();
        m.register_instance(ServiceType::Lambda, "my-func").unwrap();

        let err = m
            .register_instance(ServiceType::Lambda, "my_func")
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::ModuleNameTaken { ref existing, ref module, .. }
                if existing == "my-func" && module == "my_func"
        ));
        assert_eq!(m.list_instances(ServiceType::Lambda), vec!["my-func"]);

        // Other service types have their own module files.
        m.register_instance(ServiceType::DynamoDb, "my_func").unwrap();
    }

    #[test]
    fn duplicate_instance_is_rejected_without_losing_others() {
        let mut m = manifest();
        m.register_instance(ServiceType::DynamoDb, "orders").unwrap();
        m.register_instance(ServiceType::Lambda, "checkout").unwrap();

        let err = m
            .register_instance(ServiceType::Lambda, "checkout")
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::AlreadyExists {
                service: "lambda".into(),
                instance: "checkout".into(),
            }
        );
        assert_eq!(m.list_instances(ServiceType::DynamoDb), vec!["orders"]);
        assert_eq!(m.list_instances(ServiceType::Lambda), vec!["checkout"]);
    }

    #[test]
    fn same_name_under_different_services_is_allowed() {
        let mut m = manifest();
        m.register_instance(ServiceType::Lambda, "orders").unwrap();
        m.register_instance(ServiceType::DynamoDb, "orders").unwrap();
        assert!(m.contains_instance(ServiceType::Lambda, "orders"));
        assert!(m.contains_instance(ServiceType::DynamoDb, "orders"));
    }

    #[test]
    fn grant_requires_registered_service_and_instance() {
        let mut m = manifest();
        let err = m
            .grant_access(ServiceType::Lambda, "x", ServiceType::DynamoDb, "t", vec![])
            .unwrap_err();
        assert!(matches!(err, DomainError::ServiceNotFound { .. }));

        m.register_instance(ServiceType::Lambda, "checkout").unwrap();
        let err = m
            .grant_access(ServiceType::Lambda, "x", ServiceType::DynamoDb, "t", vec![])
            .unwrap_err();
        assert!(matches!(err, DomainError::InstanceNotFound { .. }));
    }

    #[test]
    fn grant_overwrites_previous_actions() {
        let mut m = manifest();
        m.register_instance(ServiceType::Lambda, "checkout").unwrap();
        m.grant_access(
            ServiceType::Lambda,
            "checkout",
            ServiceType::DynamoDb,
            "orders",
            vec!["dynamodb:GetItem".into()],
        )
        .unwrap();
        m.grant_access(
            ServiceType::Lambda,
            "checkout",
            ServiceType::DynamoDb,
            "orders",
            vec!["dynamodb:PutItem".into()],
        )
        .unwrap();

        let record = m.instance(ServiceType::Lambda, "checkout").unwrap();
        assert_eq!(
            record.actions_on(ServiceType::DynamoDb, "orders"),
            Some(&["dynamodb:PutItem".to_string()][..])
        );
        assert_eq!(record.grant_count(), 1);
    }

    #[test]
    fn list_instances_of_absent_service_is_empty() {
        assert!(manifest().list_instances(ServiceType::S3).is_empty());
        assert!(!manifest().has_instances(ServiceType::S3));
    }

    #[test]
    fn normalize_lowercases_project_name() {
        let mut m = manifest();
        m.normalize();
        assert_eq!(m.project_name, "shop");
    }

    #[test]
    fn deserializes_null_and_missing_services_as_empty() {
        let m: ProjectManifest = serde_json::from_str(
            r#"{"project_name":"shop","environments":["dev"],"region":"eu-west-1","services":null}"#,
        )
        .unwrap();
        assert!(m.services.is_empty());

        let m: ProjectManifest = serde_json::from_str(r#"{"project_name":"shop"}"#).unwrap();
        assert!(m.services.is_empty());
        assert!(m.environments.is_empty());
    }

    #[test]
    fn accepts_legacy_capitalized_fields() {
        let m: ProjectManifest = serde_json::from_str(
            r#"{
                "ProjectName": "shop",
                "Environments": ["dev", "prod"],
                "Region": "us-east-1",
                "Services": {"lambda": {"instances": {"checkout": {}}}}
            }"#,
        )
        .unwrap();
        assert_eq!(m.environments, vec!["dev", "prod"]);
        assert!(m.contains_instance(ServiceType::Lambda, "checkout"));
    }

    #[test]
    fn configured_instance_keeps_its_config() {
        let mut m = manifest();
        let config = ServiceConfig::lambda("checkout");
        m.register_configured_instance(&config).unwrap();

        let record = m.instance(ServiceType::Lambda, "checkout").unwrap();
        assert_eq!(record.config.as_ref(), Some(&config));
        assert!(record.access.is_empty());

        let err = m.register_configured_instance(&config).unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists { .. }));
    }

    #[test]
    fn instance_refs_skip_unknown_service_keys() {
        let mut m = manifest();
        m.register_instance(ServiceType::S3, "uploads").unwrap();
        m.register_instance(ServiceType::Lambda, "resizer").unwrap();
        m.services.insert("sqs".into(), ServiceRecord::default());

        assert_eq!(
            m.instance_refs(),
            vec![
                InstanceRef::new(ServiceType::Lambda, "resizer"),
                InstanceRef::new(ServiceType::S3, "uploads"),
            ]
        );
    }

    #[test]
    fn empty_access_is_omitted_when_serialized() {
        let mut m = manifest();
        m.register_instance(ServiceType::Lambda, "checkout").unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains(r#""checkout":{}"#));
        assert!(!json.contains("access"));
        assert!(!json.contains("config"));
    }
}
