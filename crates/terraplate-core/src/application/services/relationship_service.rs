//! Relationship resolver.
//!
//! Turns a freshly added instance plus the user's selections into concrete
//! [`Grant`]s, and records them on the side of each relation that the
//! permission registry names as the update side.
//!
//! Resolution is split in two so that nothing touches the manifest until
//! every selection has been made:
//!
//! 1. [`RelationshipResolver::plan`] asks the [`Prompter`] and produces grants
//! 2. [`RelationshipResolver::apply`] records them on an owned manifest
//!
//! A failure in either step drops the whole in-memory copy; the persisted
//! manifest is only written by [`RelationshipResolver::connect`], once.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument};

use crate::{
    application::ports::{ManifestStore, Prompter, SelectionRole},
    domain::{
        DomainError, Grant, InstanceRef, PermissionRegistry, PermissionTemplate, ProjectManifest,
        ServiceType,
    },
    error::TerraplateResult,
};

/// Resolves and records cross-service grants.
pub struct RelationshipResolver {
    registry: PermissionRegistry,
    prompter: Box<dyn Prompter>,
}

impl RelationshipResolver {
    pub fn new(registry: PermissionRegistry, prompter: Box<dyn Prompter>) -> Self {
        Self { registry, prompter }
    }

    pub fn registry(&self) -> PermissionRegistry {
        self.registry
    }

    /// Related service types that currently have at least one instance.
    pub fn candidate_relations(
        &self,
        manifest: &ProjectManifest,
        current: ServiceType,
    ) -> Vec<ServiceType> {
        self.registry
            .available_relations(current)
            .into_iter()
            .filter(|service| *service != current && manifest.has_instances(*service))
            .collect()
    }

    /// Collect the grants the user wants for `current`.
    ///
    /// Returns an empty plan without prompting when no related service has
    /// instances yet.
    ///
    /// # Errors
    ///
    /// - `RelationNotFound` if a selected type has no registry entry
    /// - `NoInstancesAvailable` if a selected type has no instances
    /// - `InstanceNotFound` if the prompter returns an instance the manifest
    ///   does not hold
    #[instrument(skip_all, fields(instance = %current))]
    pub fn plan(
        &self,
        manifest: &ProjectManifest,
        current: &InstanceRef,
    ) -> TerraplateResult<Vec<Grant>> {
        let candidates = self.candidate_relations(manifest, current.service);
        if candidates.is_empty() {
            info!("No related instances to connect");
            return Ok(Vec::new());
        }

        let selected = self.prompter.select_relations(current, &candidates)?;
        debug!(?selected, "Relations selected");

        let mut grants = Vec::new();
        for other in dedup(selected) {
            let template = self.template_for(current.service, other)?;
            grants.extend(self.plan_relation(manifest, current, other, template)?);
        }

        info!(grants = grants.len(), "Relationship plan ready");
        Ok(grants)
    }

    /// Record planned grants on the manifest.
    ///
    /// Takes the manifest by value: on error the partially updated copy is
    /// dropped, so callers never observe a half-applied plan.
    pub fn apply(
        mut manifest: ProjectManifest,
        grants: &[Grant],
    ) -> TerraplateResult<ProjectManifest> {
        for grant in grants {
            if !manifest.contains_instance(grant.target.service, &grant.target.instance) {
                return Err(DomainError::InstanceNotFound {
                    service: grant.target.service.to_string(),
                    instance: grant.target.instance.clone(),
                }
                .into());
            }
            manifest.apply_grant(grant)?;
            debug!(%grant, "Grant recorded");
        }
        Ok(manifest)
    }

    /// Plan, apply and persist connections for an existing instance.
    ///
    /// The store is written exactly once, and only when at least one grant
    /// was planned. Returns the updated manifest and the grants recorded.
    #[instrument(skip_all, fields(instance = %current))]
    pub fn connect(
        &self,
        manifest: ProjectManifest,
        current: &InstanceRef,
        store: &dyn ManifestStore,
    ) -> TerraplateResult<(ProjectManifest, Vec<Grant>)> {
        if !manifest.contains_instance(current.service, &current.instance) {
            return Err(DomainError::InstanceNotFound {
                service: current.service.to_string(),
                instance: current.instance.clone(),
            }
            .into());
        }

        let grants = self.plan(&manifest, current)?;
        if grants.is_empty() {
            return Ok((manifest, grants));
        }

        let manifest = Self::apply(manifest, &grants)?;
        store.save(&manifest)?;
        info!(grants = grants.len(), "Connections saved");
        Ok((manifest, grants))
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn template_for(
        &self,
        current: ServiceType,
        other: ServiceType,
    ) -> TerraplateResult<&'static PermissionTemplate> {
        self.registry
            .lookup_template(current, other)
            .ok_or_else(|| {
                DomainError::RelationNotFound {
                    service: current.to_string(),
                    related: other.to_string(),
                }
                .into()
            })
    }

    fn plan_relation(
        &self,
        manifest: &ProjectManifest,
        current: &InstanceRef,
        other: ServiceType,
        template: &PermissionTemplate,
    ) -> TerraplateResult<Vec<Grant>> {
        let available = manifest.list_instances(other);
        if available.is_empty() {
            return Err(DomainError::NoInstancesAvailable {
                service: other.to_string(),
            }
            .into());
        }

        let role = if template.updated_service() == current.service {
            SelectionRole::Targets
        } else {
            SelectionRole::Holders
        };

        let chosen = self
            .prompter
            .select_instances(current, other, role, &available)?;

        let mut grants = Vec::new();
        for name in dedup(chosen) {
            if !available.contains(&name) {
                return Err(DomainError::InstanceNotFound {
                    service: other.to_string(),
                    instance: name,
                }
                .into());
            }

            let other_ref = InstanceRef::new(other, name);
            let (holder, target) = match role {
                SelectionRole::Targets => (current.clone(), other_ref),
                SelectionRole::Holders => (other_ref, current.clone()),
            };

            let levels = self.prompter.select_access_levels(
                &holder,
                &target,
                template.supported_access_levels,
            )?;
            let actions = template.expand(&levels);
            debug!(relation = %template.name(), %holder, %target, ?levels, "Access selected");

            grants.push(Grant {
                holder,
                target,
                actions,
            });
        }
        Ok(grants)
    }
}

/// Drop repeated selections, keeping first occurrences in order.
fn dedup<T: Ord + Clone>(items: Vec<T>) -> Vec<T> {
    let mut seen = BTreeSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MockManifestStore, MockPrompter};
    use crate::domain::{PermissionTemplate, UpdateSide};
    use crate::error::TerraplateError;

    /// Registry holding only the lambda/dynamodb relation.
    static LAMBDA_DYNAMODB: &[PermissionTemplate] = &[PermissionTemplate {
        source: ServiceType::Lambda,
        target: ServiceType::DynamoDb,
        update_side: UpdateSide::Source,
        supported_access_levels: &["Read", "Write", "Delete", "All"],
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
    }];

    fn manifest_with(instances: &[(ServiceType, &str)]) -> ProjectManifest {
        let mut m = ProjectManifest::new("shop", vec!["dev".into()], "us-east-1");
        for (service, name) in instances {
            m.register_instance(*service, name).unwrap();
        }
        m
    }

    fn resolver(registry: PermissionRegistry, prompter: MockPrompter) -> RelationshipResolver {
        RelationshipResolver::new(registry, Box::new(prompter))
    }

    fn lambda(name: &str) -> InstanceRef {
        InstanceRef::new(ServiceType::Lambda, name)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_candidates_means_no_prompt() {
        // MockPrompter panics on any unexpected call.
        let r = resolver(PermissionRegistry::new(LAMBDA_DYNAMODB), MockPrompter::new());
        let m = manifest_with(&[(ServiceType::Lambda, "my-func")]);

        let grants = r.plan(&m, &lambda("my-func")).unwrap();
        assert!(grants.is_empty());
    }

    #[test]
    fn lambda_reads_dynamodb_table() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_relations()
            .withf(|_, candidates| candidates == [ServiceType::DynamoDb])
            .times(1)
            .returning(|_, _| Ok(vec![ServiceType::DynamoDb]));
        prompter
            .expect_select_instances()
            .withf(|_, service, role, candidates| {
                *service == ServiceType::DynamoDb
                    && *role == SelectionRole::Targets
                    && candidates == ["orders"]
            })
            .times(1)
            .returning(|_, _, _, _| Ok(vec!["orders".into()]));
        prompter
            .expect_select_access_levels()
            .times(1)
            .returning(|_, _, _| Ok(vec!["Read".into()]));

        let r = resolver(PermissionRegistry::new(LAMBDA_DYNAMODB), prompter);
        let m = manifest_with(&[
            (ServiceType::DynamoDb, "orders"),
            (ServiceType::Lambda, "my-func"),
        ]);

        let grants = r.plan(&m, &lambda("my-func")).unwrap();
        let m = RelationshipResolver::apply(m, &grants).unwrap();

        let record = m.instance(ServiceType::Lambda, "my-func").unwrap();
        assert_eq!(
            record.actions_on(ServiceType::DynamoDb, "orders").unwrap(),
            ["dynamodb:GetItem", "dynamodb:Scan", "dynamodb:Query"]
        );
        assert!(
            m.instance(ServiceType::DynamoDb, "orders")
                .unwrap()
                .access
                .is_empty()
        );
    }

    #[test]
    fn adding_table_updates_selected_lambdas() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_relations()
            .returning(|_, _| Ok(vec![ServiceType::Lambda]));
        prompter
            .expect_select_instances()
            .withf(|_, _, role, _| *role == SelectionRole::Holders)
            .returning(|_, _, _, _| Ok(vec!["f1".into(), "f2".into()]));
        prompter
            .expect_select_access_levels()
            .times(2)
            .returning(|_, _, _| Ok(vec!["Write".into()]));

        let r = resolver(PermissionRegistry::new(LAMBDA_DYNAMODB), prompter);
        let m = manifest_with(&[
            (ServiceType::Lambda, "f1"),
            (ServiceType::Lambda, "f2"),
            (ServiceType::DynamoDb, "orders"),
        ]);

        let grants = r
            .plan(&m, &InstanceRef::new(ServiceType::DynamoDb, "orders"))
            .unwrap();
        let m = RelationshipResolver::apply(m, &grants).unwrap();

        for name in ["f1", "f2"] {
            assert_eq!(
                m.instance(ServiceType::Lambda, name)
                    .unwrap()
                    .actions_on(ServiceType::DynamoDb, "orders")
                    .unwrap(),
                ["dynamodb:PutItem", "dynamodb:UpdateItem"]
            );
        }
        assert!(
            m.instance(ServiceType::DynamoDb, "orders")
                .unwrap()
                .access
                .is_empty()
        );
    }

    #[test]
    fn target_side_relation_updates_lambda_when_adding_bucket() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_relations()
            .withf(|_, candidates| candidates == [ServiceType::Lambda])
            .returning(|_, _| Ok(vec![ServiceType::Lambda]));
        prompter
            .expect_select_instances()
            .withf(|_, _, role, _| *role == SelectionRole::Holders)
            .returning(|_, _, _, _| Ok(vec!["resizer".into()]));
        prompter
            .expect_select_access_levels()
            .withf(|holder, target, _| {
                holder.service == ServiceType::Lambda && target.service == ServiceType::S3
            })
            .returning(|_, _, _| Ok(vec!["Read".into()]));

        let r = resolver(PermissionRegistry::builtin(), prompter);
        let m = manifest_with(&[
            (ServiceType::Lambda, "resizer"),
            (ServiceType::S3, "uploads"),
        ]);

        let grants = r
            .plan(&m, &InstanceRef::new(ServiceType::S3, "uploads"))
            .unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].holder, lambda("resizer"));
        assert_eq!(grants[0].actions, strings(&["s3:GetObject", "s3:ListBucket"]));
    }

    #[test]
    fn multiple_levels_expand_in_order() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_relations()
            .returning(|_, _| Ok(vec![ServiceType::DynamoDb]));
        prompter
            .expect_select_instances()
            .returning(|_, _, _, _| Ok(vec!["orders".into()]));
        prompter
            .expect_select_access_levels()
            .returning(|_, _, _| Ok(vec!["Read".into(), "Write".into()]));

        let r = resolver(PermissionRegistry::new(LAMBDA_DYNAMODB), prompter);
        let m = manifest_with(&[
            (ServiceType::Lambda, "my-func"),
            (ServiceType::DynamoDb, "orders"),
        ]);

        let grants = r.plan(&m, &lambda("my-func")).unwrap();
        assert_eq!(
            grants[0].actions,
            strings(&[
                "dynamodb:GetItem",
                "dynamodb:Scan",
                "dynamodb:Query",
                "dynamodb:PutItem",
                "dynamodb:UpdateItem",
            ])
        );
    }

    #[test]
    fn unknown_level_records_empty_grant() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_relations()
            .returning(|_, _| Ok(vec![ServiceType::DynamoDb]));
        prompter
            .expect_select_instances()
            .returning(|_, _, _, _| Ok(vec!["orders".into()]));
        prompter
            .expect_select_access_levels()
            .returning(|_, _, _| Ok(vec!["Admin".into()]));

        let r = resolver(PermissionRegistry::new(LAMBDA_DYNAMODB), prompter);
        let m = manifest_with(&[
            (ServiceType::Lambda, "my-func"),
            (ServiceType::DynamoDb, "orders"),
        ]);

        let grants = r.plan(&m, &lambda("my-func")).unwrap();
        let m = RelationshipResolver::apply(m, &grants).unwrap();
        assert_eq!(
            m.instance(ServiceType::Lambda, "my-func")
                .unwrap()
                .actions_on(ServiceType::DynamoDb, "orders"),
            Some(&[][..])
        );
    }

    #[test]
    fn selecting_unrelated_type_fails_with_relation_not_found() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_relations()
            .returning(|_, _| Ok(vec![ServiceType::S3]));

        let r = resolver(PermissionRegistry::new(LAMBDA_DYNAMODB), prompter);
        let m = manifest_with(&[
            (ServiceType::Lambda, "my-func"),
            (ServiceType::DynamoDb, "orders"),
            (ServiceType::S3, "uploads"),
        ]);

        let err = r.plan(&m, &lambda("my-func")).unwrap_err();
        assert!(matches!(
            err,
            TerraplateError::Domain(DomainError::RelationNotFound { .. })
        ));
    }

    #[test]
    fn selecting_empty_type_fails_with_no_instances() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_relations()
            .returning(|_, _| Ok(vec![ServiceType::DynamoDb, ServiceType::S3]));
        prompter
            .expect_select_instances()
            .returning(|_, _, _, _| Ok(vec!["orders".into()]));
        prompter
            .expect_select_access_levels()
            .returning(|_, _, _| Ok(vec!["Read".into()]));

        let r = resolver(PermissionRegistry::builtin(), prompter);
        let m = manifest_with(&[
            (ServiceType::Lambda, "my-func"),
            (ServiceType::DynamoDb, "orders"),
        ]);

        let err = r.plan(&m, &lambda("my-func")).unwrap_err();
        assert!(matches!(
            err,
            TerraplateError::Domain(DomainError::NoInstancesAvailable { ref service }) if service == "s3"
        ));
    }

    #[test]
    fn unknown_selected_instance_is_rejected() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_relations()
            .returning(|_, _| Ok(vec![ServiceType::DynamoDb]));
        prompter
            .expect_select_instances()
            .returning(|_, _, _, _| Ok(vec!["ghost".into()]));

        let r = resolver(PermissionRegistry::new(LAMBDA_DYNAMODB), prompter);
        let m = manifest_with(&[
            (ServiceType::Lambda, "my-func"),
            (ServiceType::DynamoDb, "orders"),
        ]);

        let err = r.plan(&m, &lambda("my-func")).unwrap_err();
        assert!(matches!(
            err,
            TerraplateError::Domain(DomainError::InstanceNotFound { .. })
        ));
    }

    #[test]
    fn apply_rejects_grant_on_missing_target() {
        let m = manifest_with(&[(ServiceType::Lambda, "my-func")]);
        let grants = vec![Grant {
            holder: lambda("my-func"),
            target: InstanceRef::new(ServiceType::DynamoDb, "orders"),
            actions: strings(&["dynamodb:GetItem"]),
        }];

        let err = RelationshipResolver::apply(m, &grants).unwrap_err();
        assert!(matches!(
            err,
            TerraplateError::Domain(DomainError::InstanceNotFound { .. })
        ));
    }

    #[test]
    fn connect_without_grants_does_not_save() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_relations()
            .returning(|_, _| Ok(Vec::new()));
        let mut store = MockManifestStore::new();
        store.expect_save().never();

        let r = resolver(PermissionRegistry::new(LAMBDA_DYNAMODB), prompter);
        let m = manifest_with(&[
            (ServiceType::Lambda, "my-func"),
            (ServiceType::DynamoDb, "orders"),
        ]);

        let (after, grants) = r.connect(m.clone(), &lambda("my-func"), &store).unwrap();
        assert!(grants.is_empty());
        assert_eq!(after, m);
    }

    #[test]
    fn connect_saves_exactly_once() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_relations()
            .returning(|_, _| Ok(vec![ServiceType::DynamoDb]));
        prompter
            .expect_select_instances()
            .returning(|_, _, _, _| Ok(vec!["orders".into(), "users".into()]));
        prompter
            .expect_select_access_levels()
            .returning(|_, _, _| Ok(vec!["All".into()]));
        let mut store = MockManifestStore::new();
        store
            .expect_save()
            .withf(|m| {
                m.instance(ServiceType::Lambda, "my-func")
                    .is_some_and(|r| r.grant_count() == 2)
            })
            .times(1)
            .returning(|_| Ok(()));

        let r = resolver(PermissionRegistry::new(LAMBDA_DYNAMODB), prompter);
        let m = manifest_with(&[
            (ServiceType::Lambda, "my-func"),
            (ServiceType::DynamoDb, "orders"),
            (ServiceType::DynamoDb, "users"),
        ]);

        let (_, grants) = r.connect(m, &lambda("my-func"), &store).unwrap();
        assert_eq!(grants.len(), 2);
    }

    #[test]
    fn connect_unknown_instance_fails_before_prompting() {
        let r = resolver(PermissionRegistry::builtin(), MockPrompter::new());
        let mut store = MockManifestStore::new();
        store.expect_save().never();

        let err = r
            .connect(manifest_with(&[]), &lambda("ghost"), &store)
            .unwrap_err();
        assert!(matches!(
            err,
            TerraplateError::Domain(DomainError::InstanceNotFound { .. })
        ));
    }

    #[test]
    fn prompt_failure_leaves_manifest_untouched() {
        let mut prompter = MockPrompter::new();
        prompter
            .expect_select_relations()
            .returning(|_, _| Ok(vec![ServiceType::DynamoDb]));
        prompter
            .expect_select_instances()
            .returning(|_, _, _, _| Ok(vec!["orders".into()]));
        prompter
            .expect_select_access_levels()
            .returning(|_, _, _| Err(crate::application::ApplicationError::Cancelled.into()));
        let mut store = MockManifestStore::new();
        store.expect_save().never();

        let r = resolver(PermissionRegistry::new(LAMBDA_DYNAMODB), prompter);
        let m = manifest_with(&[
            (ServiceType::Lambda, "my-func"),
            (ServiceType::DynamoDb, "orders"),
        ]);

        assert!(r.connect(m, &lambda("my-func"), &store).is_err());
    }
}
