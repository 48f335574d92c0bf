//! Project Service - main application orchestrator.
//!
//! Every use case follows the same shape:
//! 1. Load the manifest fresh from the store
//! 2. Mutate an owned copy (register, resolve grants)
//! 3. Save it once
//! 4. Generate artifacts from the saved manifest
//!
//! Generation runs after the save so that a failed write on disk can be
//! repaired with `regenerate` instead of re-adding the instance.

use std::collections::BTreeSet;

use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::ManifestStore,
        services::{GenerationReport, InstanceGenerator, RelationshipResolver},
    },
    domain::{DomainValidator as validator, Grant, InstanceRef, ProjectManifest, ServiceConfig, ServiceType},
    error::TerraplateResult,
};

/// Outcome of [`ProjectService::add_instance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddReport {
    pub instance: InstanceRef,
    pub grants: Vec<Grant>,
    /// The new instance first, then other instances whose grants changed.
    pub generated: Vec<GenerationReport>,
    /// Instances whose grants changed but that have no recorded config.
    pub skipped: Vec<InstanceRef>,
}

/// Outcome of [`ProjectService::connect`] and [`ProjectService::regenerate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegenerateReport {
    pub grants: Vec<Grant>,
    pub generated: Vec<GenerationReport>,
    pub skipped: Vec<InstanceRef>,
}

/// Orchestrates manifest, resolver and generator for the CLI commands.
pub struct ProjectService {
    store: Box<dyn ManifestStore>,
    resolver: RelationshipResolver,
    generator: InstanceGenerator,
}

impl ProjectService {
    pub fn new(
        store: Box<dyn ManifestStore>,
        resolver: RelationshipResolver,
        generator: InstanceGenerator,
    ) -> Self {
        Self {
            store,
            resolver,
            generator,
        }
    }

    pub fn resolver(&self) -> &RelationshipResolver {
        &self.resolver
    }

    /// Load the current manifest.
    pub fn load(&self) -> TerraplateResult<ProjectManifest> {
        self.store.load()
    }

    /// Start a new project: environment directories plus an empty manifest.
    ///
    /// Refuses to replace an existing manifest unless `force` is set.
    #[instrument(skip_all, fields(project = %manifest.project_name))]
    pub fn init(&self, manifest: ProjectManifest, force: bool) -> TerraplateResult<ProjectManifest> {
        validator::validate_manifest(&manifest)?;

        if self.store.exists() {
            if !force {
                return Err(ApplicationError::ManifestExists {
                    path: self.store.location(),
                }
                .into());
            }
            warn!(path = %self.store.location().display(), "Overwriting existing manifest");
        }

        self.generator.prepare_environments(&manifest.environments)?;

        let mut manifest = manifest;
        manifest.normalize();
        self.store.save(&manifest)?;

        info!(environments = manifest.environments.len(), "Project initialized");
        Ok(manifest)
    }

    /// Add a new instance, optionally connecting it to existing ones.
    ///
    /// Registration and all grants are saved together, once.
    #[instrument(
        skip_all,
        fields(service = %config.service_type(), instance = %config.instance_name())
    )]
    pub fn add_instance(&self, config: ServiceConfig, connect: bool) -> TerraplateResult<AddReport> {
        validator::validate_service_config(&config)?;

        let mut manifest = self.store.load()?;
        manifest.register_configured_instance(&config)?;

        let current = InstanceRef::new(config.service_type(), config.instance_name());
        let grants = if connect {
            self.resolver.plan(&manifest, &current)?
        } else {
            Vec::new()
        };

        let manifest = RelationshipResolver::apply(manifest, &grants)?;
        self.store.save(&manifest)?;
        info!(grants = grants.len(), "Instance registered");

        let mut generated = vec![self.generator.generate(&manifest, &config)?];
        let others: Vec<_> = affected_holders(&grants)
            .into_iter()
            .filter(|holder| *holder != current)
            .collect();
        let (more, skipped) = self.generate_instances(&manifest, others)?;
        generated.extend(more);

        Ok(AddReport {
            instance: current,
            grants,
            generated,
            skipped,
        })
    }

    /// Connect an existing instance, then regenerate every instance whose
    /// grants changed.
    #[instrument(skip_all, fields(instance = %current))]
    pub fn connect(&self, current: &InstanceRef) -> TerraplateResult<RegenerateReport> {
        let manifest = self.store.load()?;
        let (manifest, grants) = self.resolver.connect(manifest, current, self.store.as_ref())?;

        let (generated, skipped) =
            self.generate_instances(&manifest, affected_holders(&grants))?;
        Ok(RegenerateReport {
            grants,
            generated,
            skipped,
        })
    }

    /// Regenerate all instances, or those of one service type, from the
    /// manifest as it is. Nothing is saved.
    #[instrument(skip_all)]
    pub fn regenerate(&self, service: Option<ServiceType>) -> TerraplateResult<RegenerateReport> {
        let manifest = self.store.load()?;
        let targets = manifest
            .instance_refs()
            .into_iter()
            .filter(|r| service.is_none_or(|s| r.service == s))
            .collect();

        let (generated, skipped) = self.generate_instances(&manifest, targets)?;
        Ok(RegenerateReport {
            grants: Vec::new(),
            generated,
            skipped,
        })
    }

    fn generate_instances(
        &self,
        manifest: &ProjectManifest,
        instances: Vec<InstanceRef>,
    ) -> TerraplateResult<(Vec<GenerationReport>, Vec<InstanceRef>)> {
        let mut generated = Vec::new();
        let mut skipped = Vec::new();

        for instance in instances {
            let config = manifest
                .instance(instance.service, &instance.instance)
                .and_then(|record| record.config.as_ref());
            match config {
                Some(config) => generated.push(self.generator.generate(manifest, config)?),
                None => {
                    warn!(%instance, "No recorded configuration, cannot regenerate");
                    skipped.push(instance);
                }
            }
        }
        Ok((generated, skipped))
    }
}

/// Distinct grant holders, in first-seen order.
fn affected_holders(grants: &[Grant]) -> Vec<InstanceRef> {
    let mut seen = BTreeSet::new();
    grants
        .iter()
        .filter(|g| seen.insert(g.holder.clone()))
        .map(|g| g.holder.clone())
        .collect()
}
