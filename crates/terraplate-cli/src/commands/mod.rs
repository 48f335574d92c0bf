//! Command handlers.
//!
//! Each handler translates parsed arguments into calls on the core
//! services and prints the outcome.  Shared wiring lives here.

pub mod add;
pub mod completions;
pub mod config;
pub mod connect;
pub mod generate;
pub mod init;
pub mod list;
pub mod relations;

use serde::Serialize;
use tracing::debug;

use terraplate_adapters::{BuiltinRenderer, DirectoryRenderer, JsonManifestStore, LocalFilesystem};
use terraplate_core::{
    application::{
        GenerationReport, InstanceGenerator, ProjectService, Prompter, RelationshipResolver,
        TemplateRenderer,
    },
    domain::{DomainError, Grant, InstanceRef, PermissionRegistry, ProjectManifest},
};

use crate::{
    cli::{AccessSpec, GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Wire the project service against the project directory.
pub fn project_service(
    global: &GlobalArgs,
    config: &AppConfig,
    prompter: Box<dyn Prompter>,
) -> CliResult<ProjectService> {
    let root = global.project_root();
    let registry = PermissionRegistry::builtin();

    let renderer: Box<dyn TemplateRenderer> = match &config.templates.local_path {
        Some(path) => {
            let renderer = DirectoryRenderer::load(path)?;
            debug!(
                path = %path.display(),
                overrides = renderer.override_count(),
                "Using template overrides"
            );
            Box::new(renderer)
        }
        None => Box::new(BuiltinRenderer::new()),
    };

    Ok(ProjectService::new(
        Box::new(JsonManifestStore::new(&root)),
        RelationshipResolver::new(registry, prompter),
        InstanceGenerator::new(Box::new(LocalFilesystem::new()), renderer, registry, root),
    ))
}

/// Reject scripted grants that cannot apply to `current`, before anything
/// is written.
pub fn check_access(
    manifest: &ProjectManifest,
    current: &InstanceRef,
    access: &[AccessSpec],
) -> CliResult<()> {
    let registry = PermissionRegistry::builtin();
    for spec in access {
        if registry.lookup_template(current.service, spec.service).is_none() {
            return Err(DomainError::RelationNotFound {
                service: current.service.to_string(),
                related: spec.service.to_string(),
            }
            .into());
        }
        if !manifest.has_instances(spec.service) {
            return Err(DomainError::NoInstancesAvailable {
                service: spec.service.to_string(),
            }
            .into());
        }
        if !manifest.contains_instance(spec.service, &spec.instance) {
            return Err(DomainError::InstanceNotFound {
                service: spec.service.to_string(),
                instance: spec.instance.clone(),
            }
            .into());
        }
    }
    Ok(())
}

// ── reporting ─────────────────────────────────────────────────────────────────

/// JSON view of one recorded grant.
#[derive(Debug, Serialize)]
pub struct GrantView {
    pub holder: String,
    pub target: String,
    pub actions: Vec<String>,
}

impl From<&Grant> for GrantView {
    fn from(grant: &Grant) -> Self {
        Self {
            holder: grant.holder.to_string(),
            target: grant.target.to_string(),
            actions: grant.actions.clone(),
        }
    }
}

/// JSON view of one generated environment.
#[derive(Debug, Serialize)]
pub struct EnvironmentView {
    pub environment: String,
    pub backend: String,
    pub main: String,
    pub files: Vec<String>,
}

/// JSON view of one generated instance.
#[derive(Debug, Serialize)]
pub struct GeneratedView {
    pub instance: String,
    pub environments: Vec<EnvironmentView>,
}

impl From<&GenerationReport> for GeneratedView {
    fn from(report: &GenerationReport) -> Self {
        Self {
            instance: report.instance.to_string(),
            environments: report
                .environments
                .iter()
                .map(|env| EnvironmentView {
                    environment: env.environment.clone(),
                    backend: env.backend.to_string(),
                    main: env.main.to_string(),
                    files: env
                        .instance_files
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Outcome of a command that records grants and generates files.
#[derive(Debug, Serialize)]
pub struct RunView {
    pub grants: Vec<GrantView>,
    pub generated: Vec<GeneratedView>,
    pub skipped: Vec<String>,
}

impl RunView {
    pub fn new(grants: &[Grant], generated: &[GenerationReport], skipped: &[InstanceRef]) -> Self {
        Self {
            grants: grants.iter().map(GrantView::from).collect(),
            generated: generated.iter().map(GeneratedView::from).collect(),
            skipped: skipped.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Human-readable summary of grants, generation and skipped instances.
pub fn print_run(
    output: &OutputManager,
    grants: &[Grant],
    generated: &[GenerationReport],
    skipped: &[InstanceRef],
) -> CliResult<()> {
    if output.is_json() {
        output.json(&RunView::new(grants, generated, skipped))?;
        return Ok(());
    }

    for grant in grants {
        if grant.actions.is_empty() {
            output.warning(&format!(
                "{} -> {}: no access level chosen, nothing granted",
                grant.holder, grant.target
            ))?;
        } else {
            output.success(&format!("Granted {grant}"))?;
        }
    }

    for report in generated {
        output.success(&format!(
            "Generated {} ({} files)",
            report.instance,
            report.files_written()
        ))?;
        for env in &report.environments {
            output.print(&format!(
                "  {:<10} backend.tf {}, main.tf {}",
                env.environment, env.backend, env.main
            ))?;
        }
    }

    for instance in skipped {
        output.warning(&format!(
            "{instance} has no recorded configuration and was not regenerated"
        ))?;
    }
    Ok(())
}
