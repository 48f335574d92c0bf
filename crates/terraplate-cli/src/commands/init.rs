//! `terraplate init`: create the manifest and environment directories.

use std::path::Path;

use tracing::{debug, instrument};

use terraplate_adapters::JsonManifestStore;
use terraplate_core::{application::ManifestStore, domain::ProjectManifest};

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
    prompt::{self, ScriptedPrompter},
};

/// Start a new Terraplate project.
///
/// Values not given as flags are prompted for on a terminal, and taken
/// from the configuration defaults otherwise.
#[instrument(skip_all)]
pub fn execute(
    args: InitArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let interactive = !args.yes && !global.quiet && prompt::can_prompt();
    let root = global.project_root();

    let name = match args.name {
        Some(name) => name,
        None => prompt::text("Project name", directory_name(&root).as_deref(), interactive)?
            .ok_or(CliError::MissingValue {
                what: "project name",
                flag: "--name",
            })?,
    };

    let environments = if args.environments.is_empty() {
        let default = config.defaults.environments.join(",");
        let answer = prompt::text("Environments (comma separated)", Some(&default), interactive)?;
        split_list(answer.as_deref().unwrap_or_default())
    } else {
        dedup(args.environments)
    };
    if environments.is_empty() {
        return Err(CliError::InvalidInput {
            message: "at least one environment is required".into(),
            source: None,
        });
    }

    let region = match args.region {
        Some(region) => region,
        None => prompt::text("AWS region", Some(&config.defaults.region), interactive)?
            .unwrap_or_else(|| config.defaults.region.clone()),
    };

    let mut manifest = ProjectManifest::new(name, environments, region);
    for service in args.services {
        manifest.register_service(service.into());
    }

    let mut force = args.force;
    let location = JsonManifestStore::new(&root);
    if location.exists() && !force && interactive {
        if !prompt::confirm(
            &format!("{} already exists. Overwrite?", location.location().display()),
            false,
            interactive,
        )? {
            return Err(CliError::Cancelled);
        }
        force = true;
    }

    debug!(project = %manifest.project_name, force, "Initialising project");
    let service = super::project_service(&global, &config, Box::new(ScriptedPrompter::default()))?;
    let manifest = service.init(manifest, force)?;

    if output.is_json() {
        output.json(&manifest)?;
        return Ok(());
    }

    output.success(&format!(
        "Initialised project '{}' in {}",
        manifest.project_name,
        root.display()
    ))?;
    output.print(&format!("  Region:       {}", manifest.region))?;
    output.print(&format!("  Environments: {}", manifest.environments.join(", ")))?;
    if !manifest.services.is_empty() {
        let services: Vec<_> = manifest.services.keys().cloned().collect();
        output.print(&format!("  Services:     {}", services.join(", ")))?;
    }
    output.print("")?;
    output.print("Next steps:")?;
    output.print("  terraplate add lambda --name <function>")?;

    Ok(())
}

/// Last component of the canonical project path.
fn directory_name(root: &Path) -> Option<String> {
    root.canonicalize()
        .ok()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

fn split_list(value: &str) -> Vec<String> {
    dedup(
        value
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn dedup(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
