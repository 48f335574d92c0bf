//! `terraplate connect`: add grants to an existing instance.

use tracing::{info, instrument};

use terraplate_core::domain::{InstanceRef, ServiceType};

use crate::{
    cli::{ConnectArgs, GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
    prompt,
};

#[instrument(skip_all, fields(service = %args.service, instance = %args.instance))]
pub fn execute(
    args: ConnectArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let interactive = !global.quiet && prompt::can_prompt();
    let current = InstanceRef::new(ServiceType::from(args.service), args.instance);

    let prompter = prompt::connect_prompter(args.access.clone(), interactive);
    let project = super::project_service(&global, &config, prompter)?;

    if !args.access.is_empty() {
        super::check_access(&project.load()?, &current, &args.access)?;
    }

    let report = project.connect(&current)?;
    info!(grants = report.grants.len(), "Connect finished");

    if report.grants.is_empty() && !output.is_json() {
        output.info(&format!("No connections made for {current}"))?;
        return Ok(());
    }
    super::print_run(&output, &report.grants, &report.generated, &report.skipped)
}
