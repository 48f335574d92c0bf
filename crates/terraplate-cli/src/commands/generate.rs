//! `terraplate generate`: rebuild instance files from the manifest.

use tracing::instrument;

use terraplate_core::domain::ServiceType;

use crate::{
    cli::{GenerateArgs, GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
    prompt::ScriptedPrompter,
};

#[instrument(skip_all)]
pub fn execute(
    args: GenerateArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let project = super::project_service(&global, &config, Box::new(ScriptedPrompter::default()))?;

    let spinner = output.spinner("Generating Terraform...");
    let result = project.regenerate(args.service.map(ServiceType::from));
    spinner.finish_and_clear();
    let report = result?;

    if report.generated.is_empty() && report.skipped.is_empty() && !output.is_json() {
        output.info("No instances to generate")?;
        return Ok(());
    }
    super::print_run(&output, &report.grants, &report.generated, &report.skipped)
}
