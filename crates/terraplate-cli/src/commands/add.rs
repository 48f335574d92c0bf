//! `terraplate add`: register an instance, connect it and generate its files.
//!
//! Responsibility: turn arguments (or answers) into a `ServiceConfig`, pick
//! the prompter for the connect step, call the core service and report.
//! No business logic lives here.

use tracing::{info, instrument, warn};

use terraplate_core::domain::{InstanceRef, LambdaRuntime, ServiceConfig, ServiceType, service_def};

use crate::{
    cli::{AddArgs, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
    prompt,
};

#[instrument(skip_all, fields(service = %args.service))]
pub fn execute(
    args: AddArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let interactive = !args.yes && !global.quiet && prompt::can_prompt();
    let service_config = build_config(&args, &config, interactive)?;
    let current = InstanceRef::new(
        service_config.service_type(),
        service_config.instance_name(),
    );

    let connect = !args.no_connect;
    let prompter = prompt::connect_prompter(args.access.clone(), interactive && connect);
    let project = super::project_service(&global, &config, prompter)?;

    if !args.access.is_empty() {
        super::check_access(&project.load()?, &current, &args.access)?;
    }

    let report = project.add_instance(service_config, connect)?;
    info!(instance = %report.instance, grants = report.grants.len(), "Instance added");

    if !output.is_json() {
        output.success(&format!("Added {}", report.instance))?;
    }
    super::print_run(&output, &report.grants, &report.generated, &report.skipped)
}

/// Assemble the instance configuration from flags, answers and defaults.
fn build_config(args: &AddArgs, config: &AppConfig, interactive: bool) -> CliResult<ServiceConfig> {
    let service = ServiceType::from(args.service);
    warn_ignored_flags(args, service);

    let name = match &args.name {
        Some(name) => name.clone(),
        None => prompt::text(&format!("{} name", service_def(service).label), None, interactive)?
            .filter(|name| !name.is_empty())
            .ok_or(CliError::MissingValue {
                what: "instance name",
                flag: "--name",
            })?,
    };

    let service_config = match service {
        ServiceType::Lambda => {
            let runtime = match args.runtime {
                Some(runtime) => runtime,
                None => prompt::text(
                    "Runtime",
                    Some(config.defaults.runtime.as_str()),
                    interactive,
                )?
                .map(|answer| answer.parse::<LambdaRuntime>())
                .transpose()?
                .unwrap_or(config.defaults.runtime),
            };
            let handler = match &args.handler {
                Some(handler) => handler.clone(),
                None => prompt::text("Handler", Some(&config.defaults.handler), interactive)?
                    .unwrap_or_else(|| config.defaults.handler.clone()),
            };
            ServiceConfig::Lambda {
                function_name: name,
                runtime,
                handler,
            }
        }
        ServiceType::DynamoDb => {
            let hash_key = match &args.hash_key {
                Some(key) => key.clone(),
                None => prompt::text("Hash key", Some(&config.defaults.hash_key), interactive)?
                    .unwrap_or_else(|| config.defaults.hash_key.clone()),
            };
            ServiceConfig::DynamoDb {
                table_name: name,
                hash_key,
            }
        }
        ServiceType::S3 => ServiceConfig::S3 {
            bucket_name: name,
            versioning: args.versioning
                || prompt::confirm("Enable versioning?", false, interactive)?,
        },
    };
    Ok(service_config)
}

fn warn_ignored_flags(args: &AddArgs, service: ServiceType) {
    let ignored = [
        ("--runtime", args.runtime.is_some(), ServiceType::Lambda),
        ("--handler", args.handler.is_some(), ServiceType::Lambda),
        ("--hash-key", args.hash_key.is_some(), ServiceType::DynamoDb),
        ("--versioning", args.versioning, ServiceType::S3),
    ];
    for (flag, given, applies_to) in ignored {
        if given && applies_to != service {
            warn!(flag, %service, "Flag does not apply to this service and is ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn add_args(argv: &[&str]) -> AddArgs {
        let mut full = vec!["terraplate", "add"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Add(args) => args,
            other => panic!("expected Add, got {other:?}"),
        }
    }

    #[test]
    fn lambda_uses_configured_defaults() {
        let mut config = AppConfig::default();
        config.defaults.runtime = LambdaRuntime::Python311;
        config.defaults.handler = "app.main".into();

        let built = build_config(&add_args(&["lambda", "--name", "checkout"]), &config, false).unwrap();
        assert_eq!(
            built,
            ServiceConfig::Lambda {
                function_name: "checkout".into(),
                runtime: LambdaRuntime::Python311,
                handler: "app.main".into(),
            }
        );
    }

    #[test]
    fn flags_override_defaults() {
        let built = build_config(
            &add_args(&["dynamodb", "--name", "orders", "--hash-key", "order_id"]),
            &AppConfig::default(),
            false,
        )
        .unwrap();
        assert_eq!(
            built,
            ServiceConfig::DynamoDb {
                table_name: "orders".into(),
                hash_key: "order_id".into(),
            }
        );
    }

    #[test]
    fn s3_versioning_flag() {
        let built = build_config(
            &add_args(&["s3", "--name", "uploads", "--versioning"]),
            &AppConfig::default(),
            false,
        )
        .unwrap();
        assert_eq!(
            built,
            ServiceConfig::S3 {
                bucket_name: "uploads".into(),
                versioning: true,
            }
        );
    }

    #[test]
    fn missing_name_without_terminal_is_user_error() {
        let err = build_config(&add_args(&["lambda"]), &AppConfig::default(), false).unwrap_err();
        assert!(matches!(err, CliError::MissingValue { flag: "--name", .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
