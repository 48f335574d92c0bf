//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use clap::{Args, Parser, Subcommand, ValueEnum};

use terraplate_core::domain::{LambdaRuntime, ServiceType};

pub mod access;
pub mod global;
pub use access::AccessSpec;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "terraplate",
    bin_name = "terraplate",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{26a1} Incremental Terraform scaffolding for AWS",
    long_about = "Terraplate grows a Terraform project one service instance at a \
                  time, wiring IAM access between the instances it knows about.",
    after_help = "EXAMPLES:\n\
        \x20 terraplate init --name shop --env dev --env prod --region us-east-1\n\
        \x20 terraplate add dynamodb --name orders --yes\n\
        \x20 terraplate add lambda --name checkout --access dynamodb:orders:Read+Write\n\
        \x20 terraplate list --format json",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a new project in the project directory.
    #[command(
        about = "Initialise a project",
        after_help = "EXAMPLES:\n\
            \x20 terraplate init\n\
            \x20 terraplate init --name shop --env dev --env prod --yes\n\
            \x20 terraplate init --name shop --service lambda --service s3 --force"
    )]
    Init(InitArgs),

    /// Add a service instance and generate its Terraform.
    #[command(
        visible_alias = "a",
        about = "Add a service instance",
        after_help = "EXAMPLES:\n\
            \x20 terraplate add lambda --name checkout\n\
            \x20 terraplate add dynamodb --name orders --hash-key order_id --yes\n\
            \x20 terraplate add lambda --name checkout --access dynamodb:orders:Read\n\
            \x20 terraplate add s3 --name uploads --versioning --no-connect"
    )]
    Add(AddArgs),

    /// Grant access between an existing instance and others.
    #[command(
        about = "Connect an existing instance",
        after_help = "EXAMPLES:\n\
            \x20 terraplate connect lambda checkout\n\
            \x20 terraplate connect lambda checkout --access s3:receipts:Write"
    )]
    Connect(ConnectArgs),

    /// Regenerate Terraform for recorded instances.
    #[command(
        visible_alias = "gen",
        about = "Regenerate instance files",
        after_help = "EXAMPLES:\n\
            \x20 terraplate generate\n\
            \x20 terraplate generate lambda"
    )]
    Generate(GenerateArgs),

    /// Show the services, instances and grants of the project.
    #[command(
        visible_alias = "ls",
        about = "List project contents",
        after_help = "EXAMPLES:\n\
            \x20 terraplate list\n\
            \x20 terraplate list --format json"
    )]
    List(ListArgs),

    /// Show which service types can be connected and how.
    #[command(
        about = "Show supported relations",
        after_help = "EXAMPLES:\n\
            \x20 terraplate relations\n\
            \x20 terraplate relations lambda"
    )]
    Relations(RelationsArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 terraplate completions bash > ~/.local/share/bash-completion/completions/terraplate\n\
            \x20 terraplate completions zsh  > ~/.zfunc/_terraplate\n\
            \x20 terraplate completions fish > ~/.config/fish/completions/terraplate.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Terraplate configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 terraplate config get defaults.region\n\
            \x20 terraplate config list\n\
            \x20 terraplate config path"
    )]
    Config(ConfigCommands),
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `terraplate init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Project name; defaults to the project directory's name.
    #[arg(short = 'n', long = "name", value_name = "NAME", help = "Project name")]
    pub name: Option<String>,

    /// Environments to create.  Repeatable.
    #[arg(
        short = 'e',
        long = "env",
        value_name = "ENV",
        help = "Environment to create (repeatable)"
    )]
    pub environments: Vec<String>,

    /// AWS region for providers and state.
    #[arg(short = 'r', long = "region", value_name = "REGION", help = "AWS region")]
    pub region: Option<String>,

    /// Service types to record up front.  Repeatable.
    #[arg(
        short = 's',
        long = "service",
        value_name = "SERVICE",
        value_enum,
        help = "Service type to record (repeatable)"
    )]
    pub services: Vec<Service>,

    /// Replace an existing manifest.
    #[arg(short = 'f', long = "force", help = "Overwrite an existing project manifest")]
    pub force: bool,

    /// Take defaults instead of prompting.
    #[arg(short = 'y', long = "yes", help = "Use defaults for anything not given")]
    pub yes: bool,
}

// ── add ───────────────────────────────────────────────────────────────────────

/// Arguments for `terraplate add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Service type of the new instance.
    #[arg(value_enum, value_name = "SERVICE", help = "Service type")]
    pub service: Service,

    /// Instance name (function, table or bucket name).
    #[arg(short = 'n', long = "name", value_name = "NAME", help = "Instance name")]
    pub name: Option<String>,

    /// Lambda runtime.
    #[arg(
        long = "runtime",
        value_name = "RUNTIME",
        value_parser = parse_runtime,
        help = "Lambda runtime (python3.9, python3.11, nodejs18.x, nodejs20.x)"
    )]
    pub runtime: Option<LambdaRuntime>,

    /// Lambda handler.
    #[arg(long = "handler", value_name = "HANDLER", help = "Lambda handler")]
    pub handler: Option<String>,

    /// DynamoDB partition key.
    #[arg(long = "hash-key", value_name = "KEY", help = "DynamoDB hash key")]
    pub hash_key: Option<String>,

    /// Enable S3 bucket versioning.
    #[arg(long = "versioning", help = "Enable S3 versioning")]
    pub versioning: bool,

    /// Scripted grants instead of interactive selection.  Repeatable.
    #[arg(
        long = "access",
        value_name = "TYPE:INSTANCE:LEVEL[+LEVEL]",
        conflicts_with = "no_connect",
        help = "Grant to set up (repeatable), e.g. dynamodb:orders:Read+Write"
    )]
    pub access: Vec<AccessSpec>,

    /// Register and generate without connecting to other instances.
    #[arg(long = "no-connect", help = "Skip connecting to existing instances")]
    pub no_connect: bool,

    /// Take defaults instead of prompting.
    #[arg(short = 'y', long = "yes", help = "Use defaults for anything not given")]
    pub yes: bool,
}

// ── connect ───────────────────────────────────────────────────────────────────

/// Arguments for `terraplate connect`.
#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Service type of the existing instance.
    #[arg(value_enum, value_name = "SERVICE", help = "Service type")]
    pub service: Service,

    /// Name of the existing instance.
    #[arg(value_name = "INSTANCE", help = "Instance name")]
    pub instance: String,

    /// Scripted grants instead of interactive selection.  Repeatable.
    #[arg(
        long = "access",
        value_name = "TYPE:INSTANCE:LEVEL[+LEVEL]",
        help = "Grant to set up (repeatable)"
    )]
    pub access: Vec<AccessSpec>,
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `terraplate generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Only regenerate instances of this service type.
    #[arg(value_enum, value_name = "SERVICE", help = "Limit to one service type")]
    pub service: Option<Service>,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `terraplate list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Grouped by service, with grants.
    Table,
    /// One `service/instance` per line.
    List,
    /// JSON document.
    Json,
}

// ── relations ─────────────────────────────────────────────────────────────────

/// Arguments for `terraplate relations`.
#[derive(Debug, Args)]
pub struct RelationsArgs {
    /// Only show relations involving this service type.
    #[arg(value_enum, value_name = "SERVICE", help = "Limit to one service type")]
    pub service: Option<Service>,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `terraplate completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `terraplate config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.region`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the default configuration file.
    Path,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Service types accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum Service {
    Lambda,
    /// Also accepted as `dynamo` or `ddb`.
    #[value(name = "dynamodb", alias = "dynamo", alias = "ddb")]
    DynamoDb,
    S3,
}

impl From<Service> for ServiceType {
    fn from(service: Service) -> Self {
        match service {
            Service::Lambda => ServiceType::Lambda,
            Service::DynamoDb => ServiceType::DynamoDb,
            Service::S3 => ServiceType::S3,
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        ServiceType::from(*self).fmt(f)
    }
}

fn parse_runtime(s: &str) -> Result<LambdaRuntime, String> {
    s.parse().map_err(|e: terraplate_core::domain::DomainError| e.to_string())
}

// ── tests ─────────────────────────────────────────────────────────────────────
