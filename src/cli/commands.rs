use clap::{Parser, Subcommand, Args};
use crate::config::{LogFormat, OutputFormat};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Parser)]
#[command(
    name = "alert-remediator",
    version,
    long_version = LONG_VERSION,
    about = "Open pull requests that fix Dependabot vulnerability alerts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enable security features, fetch alerts and open remediation pull requests
    Run(RunArgs),
    /// Fetch alerts and print the remediation plan without changing anything
    Plan(PlanArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Options shared by every command that talks to a repository.
#[derive(Args, Clone, Debug, Default)]
pub struct TargetArgs {
    /// Repository as owner/name
    #[arg(short, long)]
    pub repo: Option<String>,

    /// YAML configuration file
    #[arg(short, long, env = "ALERT_REMEDIATOR_CONFIG")]
    pub config: Option<String>,

    /// API token (defaults to GITHUB_TOKEN, then GH_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// REST API root, for GitHub Enterprise Server
    #[arg(long)]
    pub api_url: Option<String>,

    /// Only remediate alerts in this package ecosystem
    #[arg(long)]
    pub ecosystem: Option<String>,

    /// Prefix for remediation branch names
    #[arg(long)]
    pub branch_prefix: Option<String>,

    /// Retries per remote call on rate limits and transient failures
    #[arg(long)]
    pub max_retries: Option<u32>,
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Branch the pull requests target
    #[arg(short, long)]
    pub base_branch: Option<String>,

    /// Plan and report without enabling features or creating branches
    #[arg(long)]
    pub dry_run: bool,

    /// Maximum tasks executed at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Summary output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Also write the JSON summary to this file
    #[arg(long)]
    pub summary_file: Option<String>,

    /// Exit non-zero when any task fails
    #[arg(long)]
    pub fail_on_error: bool,
}

#[derive(Args, Clone, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Plan output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}
