use alert_remediator::cli::{self, Cli, Commands};
use alert_remediator::config::LogFormat;
use alert_remediator::errors::RemediatorError;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    // Logs go to stderr so summaries on stdout stay machine-readable
    match cli.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(!cli.no_color)
            .with_writer(std::io::stderr)
            .init(),
    }

    let result = match cli.command {
        Commands::Run(args) => cli::run::handle_run(args, cli.quiet).await,
        Commands::Plan(args) => cli::plan::handle_plan(args).await,
        Commands::Validate(args) => cli::validate::handle_validate(args).await,
    };

    match result {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            let exit_code = match &e {
                RemediatorError::Config(_) | RemediatorError::Yaml(_) => 2,
                RemediatorError::FeatureEnablement { .. } => 3,
                RemediatorError::AlertFetch(_) => 4,
                RemediatorError::TasksFailed(_) => 5,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }
}
