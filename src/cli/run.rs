use std::path::Path;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use crate::cli::commands::RunArgs;
use crate::cli::settings::{build_platform, build_run_config, load_file_config};
use crate::config::OutputFormat;
use crate::errors::RemediatorError;
use crate::pipeline::RemediationOrchestrator;
use crate::reporting::formatter::format_summary_text;
use crate::reporting::SummaryDocument;
use tracing::{info, warn};

pub async fn handle_run(args: RunArgs, quiet: bool) -> Result<(), RemediatorError> {
    let file_config = load_file_config(&args.target).await?;
    let mut run_config = build_run_config(&args.target, &file_config, args.base_branch.as_deref())?;
    if args.dry_run {
        run_config.dry_run = true;
    }
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 {
            return Err(RemediatorError::Config("--concurrency must be at least 1".into()));
        }
        run_config.concurrency = concurrency;
    }
    let platform = build_platform(&args.target, &file_config)?;

    info!(
        repository = %run_config.repository,
        base_branch = %run_config.base_branch,
        concurrency = run_config.concurrency,
        "Starting remediation run"
    );

    // Ctrl-C stops new tasks from starting; in-flight tasks finish
    let cancel_token = CancellationToken::new();
    let signal_token = cancel_token.clone();
    let signal_handler = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, skipping tasks that have not started");
            signal_token.cancel();
        }
    });

    let orchestrator = RemediationOrchestrator::new(run_config, platform)
        .with_cancel_token(cancel_token);
    let result = orchestrator.run().await;
    signal_handler.abort();
    let summary = result?;

    let run_config = orchestrator.config();
    let document = SummaryDocument {
        run_id: run_config.run_id.clone(),
        repository: run_config.repository.to_string(),
        base_branch: run_config.base_branch.clone(),
        dry_run: run_config.dry_run,
        finished_at: Utc::now(),
        summary,
    };

    match args.output {
        OutputFormat::Json => println!("{}", document.to_json()?),
        OutputFormat::Text if !quiet => print!("{}", format_summary_text(&document.summary)),
        OutputFormat::Text => {}
    }

    if let Some(path) = &args.summary_file {
        document.write_to(Path::new(path)).await?;
    }

    if args.fail_on_error && document.summary.has_failures() {
        return Err(RemediatorError::TasksFailed(document.summary.tasks_failed));
    }
    Ok(())
}
