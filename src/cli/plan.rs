use serde_json::json;
use crate::cli::commands::PlanArgs;
use crate::cli::settings::{build_platform, build_run_config, load_file_config};
use crate::config::OutputFormat;
use crate::errors::RemediatorError;
use crate::pipeline::RemediationOrchestrator;
use crate::reporting::formatter::format_plan;

/// Planning never reads or writes the base branch.
const PLAN_BASE_BRANCH: &str = "main";

pub async fn handle_plan(args: PlanArgs) -> Result<(), RemediatorError> {
    let file_config = load_file_config(&args.target).await?;
    let base_branch = file_config.base_branch.clone().unwrap_or_else(|| PLAN_BASE_BRANCH.to_string());
    let run_config = build_run_config(&args.target, &file_config, Some(&base_branch))?;
    let platform = build_platform(&args.target, &file_config)?;

    let orchestrator = RemediationOrchestrator::new(run_config, platform);
    let plan = orchestrator.plan().await?;

    match args.output {
        OutputFormat::Text => print!("{}", format_plan(&plan.tasks)),
        OutputFormat::Json => {
            let doc = json!({
                "repository": orchestrator.config().repository.to_string(),
                "alerts_found": plan.alerts_found,
                "tasks": plan.tasks,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}
