use std::path::PathBuf;
use std::sync::Arc;
use crate::cli::commands::TargetArgs;
use crate::config::credentials::resolve_token;
use crate::config::{self, RemediatorConfig};
use crate::errors::RemediatorError;
use crate::models::Repository;
use crate::pipeline::planner::validate_branch_prefix;
use crate::pipeline::RunConfig;
use crate::platform::{GitHubPlatform, SecurityPlatform};

/// Parse the config file if one was given, otherwise start from defaults.
pub async fn load_file_config(target: &TargetArgs) -> Result<RemediatorConfig, RemediatorError> {
    match &target.config {
        Some(path) => config::parse_config(&PathBuf::from(path)).await,
        None => Ok(RemediatorConfig::default()),
    }
}

/// Build the run configuration. CLI flags win over file values.
pub fn build_run_config(
    target: &TargetArgs,
    file: &RemediatorConfig,
    base_branch: Option<&str>,
) -> Result<RunConfig, RemediatorError> {
    let repository = match (&target.repo, &file.repository) {
        (Some(repo), _) => repo.parse::<Repository>()?,
        (None, Some(repo)) => repo.clone(),
        (None, None) => {
            return Err(RemediatorError::Config(
                "No repository given: pass --repo owner/name or set `repository` in the config file".into(),
            ))
        }
    };

    let base_branch = base_branch
        .or(file.base_branch.as_deref())
        .ok_or_else(|| RemediatorError::Config(
            "No base branch given: pass --base-branch or set `base_branch` in the config file".into(),
        ))?;

    let mut run_config = RunConfig::new(repository, base_branch)?;
    run_config.ecosystem_filter = target.ecosystem.clone().or_else(|| file.ecosystem.clone());
    if let Some(prefix) = target.branch_prefix.as_ref().or(file.branch_prefix.as_ref()) {
        run_config.branch_prefix = validate_branch_prefix(prefix)?;
    }
    if let Some(retry) = &file.retry {
        run_config.retry = retry.clone();
    }
    if let Some(max_retries) = target.max_retries {
        run_config.retry.max_retries = max_retries;
    }
    if let Some(concurrency) = file.concurrency {
        run_config.concurrency = concurrency;
    }
    run_config.dry_run = file.dry_run.unwrap_or(false);

    Ok(run_config)
}

/// Create the GitHub client from the resolved token and API root.
pub fn build_platform(
    target: &TargetArgs,
    file: &RemediatorConfig,
) -> Result<Arc<dyn SecurityPlatform>, RemediatorError> {
    let token = resolve_token(target.token.as_deref(), file.token.as_deref()).ok_or_else(|| {
        RemediatorError::Config("No API token: pass --token or set GITHUB_TOKEN".into())
    })?;
    let api_url = target.api_url.as_deref().or(file.api_url.as_deref());
    Ok(Arc::new(GitHubPlatform::new(&token, api_url)?))
}
