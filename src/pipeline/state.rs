use crate::errors::{RemediatorError, RetryConfig};
use crate::models::{RemediationTask, Repository};

pub const DEFAULT_BRANCH_PREFIX: &str = "alert-remediator";

/// Run-level configuration. Nothing here is inferred from the repository.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub run_id: String,
    pub repository: Repository,
    /// Pull request base branch.
    pub base_branch: String,
    /// Restrict remediation to one package ecosystem (case-insensitive).
    pub ecosystem_filter: Option<String>,
    /// Skip mutating calls and only produce a plan.
    pub dry_run: bool,
    /// Maximum tasks executed at once.
    pub concurrency: usize,
    pub branch_prefix: String,
    pub retry: RetryConfig,
}

impl RunConfig {
    pub fn new(repository: Repository, base_branch: &str) -> Result<Self, RemediatorError> {
        let base_branch = base_branch.trim();
        if base_branch.is_empty() {
            return Err(RemediatorError::Config("Base branch must not be empty".into()));
        }
        Ok(Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            repository,
            base_branch: base_branch.to_string(),
            ecosystem_filter: None,
            dry_run: false,
            concurrency: 1,
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            retry: RetryConfig::default(),
        })
    }
}

/// Output of planning without executing.
#[derive(Debug, Clone)]
pub struct Plan {
    pub alerts_found: usize,
    pub tasks: Vec<RemediationTask>,
}
