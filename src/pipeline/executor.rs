use std::sync::Arc;
use crate::errors::{with_retry, RemediatorError, RetryConfig};
use crate::models::{FeatureState, RemediationTask, Repository, TaskOutcome, TaskStatus};
use crate::platform::{PullRequestRequest, SecurityPlatform};
use crate::reporting::formatter::{format_pull_request_body, format_pull_request_title};
use super::events::{EventSink, RunEvent};
use tracing::{info, warn};

/// Drives one task through branch, update and pull request creation.
///
/// Errors never escape `execute`: each one becomes the task's terminal
/// status plus a reason.
pub struct RemediationExecutor {
    platform: Arc<dyn SecurityPlatform>,
    repository: Repository,
    base_branch: String,
    base_sha: String,
    retry: RetryConfig,
    events: EventSink,
    security_fixes: FeatureState,
}

impl RemediationExecutor {
    pub fn new(
        platform: Arc<dyn SecurityPlatform>,
        repository: Repository,
        base_branch: &str,
        base_sha: &str,
        retry: RetryConfig,
    ) -> Self {
        Self {
            platform,
            repository,
            base_branch: base_branch.to_string(),
            base_sha: base_sha.to_string(),
            retry,
            events: EventSink::default(),
            security_fixes: FeatureState::Unknown,
        }
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// Resolved state of automated security fixes for the repository.
    /// `Unsupported` skips every task once its branch is ready.
    pub fn with_security_fixes(mut self, state: FeatureState) -> Self {
        self.security_fixes = state;
        self
    }

    pub async fn execute(&self, mut task: RemediationTask) -> TaskOutcome {
        if task.status == TaskStatus::Pending {
            self.create_branch(&mut task).await;
        }
        if task.status == TaskStatus::BranchReady {
            if self.security_fixes == FeatureState::Unsupported {
                let reason = "automated security updates unsupported".to_string();
                transition(&self.events, &mut task, TaskStatus::Skipped, Some(reason));
            } else {
                self.create_security_update(&mut task).await;
            }
        }
        if task.status == TaskStatus::UpdateReady {
            self.open_pull_request(&mut task).await;
        }
        task.outcome()
    }

    async fn create_branch(&self, task: &mut RemediationTask) {
        let result = with_retry("create_branch", &self.retry, || {
            self.platform.create_branch(&self.repository, &task.branch_name, &self.base_sha)
        }).await;

        match result {
            Ok(()) => transition(&self.events, task, TaskStatus::BranchReady, None),
            Err(RemediatorError::Conflict(_)) => {
                info!(branch = %task.branch_name, "Branch already exists, resuming");
                transition(&self.events, task, TaskStatus::BranchReady, None);
            }
            Err(e) => {
                let reason = format!("create branch: {}", e);
                transition(&self.events, task, TaskStatus::Failed, Some(reason));
            }
        }
    }

    async fn create_security_update(&self, task: &mut RemediationTask) {
        let result = with_retry("create_security_update", &self.retry, || {
            self.platform.create_security_update(&self.repository, &task.key, &task.branch_name)
        }).await;

        match result {
            Ok(Some(update)) => {
                task.security_update = Some(update);
                transition(&self.events, task, TaskStatus::UpdateReady, None);
            }
            Ok(None) => {
                transition(&self.events, task, TaskStatus::Skipped, Some("no fix available".to_string()));
            }
            Err(e) if e.is_not_applicable() => {
                let reason = format!("security update not applicable: {}", e);
                transition(&self.events, task, TaskStatus::Skipped, Some(reason));
            }
            Err(e) => {
                let reason = format!("create security update: {}", e);
                transition(&self.events, task, TaskStatus::Failed, Some(reason));
            }
        }
    }

    async fn open_pull_request(&self, task: &mut RemediationTask) {
        let request = PullRequestRequest {
            title: format_pull_request_title(task),
            head: task.branch_name.clone(),
            base: self.base_branch.clone(),
            body: format_pull_request_body(task),
        };
        let result = with_retry("create_pull_request", &self.retry, || {
            self.platform.create_pull_request(&self.repository, &request)
        }).await;

        match result {
            Ok(url) => {
                info!(branch = %task.branch_name, url = %url, "Pull request opened");
                task.pull_request_url = Some(url);
                transition(&self.events, task, TaskStatus::PullRequestOpened, None);
            }
            Err(e) => {
                let reason = format!("open pull request: {}", e);
                transition(&self.events, task, TaskStatus::Failed, Some(reason));
            }
        }
    }
}

/// Move `task` to `to`, log the transition and emit it.
pub(crate) fn transition(events: &EventSink, task: &mut RemediationTask, to: TaskStatus, reason: Option<String>) {
    let from = task.status;
    match to {
        TaskStatus::Failed => task.fail(reason.clone().unwrap_or_else(|| "unknown error".to_string())),
        TaskStatus::Skipped => task.skip(reason.clone().unwrap_or_else(|| "skipped".to_string())),
        other => task.status = other,
    }

    if to == TaskStatus::Failed {
        warn!(branch = %task.branch_name, from = %from, to = %to, reason = reason.as_deref().unwrap_or(""), "Task transition");
    } else {
        info!(branch = %task.branch_name, from = %from, to = %to, reason = reason.as_deref().unwrap_or(""), "Task transition");
    }

    events.emit(RunEvent::TaskTransition {
        index: task.index,
        branch_name: task.branch_name.clone(),
        from,
        to,
        reason,
    });
}
