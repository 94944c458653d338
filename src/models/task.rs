use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use super::alert::{Advisory, Severity};

/// Deduplication key: one task per package, ecosystem and manifest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskKey {
    pub package_name: String,
    pub ecosystem: String,
    pub manifest_path: String,
}

impl std::fmt::Display for TaskKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.ecosystem, self.package_name, self.manifest_path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    BranchReady,
    UpdateReady,
    PullRequestOpened,
    Failed,
    Skipped,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::PullRequestOpened | Self::Failed | Self::Skipped)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::BranchReady => write!(f, "branch-ready"),
            Self::UpdateReady => write!(f, "update-ready"),
            Self::PullRequestOpened => write!(f, "pull-request-opened"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Remote-generated fix proposal for one manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityUpdate {
    pub package_name: String,
    pub target_version: String,
}

/// One unit of work: open a single pull request for one key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationTask {
    /// Position in the planner's output.
    pub index: usize,
    pub key: TaskKey,
    pub source_alert_ids: BTreeSet<u64>,
    /// Highest severity among the collapsed alerts.
    pub severity: Severity,
    pub advisory: Advisory,
    pub patched_version: Option<String>,
    pub branch_name: String,
    pub status: TaskStatus,
    pub failure_reason: Option<String>,
    pub skip_reason: Option<String>,
    pub security_update: Option<SecurityUpdate>,
    pub pull_request_url: Option<String>,
}

impl RemediationTask {
    /// Terminal failure; the only place `failure_reason` is set.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = TaskStatus::Failed;
        self.failure_reason = Some(reason.into());
    }

    pub fn skip(&mut self, reason: impl Into<String>) {
        self.status = TaskStatus::Skipped;
        self.skip_reason = Some(reason.into());
    }

    pub fn outcome(&self) -> TaskOutcome {
        TaskOutcome {
            index: self.index,
            key: self.key.clone(),
            branch_name: self.branch_name.clone(),
            status: self.status,
            pull_request_url: self.pull_request_url.clone(),
            reason: self.failure_reason.clone().or_else(|| self.skip_reason.clone()),
        }
    }
}

/// Terminal result of executing one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub index: usize,
    pub key: TaskKey,
    pub branch_name: String,
    pub status: TaskStatus,
    pub pull_request_url: Option<String>,
    pub reason: Option<String>,
}
