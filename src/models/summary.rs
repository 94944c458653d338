use serde::{Deserialize, Serialize};

/// Aggregate result of one remediation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub alerts_found: usize,
    pub tasks_planned: usize,
    pub tasks_succeeded: usize,
    pub tasks_failed: usize,
    pub tasks_skipped: usize,
    /// Created pull requests, in planner order.
    pub pull_request_urls: Vec<String>,
    /// Tasks needing manual intervention, in planner order.
    pub failures: Vec<TaskFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub branch_name: String,
    pub reason: String,
}

impl RunSummary {
    /// Every planned task reached exactly one terminal bucket.
    pub fn is_balanced(&self) -> bool {
        self.tasks_succeeded + self.tasks_failed + self.tasks_skipped == self.tasks_planned
    }

    pub fn has_failures(&self) -> bool {
        self.tasks_failed > 0
    }
}
