use crate::models::{RunSummary, TaskFailure, TaskOutcome, TaskStatus};
use tracing::warn;

/// Folds task outcomes into a `RunSummary`.
///
/// Outcomes may arrive in any order; URLs and failures are put back into
/// planner order by task index when the summary is finalized.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    alerts_found: usize,
    tasks_planned: usize,
    succeeded: usize,
    failed: usize,
    skipped: usize,
    urls: Vec<(usize, String)>,
    failures: Vec<(usize, TaskFailure)>,
}

impl ResultAggregator {
    pub fn new(alerts_found: usize, tasks_planned: usize) -> Self {
        Self {
            alerts_found,
            tasks_planned,
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: &TaskOutcome) {
        match outcome.status {
            TaskStatus::PullRequestOpened => {
                self.succeeded += 1;
                if let Some(url) = &outcome.pull_request_url {
                    self.urls.push((outcome.index, url.clone()));
                }
            }
            TaskStatus::Skipped => self.skipped += 1,
            TaskStatus::Failed => {
                self.failed += 1;
                self.failures.push((outcome.index, TaskFailure {
                    branch_name: outcome.branch_name.clone(),
                    reason: outcome.reason.clone().unwrap_or_default(),
                }));
            }
            status => {
                warn!(branch = %outcome.branch_name, status = %status, "Recorded task that did not finish; counting as failed");
                self.failed += 1;
                self.failures.push((outcome.index, TaskFailure {
                    branch_name: outcome.branch_name.clone(),
                    reason: format!("task stopped in state {}", status),
                }));
            }
        }
    }

    pub fn finalize(mut self) -> RunSummary {
        self.urls.sort_by_key(|(index, _)| *index);
        self.failures.sort_by_key(|(index, _)| *index);
        RunSummary {
            alerts_found: self.alerts_found,
            tasks_planned: self.tasks_planned,
            tasks_succeeded: self.succeeded,
            tasks_failed: self.failed,
            tasks_skipped: self.skipped,
            pull_request_urls: self.urls.into_iter().map(|(_, url)| url).collect(),
            failures: self.failures.into_iter().map(|(_, f)| f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskKey;

    fn outcome(index: usize, status: TaskStatus) -> TaskOutcome {
        TaskOutcome {
            index,
            key: TaskKey {
                package_name: format!("pkg-{}", index),
                ecosystem: "npm".into(),
                manifest_path: "package.json".into(),
            },
            branch_name: format!("branch-{}", index),
            status,
            pull_request_url: (status == TaskStatus::PullRequestOpened)
                .then(|| format!("https://github.com/acme/web/pull/{}", index)),
            reason: (status == TaskStatus::Failed).then(|| "boom".to_string()),
        }
    }

    #[test]
    fn test_zero_tasks() {
        let summary = ResultAggregator::new(0, 0).finalize();
        assert_eq!(summary, RunSummary::default());
        assert!(summary.is_balanced());
    }

    #[test]
    fn test_counts_balance() {
        let mut agg = ResultAggregator::new(5, 3);
        agg.record(&outcome(0, TaskStatus::PullRequestOpened));
        agg.record(&outcome(1, TaskStatus::Failed));
        agg.record(&outcome(2, TaskStatus::Skipped));
        let summary = agg.finalize();
        assert_eq!(summary.tasks_succeeded, 1);
        assert_eq!(summary.tasks_failed, 1);
        assert_eq!(summary.tasks_skipped, 1);
        assert!(summary.is_balanced());
        assert_eq!(summary.failures[0].reason, "boom");
    }

    #[test]
    fn test_urls_restored_to_planner_order() {
        let mut agg = ResultAggregator::new(3, 3);
        agg.record(&outcome(2, TaskStatus::PullRequestOpened));
        agg.record(&outcome(0, TaskStatus::PullRequestOpened));
        agg.record(&outcome(1, TaskStatus::PullRequestOpened));
        let summary = agg.finalize();
        assert_eq!(summary.pull_request_urls, vec![
            "https://github.com/acme/web/pull/0",
            "https://github.com/acme/web/pull/1",
            "https://github.com/acme/web/pull/2",
        ]);
    }

    #[test]
    fn test_non_terminal_counts_as_failed() {
        let mut agg = ResultAggregator::new(1, 1);
        agg.record(&outcome(0, TaskStatus::BranchReady));
        let summary = agg.finalize();
        assert_eq!(summary.tasks_failed, 1);
        assert!(summary.is_balanced());
    }
}
