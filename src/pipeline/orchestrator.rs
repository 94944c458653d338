use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use chrono::Utc;
use futures::{stream, FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use crate::errors::{with_retry, RemediatorError};
use crate::models::{Feature, FeatureState, RemediationTask, RunSummary, TaskOutcome, TaskStatus};
use crate::platform::SecurityPlatform;
use super::aggregator::ResultAggregator;
use super::events::{EventSink, RunEvent};
use super::executor::{transition, RemediationExecutor};
use super::features::FeatureEnabler;
use super::fetcher::AlertFetcher;
use super::planner::RemediationPlanner;
use super::state::{Plan, RunConfig};
use tracing::{error, info};

/// Runs feature enablement, alert fetching, planning and execution for one repository.
pub struct RemediationOrchestrator {
    config: RunConfig,
    platform: Arc<dyn SecurityPlatform>,
    cancel_token: CancellationToken,
    events: EventSink,
}

impl RemediationOrchestrator {
    pub fn new(config: RunConfig, platform: Arc<dyn SecurityPlatform>) -> Self {
        Self {
            config,
            platform,
            cancel_token: CancellationToken::new(),
            events: EventSink::default(),
        }
    }

    /// Replace the orchestrator's cancel token with an external one (e.g. a Ctrl-C handler).
    /// Tasks that have not started when it fires are skipped; in-flight tasks finish.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// Attach an event channel for streaming run events to an observer.
    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        self.events = EventSink::new(tx);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Full run. Only feature-enablement and alert-fetch failures are returned as errors.
    pub async fn run(&self) -> Result<RunSummary, RemediatorError> {
        let repo = &self.config.repository;
        let started = Utc::now();
        info!(
            run_id = %self.config.run_id,
            repository = %repo,
            base_branch = %self.config.base_branch,
            dry_run = self.config.dry_run,
            platform = self.platform.platform_name(),
            "Remediation run started"
        );
        self.events.emit(RunEvent::RunStarted {
            run_id: self.config.run_id.clone(),
            repository: repo.to_string(),
            dry_run: self.config.dry_run,
        });

        let enabler = FeatureEnabler::new(self.platform.clone(), self.config.retry.clone(), self.config.dry_run);
        let features = enabler.ensure_all(repo).await?;
        for feature in Feature::ALL {
            self.events.emit(RunEvent::FeatureResolved {
                feature,
                state: features.get(feature),
            });
        }

        let plan = self.plan().await?;
        let mut aggregator = ResultAggregator::new(plan.alerts_found, plan.tasks.len());

        let summary = if self.config.dry_run {
            for mut task in plan.tasks {
                transition(&self.events, &mut task, TaskStatus::Skipped, Some("dry run".to_string()));
                aggregator.record(&task.outcome());
            }
            aggregator.finalize()
        } else if plan.tasks.is_empty() {
            aggregator.finalize()
        } else {
            self.execute_tasks(plan.tasks, features.automated_security_fixes, aggregator).await
        };

        info!(
            run_id = %self.config.run_id,
            alerts_found = summary.alerts_found,
            tasks_planned = summary.tasks_planned,
            succeeded = summary.tasks_succeeded,
            failed = summary.tasks_failed,
            skipped = summary.tasks_skipped,
            duration_ms = (Utc::now() - started).num_milliseconds(),
            "Remediation run completed"
        );
        self.events.emit(RunEvent::RunCompleted { summary: summary.clone() });
        Ok(summary)
    }

    /// Fetch and plan without touching features or creating anything.
    pub async fn plan(&self) -> Result<Plan, RemediatorError> {
        let repo = &self.config.repository;
        let alerts = AlertFetcher::new(self.platform.clone(), self.config.retry.clone())
            .fetch_all(repo)
            .await?;
        if alerts.is_empty() {
            info!(repository = %repo, "No security vulnerabilities found");
        }
        self.events.emit(RunEvent::AlertsFetched { count: alerts.len() });

        let planner = RemediationPlanner::new(self.config.ecosystem_filter.as_deref(), &self.config.branch_prefix);
        let tasks = planner.plan(&alerts);
        info!(repository = %repo, alerts = alerts.len(), tasks = tasks.len(), "Planned remediation");
        self.events.emit(RunEvent::TasksPlanned { count: tasks.len() });

        Ok(Plan {
            alerts_found: alerts.len(),
            tasks,
        })
    }

    async fn execute_tasks(
        &self,
        tasks: Vec<RemediationTask>,
        security_fixes: FeatureState,
        mut aggregator: ResultAggregator,
    ) -> RunSummary {
        let repo = &self.config.repository;
        let base_branch = &self.config.base_branch;

        let base_sha = match with_retry("branch_sha", &self.config.retry, || {
            self.platform.branch_sha(repo, base_branch)
        }).await {
            Ok(sha) => sha,
            Err(e) => {
                error!(repository = %repo, base_branch = %base_branch, error = %e, "Cannot resolve base branch");
                let reason = format!("base branch '{}' unavailable: {}", base_branch, e);
                for mut task in tasks {
                    transition(&self.events, &mut task, TaskStatus::Failed, Some(reason.clone()));
                    aggregator.record(&task.outcome());
                }
                return aggregator.finalize();
            }
        };

        let executor = RemediationExecutor::new(
            self.platform.clone(),
            repo.clone(),
            base_branch,
            &base_sha,
            self.config.retry.clone(),
        )
        .with_events(self.events.clone())
        .with_security_fixes(security_fixes);

        // One consumer owns the aggregator; outcomes may finish out of order.
        let mut outcomes = stream::iter(tasks)
            .map(|task| self.run_task(&executor, task))
            .buffer_unordered(self.config.concurrency.max(1));
        while let Some(outcome) = outcomes.next().await {
            aggregator.record(&outcome);
        }
        aggregator.finalize()
    }

    async fn run_task(&self, executor: &RemediationExecutor, mut task: RemediationTask) -> TaskOutcome {
        if self.cancel_token.is_cancelled() {
            transition(&self.events, &mut task, TaskStatus::Skipped, Some("cancelled".to_string()));
            return task.outcome();
        }

        let fallback = task.clone();
        match AssertUnwindSafe(executor.execute(task)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(_) => {
                let mut task = fallback;
                error!(branch = %task.branch_name, "Task panicked");
                transition(&self.events, &mut task, TaskStatus::Failed, Some("task panicked".to_string()));
                task.outcome()
            }
        }
    }
}
