use tokio::sync::mpsc;
use crate::models::{Feature, FeatureState, RunSummary, TaskStatus};

/// Messages sent from a run to an attached observer.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Run started
    RunStarted {
        run_id: String,
        repository: String,
        dry_run: bool,
    },
    /// A feature was checked or enabled
    FeatureResolved {
        feature: Feature,
        state: FeatureState,
    },
    AlertsFetched {
        count: usize,
    },
    TasksPlanned {
        count: usize,
    },
    /// A task moved between states
    TaskTransition {
        index: usize,
        branch_name: String,
        from: TaskStatus,
        to: TaskStatus,
        reason: Option<String>,
    },
    RunCompleted {
        summary: RunSummary,
    },
}

/// Optional event channel shared by the orchestrator and executor.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Emit an event if a channel is attached. A dropped receiver is ignored.
    pub fn emit(&self, event: RunEvent) {
        if let Some(ref tx) = self.tx {
            let _ = tx.send(event);
        }
    }
}
