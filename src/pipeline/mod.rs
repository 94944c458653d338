pub mod aggregator;
pub mod events;
pub mod executor;
pub mod features;
pub mod fetcher;
pub mod orchestrator;
pub mod planner;
pub mod state;

pub use aggregator::ResultAggregator;
pub use events::{EventSink, RunEvent};
pub use executor::RemediationExecutor;
pub use features::FeatureEnabler;
pub use fetcher::AlertFetcher;
pub use orchestrator::RemediationOrchestrator;
pub use planner::RemediationPlanner;
pub use state::{Plan, RunConfig};
