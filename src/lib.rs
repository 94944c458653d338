pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod platform;
pub mod reporting;

pub use errors::RemediatorError;
pub use pipeline::{RemediationOrchestrator, RunConfig};
