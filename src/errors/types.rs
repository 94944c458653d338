use thiserror::Error;
use crate::models::Feature;

#[derive(Debug, Error)]
pub enum RemediatorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Transient error: {0}")]
    Transient(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Fatal error: {0}")]
    Fatal(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A fatal error raised while enabling a repository feature.
    #[error("Failed to enable {feature}: {source}")]
    FeatureEnablement {
        feature: Feature,
        #[source]
        source: Box<RemediatorError>,
    },

    /// A fatal error raised while listing alerts.
    #[error("Failed to fetch alerts: {0}")]
    AlertFetch(#[source] Box<RemediatorError>),

    /// The run finished but some tasks need manual intervention.
    #[error("{0} remediation task(s) failed")]
    TasksFailed(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RemediatorError {
    /// The error that caused a run-level wrapper, or `self` for leaf errors.
    pub fn root(&self) -> &RemediatorError {
        match self {
            RemediatorError::FeatureEnablement { source, .. } => source.root(),
            RemediatorError::AlertFetch(source) => source.root(),
            other => other,
        }
    }
}
