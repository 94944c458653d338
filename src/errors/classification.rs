use super::types::RemediatorError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl RemediatorError {
    /// Classify this error to determine its type and whether it can be retried.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Retryable errors
            RemediatorError::RateLimited(_) => ErrorClassification {
                error_type: "RateLimitError",
                retryable: true,
            },
            RemediatorError::Transient(_) => ErrorClassification {
                error_type: "TransientError",
                retryable: true,
            },

            // Non-retryable errors
            RemediatorError::PermissionDenied(_) => ErrorClassification {
                error_type: "PermissionError",
                retryable: false,
            },
            RemediatorError::NotFound(_) => ErrorClassification {
                error_type: "NotFoundError",
                retryable: false,
            },
            RemediatorError::Conflict(_) => ErrorClassification {
                error_type: "ConflictError",
                retryable: false,
            },
            RemediatorError::ValidationFailed(_) => ErrorClassification {
                error_type: "ValidationError",
                retryable: false,
            },
            RemediatorError::Fatal(_) => ErrorClassification {
                error_type: "FatalError",
                retryable: false,
            },
            RemediatorError::MalformedResponse(_) => ErrorClassification {
                error_type: "MalformedResponseError",
                retryable: false,
            },
            RemediatorError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            RemediatorError::TasksFailed(_) => ErrorClassification {
                error_type: "TasksFailedError",
                retryable: false,
            },
            RemediatorError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: false,
            },
            RemediatorError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: false,
            },
            RemediatorError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },

            // Wrappers classify as their cause
            RemediatorError::FeatureEnablement { source, .. } => source.classify(),
            RemediatorError::AlertFetch(source) => source.classify(),
        }
    }

    /// Whether a failed security-update request means "nothing to do yet"
    /// rather than an operational failure.
    pub fn is_not_applicable(&self) -> bool {
        matches!(
            self.root(),
            RemediatorError::NotFound(_) | RemediatorError::PermissionDenied(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Feature;

    #[test]
    fn test_rate_limit_is_retryable() {
        let err = RemediatorError::RateLimited("secondary rate limit".into());
        let class = err.classify();
        assert!(class.retryable);
        assert_eq!(class.error_type, "RateLimitError");
    }

    #[test]
    fn test_transient_is_retryable() {
        let err = RemediatorError::Transient("502 bad gateway".into());
        assert!(err.classify().retryable);
    }

    #[test]
    fn test_fatal_not_retryable() {
        let err = RemediatorError::Fatal("bad credentials".into());
        let class = err.classify();
        assert!(!class.retryable);
        assert_eq!(class.error_type, "FatalError");
    }

    #[test]
    fn test_validation_not_retryable() {
        let err = RemediatorError::ValidationFailed("no commits between main and head".into());
        assert!(!err.classify().retryable);
    }

    #[test]
    fn test_permission_not_retryable() {
        let err = RemediatorError::PermissionDenied("resource not accessible by integration".into());
        assert!(!err.classify().retryable);
    }

    #[test]
    fn test_wrapper_classifies_as_cause() {
        let err = RemediatorError::FeatureEnablement {
            feature: Feature::VulnerabilityAlerts,
            source: Box::new(RemediatorError::Transient("timeout".into())),
        };
        assert!(err.classify().retryable);
        assert_eq!(err.classify().error_type, "TransientError");
    }

    #[test]
    fn test_not_applicable() {
        assert!(RemediatorError::NotFound("no fix".into()).is_not_applicable());
        assert!(RemediatorError::PermissionDenied("disabled".into()).is_not_applicable());
        assert!(!RemediatorError::Transient("reset".into()).is_not_applicable());
        assert!(!RemediatorError::ValidationFailed("bad".into()).is_not_applicable());
    }
}
