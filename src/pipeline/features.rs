use std::sync::Arc;
use crate::errors::{with_retry, RemediatorError, RetryConfig};
use crate::models::{Feature, FeatureState, FeatureStates, FeatureStatus, Repository};
use crate::platform::SecurityPlatform;
use tracing::{info, warn};

/// Idempotently turns on the repository features a run depends on.
pub struct FeatureEnabler {
    platform: Arc<dyn SecurityPlatform>,
    retry: RetryConfig,
    dry_run: bool,
}

impl FeatureEnabler {
    pub fn new(platform: Arc<dyn SecurityPlatform>, retry: RetryConfig, dry_run: bool) -> Self {
        Self { platform, retry, dry_run }
    }

    /// Query first and only enable when the feature is off.
    ///
    /// Permission problems degrade to `Unsupported`; every other failure is
    /// fatal and comes back as `RemediatorError::FeatureEnablement`.
    pub async fn ensure(&self, repo: &Repository, feature: Feature) -> Result<FeatureState, RemediatorError> {
        let status = with_retry("feature_status", &self.retry, || {
            self.platform.feature_status(repo, feature)
        }).await;

        match status {
            Ok(FeatureStatus::Enabled) => {
                info!(repository = %repo, feature = %feature, "Feature already enabled");
                return Ok(FeatureState::Enabled);
            }
            Ok(FeatureStatus::Disabled) | Err(RemediatorError::NotFound(_)) => {}
            Err(RemediatorError::PermissionDenied(msg)) => {
                warn!(repository = %repo, feature = %feature, error = %msg, "Cannot read feature status, continuing without it");
                return Ok(FeatureState::Unsupported);
            }
            Err(e) => return Err(fatal(feature, e)),
        }

        if self.dry_run {
            info!(repository = %repo, feature = %feature, "Dry run: leaving feature disabled");
            return Ok(FeatureState::Unknown);
        }

        info!(repository = %repo, feature = %feature, "Enabling feature");
        let enabled = with_retry("enable_feature", &self.retry, || {
            self.platform.enable_feature(repo, feature)
        }).await;

        match enabled {
            Ok(()) => Ok(FeatureState::Enabled),
            Err(RemediatorError::PermissionDenied(msg)) => {
                warn!(repository = %repo, feature = %feature, error = %msg, "Not permitted to enable feature, continuing without it");
                Ok(FeatureState::Unsupported)
            }
            Err(e) => Err(fatal(feature, e)),
        }
    }

    pub async fn ensure_all(&self, repo: &Repository) -> Result<FeatureStates, RemediatorError> {
        let mut states = FeatureStates::default();
        for feature in Feature::ALL {
            states.set(feature, self.ensure(repo, feature).await?);
        }
        Ok(states)
    }
}

fn fatal(feature: Feature, source: RemediatorError) -> RemediatorError {
    RemediatorError::FeatureEnablement {
        feature,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FakePlatform;

    fn repo() -> Repository {
        Repository::new("acme", "web").unwrap()
    }

    fn enabler(platform: &Arc<FakePlatform>, dry_run: bool) -> FeatureEnabler {
        FeatureEnabler::new(platform.clone(), RetryConfig::immediate(2), dry_run)
    }

    #[tokio::test]
    async fn test_already_enabled_issues_no_enable_call() {
        let platform = Arc::new(FakePlatform::new().with_enabled(Feature::VulnerabilityAlerts));
        let state = enabler(&platform, false).ensure(&repo(), Feature::VulnerabilityAlerts).await.unwrap();
        assert_eq!(state, FeatureState::Enabled);
        assert_eq!(platform.calls().enable_feature, 0);
    }

    #[tokio::test]
    async fn test_not_configured_gets_enabled() {
        let platform = Arc::new(FakePlatform::new());
        let state = enabler(&platform, false).ensure(&repo(), Feature::VulnerabilityAlerts).await.unwrap();
        assert_eq!(state, FeatureState::Enabled);
        assert!(platform.is_enabled(Feature::VulnerabilityAlerts));
        assert_eq!(platform.calls().enable_feature, 1);
    }

    #[tokio::test]
    async fn test_ensure_twice_is_idempotent() {
        let platform = Arc::new(FakePlatform::new());
        let enabler = enabler(&platform, false);
        let first = enabler.ensure(&repo(), Feature::AutomatedSecurityFixes).await.unwrap();
        let second = enabler.ensure(&repo(), Feature::AutomatedSecurityFixes).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(platform.calls().enable_feature, 1);
    }

    #[tokio::test]
    async fn test_permission_denied_is_unsupported_not_error() {
        let platform = Arc::new(FakePlatform::new().with_denied(Feature::AutomatedSecurityFixes));
        let state = enabler(&platform, false).ensure(&repo(), Feature::AutomatedSecurityFixes).await.unwrap();
        assert_eq!(state, FeatureState::Unsupported);
    }

    #[tokio::test]
    async fn test_fatal_error_aborts() {
        let platform = Arc::new(FakePlatform::new());
        platform.fail_feature_status(Feature::VulnerabilityAlerts, RemediatorError::Fatal("bad credentials".into()));
        let err = enabler(&platform, false).ensure_all(&repo()).await.unwrap_err();
        assert!(matches!(
            err,
            RemediatorError::FeatureEnablement { feature: Feature::VulnerabilityAlerts, .. }
        ));
        assert!(matches!(err.root(), RemediatorError::Fatal(_)));
        assert_eq!(platform.calls().enable_feature, 0);
    }

    #[tokio::test]
    async fn test_transient_status_error_is_retried() {
        let platform = Arc::new(FakePlatform::new().with_enabled(Feature::VulnerabilityAlerts));
        platform.fail_feature_status(Feature::VulnerabilityAlerts, RemediatorError::Transient("502".into()));
        let state = enabler(&platform, false).ensure(&repo(), Feature::VulnerabilityAlerts).await.unwrap();
        assert_eq!(state, FeatureState::Enabled);
        assert_eq!(platform.calls().feature_status, 2);
    }

    #[tokio::test]
    async fn test_dry_run_never_enables() {
        let platform = Arc::new(FakePlatform::new());
        let states = enabler(&platform, true).ensure_all(&repo()).await.unwrap();
        assert_eq!(states.vulnerability_alerts, FeatureState::Unknown);
        assert_eq!(states.automated_security_fixes, FeatureState::Unknown);
        assert_eq!(platform.calls().enable_feature, 0);
    }
}
