use async_trait::async_trait;
use crate::errors::RemediatorError;
use crate::models::{Feature, FeatureStatus, Repository, SecurityUpdate, TaskKey};
use super::types::{AlertPage, PullRequestRequest};

/// Logical operations consumed from the hosting platform.
#[async_trait]
pub trait SecurityPlatform: Send + Sync {
    /// Current status of a repository feature. `NotFound` means not configured.
    async fn feature_status(
        &self,
        repo: &Repository,
        feature: Feature,
    ) -> Result<FeatureStatus, RemediatorError>;

    async fn enable_feature(
        &self,
        repo: &Repository,
        feature: Feature,
    ) -> Result<(), RemediatorError>;

    /// One page of alerts. `cursor` is whatever the previous page returned as `next_cursor`.
    async fn list_alerts(
        &self,
        repo: &Repository,
        cursor: Option<&str>,
    ) -> Result<AlertPage, RemediatorError>;

    /// Head commit of a branch.
    async fn branch_sha(
        &self,
        repo: &Repository,
        branch: &str,
    ) -> Result<String, RemediatorError>;

    /// Create `branch` at `base_sha`. `Conflict` if it already exists.
    async fn create_branch(
        &self,
        repo: &Repository,
        branch: &str,
        base_sha: &str,
    ) -> Result<(), RemediatorError>;

    /// Request a fix for one manifest. `Ok(None)` means no fix is available.
    async fn create_security_update(
        &self,
        repo: &Repository,
        key: &TaskKey,
        branch: &str,
    ) -> Result<Option<SecurityUpdate>, RemediatorError>;

    /// Open a pull request and return its URL.
    async fn create_pull_request(
        &self,
        repo: &Repository,
        request: &PullRequestRequest,
    ) -> Result<String, RemediatorError>;

    /// Platform name for logging
    fn platform_name(&self) -> &str;
}
