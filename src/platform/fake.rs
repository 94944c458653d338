//! In-memory `SecurityPlatform` (testing only)
//!
//! Keeps features, alerts, branches and pull requests in memory and lets a
//! test script one-shot failures per operation.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::RemediatorError;
use crate::models::{Alert, Feature, FeatureStatus, Repository, SecurityUpdate, TaskKey};
use super::provider::SecurityPlatform;
use super::types::{AlertPage, PullRequestRequest};

/// Number of calls made per operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeCalls {
    pub feature_status: usize,
    pub enable_feature: usize,
    pub list_alerts: usize,
    pub create_branch: usize,
    pub create_security_update: usize,
    pub create_pull_request: usize,
}

#[derive(Debug, Default)]
struct FakeState {
    enabled: HashSet<Feature>,
    denied: HashSet<Feature>,
    status_failures: HashMap<Feature, VecDeque<RemediatorError>>,
    alerts: Vec<Alert>,
    page_size: usize,
    list_failures: VecDeque<RemediatorError>,
    branches: HashMap<String, String>,
    branch_failures: HashMap<String, VecDeque<RemediatorError>>,
    update_failures: HashMap<String, VecDeque<RemediatorError>>,
    no_fix: HashSet<String>,
    pr_failures: HashMap<String, VecDeque<RemediatorError>>,
    pull_requests: Vec<(PullRequestRequest, String)>,
    calls: FakeCalls,
}

fn pop(queue: Option<&mut VecDeque<RemediatorError>>) -> Option<RemediatorError> {
    queue.and_then(|q| q.pop_front())
}

/// In-memory platform with a `main` branch and no features enabled.
#[derive(Debug)]
pub struct FakePlatform {
    state: Mutex<FakeState>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        let mut state = FakeState {
            page_size: 100,
            ..Default::default()
        };
        state.branches.insert("main".to_string(), "0000000000000000000000000000000000000000".to_string());
        Self { state: Mutex::new(state) }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_alerts(self, alerts: Vec<Alert>) -> Self {
        self.lock().alerts = alerts;
        self
    }

    pub fn with_page_size(self, page_size: usize) -> Self {
        self.lock().page_size = page_size.max(1);
        self
    }

    pub fn with_enabled(self, feature: Feature) -> Self {
        self.lock().enabled.insert(feature);
        self
    }

    /// Status queries and enable calls for `feature` answer PermissionDenied.
    pub fn with_denied(self, feature: Feature) -> Self {
        self.lock().denied.insert(feature);
        self
    }

    pub fn with_branch(self, branch: &str, sha: &str) -> Self {
        self.lock().branches.insert(branch.to_string(), sha.to_string());
        self
    }

    /// The security update for `package` reports "no fix".
    pub fn with_no_fix(self, package: &str) -> Self {
        self.lock().no_fix.insert(package.to_string());
        self
    }

    pub fn fail_feature_status(&self, feature: Feature, err: RemediatorError) {
        self.lock().status_failures.entry(feature).or_default().push_back(err);
    }

    pub fn fail_list_alerts(&self, err: RemediatorError) {
        self.lock().list_failures.push_back(err);
    }

    pub fn fail_branch(&self, branch: &str, err: RemediatorError) {
        self.lock().branch_failures.entry(branch.to_string()).or_default().push_back(err);
    }

    pub fn fail_security_update(&self, package: &str, err: RemediatorError) {
        self.lock().update_failures.entry(package.to_string()).or_default().push_back(err);
    }

    pub fn fail_pull_request(&self, head: &str, err: RemediatorError) {
        self.lock().pr_failures.entry(head.to_string()).or_default().push_back(err);
    }

    pub fn calls(&self) -> FakeCalls {
        self.lock().calls.clone()
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.lock().enabled.contains(&feature)
    }

    pub fn has_branch(&self, branch: &str) -> bool {
        self.lock().branches.contains_key(branch)
    }

    pub fn pull_requests(&self) -> Vec<PullRequestRequest> {
        self.lock().pull_requests.iter().map(|(req, _)| req.clone()).collect()
    }
}

#[async_trait]
impl SecurityPlatform for FakePlatform {
    async fn feature_status(&self, _repo: &Repository, feature: Feature) -> Result<FeatureStatus, RemediatorError> {
        let mut state = self.lock();
        state.calls.feature_status += 1;
        if let Some(err) = pop(state.status_failures.get_mut(&feature)) {
            return Err(err);
        }
        if state.denied.contains(&feature) {
            return Err(RemediatorError::PermissionDenied(format!("{} is not accessible", feature)));
        }
        match (feature, state.enabled.contains(&feature)) {
            (_, true) => Ok(FeatureStatus::Enabled),
            // Mirrors the REST API: alerts answer 404 when off, fixes answer {"enabled": false}.
            (Feature::VulnerabilityAlerts, false) => {
                Err(RemediatorError::NotFound(format!("{} not configured", feature)))
            }
            (Feature::AutomatedSecurityFixes, false) => Ok(FeatureStatus::Disabled),
        }
    }

    async fn enable_feature(&self, _repo: &Repository, feature: Feature) -> Result<(), RemediatorError> {
        let mut state = self.lock();
        state.calls.enable_feature += 1;
        if state.denied.contains(&feature) {
            return Err(RemediatorError::PermissionDenied(format!("cannot enable {}", feature)));
        }
        state.enabled.insert(feature);
        Ok(())
    }

    async fn list_alerts(&self, _repo: &Repository, cursor: Option<&str>) -> Result<AlertPage, RemediatorError> {
        let mut state = self.lock();
        state.calls.list_alerts += 1;
        if let Some(err) = state.list_failures.pop_front() {
            return Err(err);
        }
        let start = match cursor {
            Some(c) => c.parse::<usize>()
                .map_err(|_| RemediatorError::MalformedResponse(format!("bad cursor '{}'", c)))?,
            None => 0,
        };
        let end = (start + state.page_size).min(state.alerts.len());
        let alerts = state.alerts.get(start..end).map(<[Alert]>::to_vec).unwrap_or_default();
        let next_cursor = (end < state.alerts.len()).then(|| end.to_string());
        Ok(AlertPage { alerts, next_cursor })
    }

    async fn branch_sha(&self, _repo: &Repository, branch: &str) -> Result<String, RemediatorError> {
        self.lock().branches.get(branch)
            .cloned()
            .ok_or_else(|| RemediatorError::NotFound(format!("branch '{}'", branch)))
    }

    async fn create_branch(&self, _repo: &Repository, branch: &str, base_sha: &str) -> Result<(), RemediatorError> {
        let mut state = self.lock();
        state.calls.create_branch += 1;
        if let Some(err) = pop(state.branch_failures.get_mut(branch)) {
            return Err(err);
        }
        if state.branches.contains_key(branch) {
            return Err(RemediatorError::Conflict(format!("Branch '{}' already exists", branch)));
        }
        state.branches.insert(branch.to_string(), base_sha.to_string());
        Ok(())
    }

    async fn create_security_update(
        &self,
        _repo: &Repository,
        key: &TaskKey,
        _branch: &str,
    ) -> Result<Option<SecurityUpdate>, RemediatorError> {
        let mut state = self.lock();
        state.calls.create_security_update += 1;
        if let Some(err) = pop(state.update_failures.get_mut(&key.package_name)) {
            return Err(err);
        }
        if state.no_fix.contains(&key.package_name) {
            return Ok(None);
        }
        Ok(Some(SecurityUpdate {
            package_name: key.package_name.clone(),
            target_version: "patched".to_string(),
        }))
    }

    async fn create_pull_request(&self, repo: &Repository, request: &PullRequestRequest) -> Result<String, RemediatorError> {
        let mut state = self.lock();
        state.calls.create_pull_request += 1;
        if let Some(err) = pop(state.pr_failures.get_mut(&request.head)) {
            return Err(err);
        }
        if let Some((_, url)) = state.pull_requests.iter().find(|(req, _)| req.head == request.head) {
            return Ok(url.clone());
        }
        let url = format!("https://github.com/{}/pull/{}", repo, state.pull_requests.len() + 1);
        state.pull_requests.push((request.clone(), url.clone()));
        Ok(url)
    }

    fn platform_name(&self) -> &str { "fake" }
}
