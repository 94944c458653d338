use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::{json, Value};
use std::time::Duration;
use crate::config::credentials::redact_credentials;
use crate::errors::RemediatorError;
use crate::models::{Alert, Feature, FeatureStatus, Repository, SecurityUpdate, TaskKey};
use super::provider::SecurityPlatform;
use super::types::{AlertPage, PullRequestRequest, RawAlert};
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const PAGE_SIZE: &str = "100";

/// `SecurityPlatform` backed by the GitHub REST API.
pub struct GitHubPlatform {
    client: Client,
    token: String,
    api_url: String,
    api_root: Url,
}

impl GitHubPlatform {
    pub fn new(token: &str, api_url: Option<&str>) -> Result<Self, RemediatorError> {
        if token.is_empty() {
            return Err(RemediatorError::Config("GitHub token is empty".into()));
        }
        let client = Client::builder()
            .user_agent(concat!("alert-remediator/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RemediatorError::Fatal(format!("Failed to build HTTP client: {}", e)))?;

        let api_url = api_url.unwrap_or(DEFAULT_API_URL).trim_end_matches('/').to_string();
        let api_root = Url::parse(&api_url)
            .map_err(|e| RemediatorError::Config(format!("Invalid API URL '{}': {}", api_url, e)))?;

        Ok(Self {
            client,
            token: token.to_string(),
            api_url,
            api_root,
        })
    }

    /// Whether `link` has the API's scheme, host and port and lives under its path.
    fn is_api_link(&self, link: &str) -> bool {
        let Ok(url) = Url::parse(link) else {
            return false;
        };
        if url.origin() != self.api_root.origin() {
            return false;
        }
        let root = self.api_root.path().trim_end_matches('/');
        match url.path().strip_prefix(root) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    fn repo_url(&self, repo: &Repository, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_url, repo.owner, repo.name, path)
    }

    fn feature_path(feature: Feature) -> &'static str {
        match feature {
            Feature::VulnerabilityAlerts => "vulnerability-alerts",
            Feature::AutomatedSecurityFixes => "automated-security-fixes",
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("accept", "application/vnd.github+json")
            .header("x-github-api-version", API_VERSION)
    }

    /// Send a request and turn any non-2xx response into a classified error.
    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response, RemediatorError> {
        let resp = builder.send().await.map_err(|e| transport_error(what, e, &self.token))?;
        if resp.status().is_success() {
            return Ok(resp);
        }
        Err(error_from_response(resp, what, &self.token).await)
    }

    async fn fetch_alert_page(&self, url: &str, query: &[(&str, &str)]) -> Result<AlertPage, RemediatorError> {
        let resp = self.send(self.request(Method::GET, url).query(query), "list alerts").await?;
        let next_cursor = resp
            .headers()
            .get("link")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_next_link);

        let raw: Vec<RawAlert> = resp.json().await
            .map_err(|e| RemediatorError::MalformedResponse(format!("Failed to parse alert page: {}", e)))?;
        let alerts = raw.into_iter()
            .map(Alert::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AlertPage { alerts, next_cursor })
    }

    async fn find_open_pull_request(
        &self,
        repo: &Repository,
        request: &PullRequestRequest,
    ) -> Result<Option<String>, RemediatorError> {
        let head = format!("{}:{}", repo.owner, request.head);
        let resp = self.send(
            self.request(Method::GET, &self.repo_url(repo, "pulls"))
                .query(&[("head", head.as_str()), ("base", request.base.as_str()), ("state", "open")]),
            "list pull requests",
        ).await?;
        let data: Value = resp.json().await
            .map_err(|e| RemediatorError::MalformedResponse(format!("Failed to parse pull requests: {}", e)))?;
        Ok(data[0]["html_url"].as_str().map(str::to_string))
    }
}

#[async_trait]
impl SecurityPlatform for GitHubPlatform {
    async fn feature_status(&self, repo: &Repository, feature: Feature) -> Result<FeatureStatus, RemediatorError> {
        let url = self.repo_url(repo, Self::feature_path(feature));
        let resp = self.send(self.request(Method::GET, &url), "get feature status").await?;

        match feature {
            // 204 when enabled, 404 otherwise
            Feature::VulnerabilityAlerts => Ok(FeatureStatus::Enabled),
            Feature::AutomatedSecurityFixes => {
                let data: Value = resp.json().await
                    .map_err(|e| RemediatorError::MalformedResponse(format!("Failed to parse feature status: {}", e)))?;
                match data["enabled"].as_bool() {
                    Some(true) => Ok(FeatureStatus::Enabled),
                    Some(false) => Ok(FeatureStatus::Disabled),
                    None => Err(RemediatorError::MalformedResponse(
                        "automated-security-fixes response is missing 'enabled'".into(),
                    )),
                }
            }
        }
    }

    async fn enable_feature(&self, repo: &Repository, feature: Feature) -> Result<(), RemediatorError> {
        let url = self.repo_url(repo, Self::feature_path(feature));
        self.send(self.request(Method::PUT, &url), "enable feature").await?;
        debug!(repository = %repo, feature = %feature, "Feature enabled");
        Ok(())
    }

    async fn list_alerts(&self, repo: &Repository, cursor: Option<&str>) -> Result<AlertPage, RemediatorError> {
        match cursor {
            Some(next) => {
                // The cursor is a Link URL; never send the token anywhere else.
                if !self.is_api_link(next) {
                    return Err(RemediatorError::MalformedResponse(format!(
                        "Pagination link points outside the API: {}",
                        next
                    )));
                }
                self.fetch_alert_page(next, &[]).await
            }
            None => {
                let url = self.repo_url(repo, "dependabot/alerts");
                self.fetch_alert_page(&url, &[("state", "open"), ("per_page", PAGE_SIZE)]).await
            }
        }
    }

    async fn branch_sha(&self, repo: &Repository, branch: &str) -> Result<String, RemediatorError> {
        let url = self.repo_url(repo, &format!("git/ref/heads/{}", branch));
        let resp = self.send(self.request(Method::GET, &url), "resolve branch").await?;
        let data: Value = resp.json().await
            .map_err(|e| RemediatorError::MalformedResponse(format!("Failed to parse ref: {}", e)))?;
        data["object"]["sha"].as_str()
            .map(str::to_string)
            .ok_or_else(|| RemediatorError::MalformedResponse(format!("Ref for '{}' has no sha", branch)))
    }

    async fn create_branch(&self, repo: &Repository, branch: &str, base_sha: &str) -> Result<(), RemediatorError> {
        let body = json!({
            "ref": format!("refs/heads/{}", branch),
            "sha": base_sha,
        });
        let result = self.send(
            self.request(Method::POST, &self.repo_url(repo, "git/refs")).json(&body),
            "create branch",
        ).await;

        match result {
            Ok(_) => Ok(()),
            Err(RemediatorError::ValidationFailed(msg)) if msg.contains("already exists") => {
                Err(RemediatorError::Conflict(format!("Branch '{}' already exists", branch)))
            }
            Err(e) => Err(e),
        }
    }

    /// Resolves the fix for `key` from its open alerts; pushes nothing.
    ///
    /// GitHub has no REST endpoint that commits a Dependabot update onto a
    /// chosen branch. The returned descriptor is the first patched version
    /// Dependabot reports, and `branch` is left at the base commit. Unless
    /// something else commits the bump to that branch, opening the pull
    /// request fails with 422 "No commits between" and the branch stays
    /// behind for manual follow-up.
    async fn create_security_update(
        &self,
        repo: &Repository,
        key: &TaskKey,
        branch: &str,
    ) -> Result<Option<SecurityUpdate>, RemediatorError> {
        let url = self.repo_url(repo, "dependabot/alerts");
        let page = self.fetch_alert_page(&url, &[
            ("state", "open"),
            ("ecosystem", key.ecosystem.as_str()),
            ("package", key.package_name.as_str()),
            ("manifest", key.manifest_path.as_str()),
            ("per_page", PAGE_SIZE),
        ]).await?;

        let mut matching: Vec<&Alert> = page.alerts.iter()
            .filter(|a| {
                a.dependency.package_name == key.package_name
                    && a.dependency.ecosystem == key.ecosystem
                    && a.dependency.manifest_path == key.manifest_path
            })
            .collect();
        if matching.is_empty() {
            return Err(RemediatorError::NotFound(format!("No open alerts for {}", key)));
        }

        // Most severe alert with a published fix wins; lowest number breaks ties.
        matching.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.id.cmp(&b.id)));
        let update = matching.iter()
            .find_map(|a| a.patched_version.clone())
            .map(|target_version| SecurityUpdate {
                package_name: key.package_name.clone(),
                target_version,
            });

        debug!(repository = %repo, branch = %branch, key = %key, found = update.is_some(), "Resolved security update");
        Ok(update)
    }

    async fn create_pull_request(&self, repo: &Repository, request: &PullRequestRequest) -> Result<String, RemediatorError> {
        let body = json!({
            "title": request.title,
            "head": request.head,
            "base": request.base,
            "body": request.body,
            "maintainer_can_modify": true,
        });
        let result = self.send(
            self.request(Method::POST, &self.repo_url(repo, "pulls")).json(&body),
            "create pull request",
        ).await;

        let resp = match result {
            Ok(resp) => resp,
            Err(RemediatorError::ValidationFailed(msg)) if msg.contains("already exists") => {
                // A previous run opened it; report the existing one.
                return match self.find_open_pull_request(repo, request).await? {
                    Some(url) => Ok(url),
                    None => Err(RemediatorError::ValidationFailed(msg)),
                };
            }
            Err(e) => return Err(e),
        };

        let data: Value = resp.json().await
            .map_err(|e| RemediatorError::MalformedResponse(format!("Failed to parse pull request: {}", e)))?;
        data["html_url"].as_str()
            .map(str::to_string)
            .ok_or_else(|| RemediatorError::MalformedResponse("Pull request response has no html_url".into()))
    }

    fn platform_name(&self) -> &str { "github" }
}

fn transport_error(what: &str, e: reqwest::Error, token: &str) -> RemediatorError {
    let message = redact_credentials(&format!("{} request failed: {}", what, e), &[token]);
    if e.is_timeout() || e.is_connect() || e.is_request() {
        RemediatorError::Transient(message)
    } else {
        RemediatorError::Fatal(message)
    }
}

async fn error_from_response(resp: Response, what: &str, token: &str) -> RemediatorError {
    let status = resp.status();
    let headers = resp.headers();
    let quota_exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "0");
    let has_retry_after = headers.contains_key("retry-after");

    let body: Value = resp.json().await.unwrap_or(Value::Null);
    let message = redact_credentials(&error_message(&body), &[token]);
    let rate_limited = quota_exhausted || has_retry_after || message.to_lowercase().contains("rate limit");

    error_for_status(status, rate_limited, &format!("{}: {}", what, message))
}

/// Map an HTTP status to the error taxonomy.
pub(crate) fn error_for_status(status: StatusCode, rate_limited: bool, message: &str) -> RemediatorError {
    match status.as_u16() {
        401 => RemediatorError::Fatal(format!("authentication failed ({})", message)),
        429 => RemediatorError::RateLimited(message.to_string()),
        403 if rate_limited => RemediatorError::RateLimited(message.to_string()),
        403 => RemediatorError::PermissionDenied(message.to_string()),
        404 | 410 => RemediatorError::NotFound(message.to_string()),
        409 => RemediatorError::Conflict(message.to_string()),
        422 => RemediatorError::ValidationFailed(message.to_string()),
        500..=599 => RemediatorError::Transient(format!("HTTP {} ({})", status.as_u16(), message)),
        other => RemediatorError::Fatal(format!("unexpected HTTP {} ({})", other, message)),
    }
}

/// Flatten GitHub's `{message, errors: [{message}]}` error body into one line.
fn error_message(body: &Value) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(msg) = body["message"].as_str() {
        parts.push(msg.to_string());
    }
    if let Some(errors) = body["errors"].as_array() {
        for err in errors {
            if let Some(msg) = err["message"].as_str() {
                parts.push(msg.to_string());
            }
        }
    }
    if parts.is_empty() {
        "no error message".to_string()
    } else {
        parts.join("; ")
    }
}

/// Extract the `rel="next"` target from a `Link` header.
pub(crate) fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|p| p.trim() == "rel=\"next\"");
        if is_next {
            target.strip_prefix('<')?.strip_suffix('>').map(str::to_string)
        } else {
            None
        }
    })
}
