use alert_remediator::errors::RemediatorError;
use alert_remediator::models::{Feature, FeatureStatus, Repository, Severity, TaskKey};
use alert_remediator::platform::{GitHubPlatform, PullRequestRequest, SecurityPlatform};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "ghp_testtoken123";

fn repo() -> Repository {
    Repository::new("acme", "web").unwrap()
}

async fn platform(server: &MockServer) -> GitHubPlatform {
    GitHubPlatform::new(TOKEN, Some(&server.uri())).unwrap()
}

fn raw_alert(number: u64, package: &str, severity: &str, patched: Option<&str>) -> Value {
    json!({
        "number": number,
        "state": "open",
        "html_url": format!("https://github.com/acme/web/security/dependabot/{}", number),
        "dependency": {
            "package": { "ecosystem": "npm", "name": package },
            "manifest_path": "package.json"
        },
        "security_advisory": {
            "ghsa_id": format!("GHSA-aaaa-bbbb-{:04}", number),
            "summary": format!("Prototype pollution in {}", package),
            "severity": severity
        },
        "security_vulnerability": {
            "severity": severity,
            "first_patched_version": patched.map(|v| json!({ "identifier": v }))
        }
    })
}

#[tokio::test]
async fn test_vulnerability_alerts_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/web/vulnerability-alerts"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(header("x-github-api-version", "2022-11-28"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let status = platform(&server).await
        .feature_status(&repo(), Feature::VulnerabilityAlerts)
        .await
        .unwrap();
    assert_eq!(status, FeatureStatus::Enabled);
}

#[tokio::test]
async fn test_disabled_vulnerability_alerts_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/web/vulnerability-alerts"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;

    let err = platform(&server).await
        .feature_status(&repo(), Feature::VulnerabilityAlerts)
        .await
        .unwrap_err();
    assert!(matches!(err, RemediatorError::NotFound(_)));
}

#[tokio::test]
async fn test_automated_fixes_status_and_enable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/web/automated-security-fixes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "enabled": false, "paused": false })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/acme/web/automated-security-fixes"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let github = platform(&server).await;
    let status = github.feature_status(&repo(), Feature::AutomatedSecurityFixes).await.unwrap();
    assert_eq!(status, FeatureStatus::Disabled);
    github.enable_feature(&repo(), Feature::AutomatedSecurityFixes).await.unwrap();
}

#[tokio::test]
async fn test_list_alerts_follows_link_header() {
    let server = MockServer::start().await;
    let next = format!("{}/repositories/1/dependabot/alerts?after=cursor1", server.uri());
    Mock::given(method("GET"))
        .and(path("/repos/acme/web/dependabot/alerts"))
        .and(query_param("state", "open"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([raw_alert(1, "lodash", "high", Some("4.17.21"))]))
                .insert_header("link", format!("<{}>; rel=\"next\"", next).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repositories/1/dependabot/alerts"))
        .and(query_param("after", "cursor1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([raw_alert(2, "minimist", "moderate", None)])))
        .mount(&server)
        .await;

    let github = platform(&server).await;
    let first = github.list_alerts(&repo(), None).await.unwrap();
    assert_eq!(first.alerts.len(), 1);
    assert_eq!(first.alerts[0].severity, Severity::High);
    assert_eq!(first.next_cursor.as_deref(), Some(next.as_str()));

    let second = github.list_alerts(&repo(), first.next_cursor.as_deref()).await.unwrap();
    assert_eq!(second.alerts[0].id, 2);
    assert_eq!(second.alerts[0].severity, Severity::Medium);
    assert!(second.alerts[0].patched_version.is_none());
    assert!(second.next_cursor.is_none());
}

#[tokio::test]
async fn test_foreign_pagination_link_rejected() {
    let server = MockServer::start().await;
    let err = platform(&server).await
        .list_alerts(&repo(), Some("https://evil.example.com/alerts?page=2"))
        .await
        .unwrap_err();
    assert!(matches!(err, RemediatorError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_pagination_link_on_other_port_rejected() {
    let api = MockServer::start().await;
    let other = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&other)
        .await;

    let cursor = format!("{}/repositories/1/dependabot/alerts?after=x", other.uri());
    let err = platform(&api).await
        .list_alerts(&repo(), Some(&cursor))
        .await
        .unwrap_err();
    assert!(matches!(err, RemediatorError::MalformedResponse(_)));
    assert!(other.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_malformed_alert_fails_fast() {
    let server = MockServer::start().await;
    let mut alert = raw_alert(7, "lodash", "high", None);
    alert["dependency"]["manifest_path"] = Value::Null;
    Mock::given(method("GET"))
        .and(path("/repos/acme/web/dependabot/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([alert])))
        .mount(&server)
        .await;

    let err = platform(&server).await.list_alerts(&repo(), None).await.unwrap_err();
    match err {
        RemediatorError::MalformedResponse(msg) => assert!(msg.contains("alert #7")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_existing_branch_is_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/web/git/refs"))
        .and(body_partial_json(json!({ "ref": "refs/heads/alert-remediator/npm/lodash/package.json" })))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "message": "Reference already exists" })))
        .mount(&server)
        .await;

    let err = platform(&server).await
        .create_branch(&repo(), "alert-remediator/npm/lodash/package.json", "abc123")
        .await
        .unwrap_err();
    assert!(matches!(err, RemediatorError::Conflict(_)));
}

#[tokio::test]
async fn test_branch_sha() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/web/git/ref/heads/main"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/main",
            "object": { "sha": "deadbeef", "type": "commit" }
        })))
        .mount(&server)
        .await;

    let sha = platform(&server).await.branch_sha(&repo(), "main").await.unwrap();
    assert_eq!(sha, "deadbeef");
}

#[tokio::test]
async fn test_security_update_prefers_most_severe_fix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/web/dependabot/alerts"))
        .and(query_param("package", "lodash"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            raw_alert(3, "lodash", "medium", Some("4.17.19")),
            raw_alert(5, "lodash", "critical", Some("4.17.21")),
        ])))
        .mount(&server)
        .await;

    let key = TaskKey {
        package_name: "lodash".into(),
        ecosystem: "npm".into(),
        manifest_path: "package.json".into(),
    };
    let update = platform(&server).await
        .create_security_update(&repo(), &key, "alert-remediator/npm/lodash/package.json")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(update.target_version, "4.17.21");
}

#[tokio::test]
async fn test_security_update_only_reads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/web/dependabot/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            raw_alert(3, "lodash", "high", Some("4.17.21")),
        ])))
        .mount(&server)
        .await;

    let key = TaskKey {
        package_name: "lodash".into(),
        ecosystem: "npm".into(),
        manifest_path: "package.json".into(),
    };
    platform(&server).await
        .create_security_update(&repo(), &key, "alert-remediator/npm/lodash/package.json")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    assert!(requests.iter().all(|r| r.method.as_str() == "GET"));
}

#[tokio::test]
async fn test_create_pull_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/web/pulls"))
        .and(body_partial_json(json!({ "head": "fix-branch", "base": "main" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "number": 42,
            "html_url": "https://github.com/acme/web/pull/42"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = PullRequestRequest {
        title: "Security fix for lodash (npm)".into(),
        head: "fix-branch".into(),
        base: "main".into(),
        body: "body".into(),
    };
    let url = platform(&server).await.create_pull_request(&repo(), &request).await.unwrap();
    assert_eq!(url, "https://github.com/acme/web/pull/42");
}

#[tokio::test]
async fn test_existing_pull_request_is_reused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/web/pulls"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Validation Failed",
            "errors": [{ "message": "A pull request already exists for acme:fix-branch." }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/web/pulls"))
        .and(query_param("head", "acme:fix-branch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "number": 9, "html_url": "https://github.com/acme/web/pull/9" }
        ])))
        .mount(&server)
        .await;

    let request = PullRequestRequest {
        title: "t".into(),
        head: "fix-branch".into(),
        base: "main".into(),
        body: "b".into(),
    };
    let url = platform(&server).await.create_pull_request(&repo(), &request).await.unwrap();
    assert_eq!(url, "https://github.com/acme/web/pull/9");
}

#[tokio::test]
async fn test_rate_limit_and_permission_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/repos/acme/web/vulnerability-alerts"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .set_body_json(json!({ "message": "API rate limit exceeded" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/acme/web/automated-security-fixes"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Must have admin rights" })))
        .mount(&server)
        .await;

    let github = platform(&server).await;
    let err = github.enable_feature(&repo(), Feature::VulnerabilityAlerts).await.unwrap_err();
    assert!(matches!(err, RemediatorError::RateLimited(_)));
    let err = github.enable_feature(&repo(), Feature::AutomatedSecurityFixes).await.unwrap_err();
    assert!(matches!(err, RemediatorError::PermissionDenied(_)));
}

#[tokio::test]
async fn test_server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/web/dependabot/alerts"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = platform(&server).await.list_alerts(&repo(), None).await.unwrap_err();
    assert!(err.classify().retryable);
}
