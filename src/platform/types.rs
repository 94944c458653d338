use serde::{Deserialize, Serialize};
use crate::errors::RemediatorError;
use crate::models::{Advisory, Alert, AlertState, Dependency, Severity};

/// One page of alerts plus the cursor for the next page, if any.
#[derive(Debug, Clone, Default)]
pub struct AlertPage {
    pub alerts: Vec<Alert>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}

// Dependabot wire format. Every field is optional here so that a missing
// field is reported by `Alert::try_from` with the alert number attached.

#[derive(Debug, Deserialize)]
pub struct RawAlert {
    pub number: Option<u64>,
    pub state: Option<String>,
    pub dependency: Option<RawDependency>,
    pub security_advisory: Option<RawAdvisory>,
    pub security_vulnerability: Option<RawVulnerability>,
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawDependency {
    pub package: Option<RawPackage>,
    pub manifest_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawPackage {
    pub ecosystem: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawAdvisory {
    pub ghsa_id: Option<String>,
    pub summary: Option<String>,
    pub severity: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawVulnerability {
    pub severity: Option<String>,
    pub first_patched_version: Option<RawPatchedVersion>,
}

#[derive(Debug, Deserialize)]
pub struct RawPatchedVersion {
    pub identifier: Option<String>,
}

fn required<T>(value: Option<T>, alert: Option<u64>, field: &str) -> Result<T, RemediatorError> {
    value.ok_or_else(|| {
        let which = alert.map_or_else(|| "alert".to_string(), |n| format!("alert #{}", n));
        RemediatorError::MalformedResponse(format!("{} is missing '{}'", which, field))
    })
}

impl TryFrom<RawAlert> for Alert {
    type Error = RemediatorError;

    fn try_from(raw: RawAlert) -> Result<Self, Self::Error> {
        let number = raw.number;
        let id = required(number, None, "number")?;

        let state = required(raw.state, number, "state")?
            .parse::<AlertState>()
            .map_err(|e| RemediatorError::MalformedResponse(format!("alert #{}: {}", id, e)))?;

        let dependency = required(raw.dependency, number, "dependency")?;
        let package = required(dependency.package, number, "dependency.package")?;
        let advisory = required(raw.security_advisory, number, "security_advisory")?;

        let severity_raw = advisory
            .severity
            .clone()
            .or_else(|| raw.security_vulnerability.as_ref().and_then(|v| v.severity.clone()));
        let severity = required(severity_raw, number, "security_advisory.severity")?
            .parse::<Severity>()
            .map_err(|e| RemediatorError::MalformedResponse(format!("alert #{}: {}", id, e)))?;

        let patched_version = raw
            .security_vulnerability
            .and_then(|v| v.first_patched_version)
            .and_then(|p| p.identifier);

        Ok(Alert {
            id,
            state,
            dependency: Dependency {
                package_name: required(package.name, number, "dependency.package.name")?,
                ecosystem: required(package.ecosystem, number, "dependency.package.ecosystem")?,
                manifest_path: required(dependency.manifest_path, number, "dependency.manifest_path")?,
            },
            severity,
            advisory: Advisory {
                id: required(advisory.ghsa_id, number, "security_advisory.ghsa_id")?,
                summary: advisory.summary.unwrap_or_default(),
            },
            patched_version,
            html_url: raw.html_url,
        })
    }
}
