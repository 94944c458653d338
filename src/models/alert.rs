use serde::{Deserialize, Serialize};

/// Advisory severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            // Dependabot reports GHSA "moderate" as "medium"; accept both.
            "medium" | "moderate" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

/// Lifecycle state of an alert on the hosting platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    Open,
    Fixed,
    Dismissed,
    AutoDismissed,
}

impl std::str::FromStr for AlertState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(AlertState::Open),
            "fixed" => Ok(AlertState::Fixed),
            "dismissed" => Ok(AlertState::Dismissed),
            "auto_dismissed" => Ok(AlertState::AutoDismissed),
            other => Err(format!("unknown alert state '{}'", other)),
        }
    }
}

/// The vulnerable dependency an alert points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub package_name: String,
    pub ecosystem: String,
    pub manifest_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    /// GHSA identifier.
    pub id: String,
    pub summary: String,
}

/// A read-only snapshot of one dependency alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Alert number, unique within the repository.
    pub id: u64,
    pub state: AlertState,
    pub dependency: Dependency,
    pub severity: Severity,
    pub advisory: Advisory,
    /// First version that fixes the vulnerability, when one is published.
    pub patched_version: Option<String>,
    pub html_url: Option<String>,
}

impl Alert {
    pub fn is_open(&self) -> bool {
        self.state == AlertState::Open
    }
}
