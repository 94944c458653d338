use serde::{Deserialize, Serialize};

/// Repository-level scanning features the run depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feature {
    VulnerabilityAlerts,
    AutomatedSecurityFixes,
}

impl Feature {
    pub const ALL: [Feature; 2] = [Feature::VulnerabilityAlerts, Feature::AutomatedSecurityFixes];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::VulnerabilityAlerts => "vulnerability-alerts",
            Feature::AutomatedSecurityFixes => "automated-security-fixes",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the platform reports about a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStatus {
    Enabled,
    Disabled,
}

/// Outcome of ensuring a feature for this run. Set once, read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeatureState {
    #[default]
    Unknown,
    Enabled,
    Unsupported,
}

impl std::fmt::Display for FeatureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Enabled => write!(f, "enabled"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Resolved state of every feature for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureStates {
    pub vulnerability_alerts: FeatureState,
    pub automated_security_fixes: FeatureState,
}

impl FeatureStates {
    pub fn get(&self, feature: Feature) -> FeatureState {
        match feature {
            Feature::VulnerabilityAlerts => self.vulnerability_alerts,
            Feature::AutomatedSecurityFixes => self.automated_security_fixes,
        }
    }

    pub fn set(&mut self, feature: Feature, state: FeatureState) {
        match feature {
            Feature::VulnerabilityAlerts => self.vulnerability_alerts = state,
            Feature::AutomatedSecurityFixes => self.automated_security_fixes = state,
        }
    }
}
