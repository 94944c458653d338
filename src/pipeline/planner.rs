use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::LazyLock;
use regex::Regex;
use crate::errors::RemediatorError;
use crate::models::{Alert, RemediationTask, TaskKey, TaskStatus};
use tracing::debug;

static UNSAFE_REF_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-z0-9._-]+").expect("valid regex")
});

static REPEATED_DOTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.{2,}").expect("valid regex")
});

/// Turns raw alerts into a deduplicated, ordered list of tasks.
#[derive(Debug, Clone)]
pub struct RemediationPlanner {
    ecosystem_filter: Option<String>,
    branch_prefix: String,
}

impl RemediationPlanner {
    pub fn new(ecosystem_filter: Option<&str>, branch_prefix: &str) -> Self {
        Self {
            ecosystem_filter: ecosystem_filter.map(str::to_lowercase),
            branch_prefix: branch_prefix.trim_matches('/').to_string(),
        }
    }

    /// Pure and deterministic for a given input sequence.
    pub fn plan(&self, alerts: &[Alert]) -> Vec<RemediationTask> {
        let mut groups: BTreeMap<TaskKey, Vec<&Alert>> = BTreeMap::new();
        for alert in alerts.iter().filter(|a| a.is_open()) {
            if let Some(filter) = &self.ecosystem_filter {
                if alert.dependency.ecosystem.to_lowercase() != *filter {
                    continue;
                }
            }
            let key = TaskKey {
                package_name: alert.dependency.package_name.clone(),
                ecosystem: alert.dependency.ecosystem.clone(),
                manifest_path: alert.dependency.manifest_path.clone(),
            };
            groups.entry(key).or_default().push(alert);
        }

        let mut tasks: Vec<RemediationTask> = groups.into_iter()
            .map(|(key, mut group)| {
                // Most severe first, lowest id breaks ties.
                group.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.id.cmp(&b.id)));
                let representative = group[0];
                RemediationTask {
                    index: 0,
                    branch_name: String::new(),
                    source_alert_ids: group.iter().map(|a| a.id).collect::<BTreeSet<_>>(),
                    severity: representative.severity,
                    advisory: representative.advisory.clone(),
                    patched_version: group.iter().find_map(|a| a.patched_version.clone()),
                    status: TaskStatus::Pending,
                    failure_reason: None,
                    skip_reason: None,
                    security_update: None,
                    pull_request_url: None,
                    key,
                }
            })
            .collect();

        tasks.sort_by(|a, b| {
            b.severity.cmp(&a.severity)
                .then_with(|| a.key.package_name.cmp(&b.key.package_name))
                .then_with(|| a.key.ecosystem.cmp(&b.key.ecosystem))
                .then_with(|| a.key.manifest_path.cmp(&b.key.manifest_path))
        });

        let mut used = HashSet::new();
        for (index, task) in tasks.iter_mut().enumerate() {
            task.index = index;
            let base = branch_name(&self.branch_prefix, &task.key);
            let mut name = base.clone();
            let mut n = 2;
            while !used.insert(name.clone()) {
                name = format!("{}-{}", base, n);
                n += 1;
            }
            task.branch_name = name;
        }

        debug!(alerts = alerts.len(), tasks = tasks.len(), "Planned remediation tasks");
        tasks
    }
}

/// Check a branch prefix once, before any branch is created. Every `/`-separated
/// component must already be ref-safe (case aside), so no task fails later on a bad prefix.
pub fn validate_branch_prefix(prefix: &str) -> Result<String, RemediatorError> {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return Err(RemediatorError::Config("Branch prefix must not be empty".into()));
    }
    for component in prefix.split('/') {
        if slug(component) != component.to_lowercase() {
            return Err(RemediatorError::Config(format!(
                "Invalid branch prefix '{}': component '{}' is not a valid ref name",
                prefix, component
            )));
        }
    }
    Ok(prefix.to_string())
}

/// `{prefix}/{ecosystem}/{package}/{manifest}` with each segment made ref-safe.
pub fn branch_name(prefix: &str, key: &TaskKey) -> String {
    format!(
        "{}/{}/{}/{}",
        prefix,
        slug(&key.ecosystem),
        slug(&key.package_name),
        slug(&key.manifest_path),
    )
}

fn slug(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let replaced = UNSAFE_REF_CHARS.replace_all(&lower, "-");
    let collapsed = REPEATED_DOTS.replace_all(&replaced, ".");
    let trimmed = collapsed.trim_matches(|c| c == '-' || c == '.');
    if trimmed.is_empty() {
        return "unknown".to_string();
    }
    // git refuses ref components ending in ".lock"
    match trimmed.strip_suffix(".lock") {
        Some(stem) => format!("{}-lock", stem),
        None => trimmed.to_string(),
    }
}
