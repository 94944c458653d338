use crate::models::{RemediationTask, RunSummary};

pub fn format_pull_request_title(task: &RemediationTask) -> String {
    format!("Security fix for {} ({})", task.key.package_name, task.key.ecosystem)
}

/// Deterministic PR body: the same task always renders the same text.
pub fn format_pull_request_body(task: &RemediationTask) -> String {
    let mut body = format!(
        "Fixes the following security vulnerability:\n\n\
         | | |\n|---|---|\n\
         | **Package** | `{}` |\n\
         | **Ecosystem** | {} |\n\
         | **Manifest** | `{}` |\n\
         | **Severity** | {} |\n\
         | **Advisory** | {} |\n",
        task.key.package_name,
        task.key.ecosystem,
        task.key.manifest_path,
        task.severity,
        task.advisory.id,
    );

    let target = task.security_update.as_ref()
        .map(|u| u.target_version.as_str())
        .or(task.patched_version.as_deref());
    if let Some(version) = target {
        body.push_str(&format!("| **Patched version** | `{}` |\n", version));
    }

    body.push_str(&format!("\n**Summary:** {}\n\n", task.advisory.summary));

    let ids: Vec<String> = task.source_alert_ids.iter().map(|id| format!("#{}", id)).collect();
    body.push_str(&format!("**Source alerts:** {}\n", ids.join(", ")));
    body
}

/// One line per task, in planner order.
pub fn format_plan(tasks: &[RemediationTask]) -> String {
    if tasks.is_empty() {
        return "No remediation tasks planned.\n".to_string();
    }
    let mut out = String::new();
    for task in tasks {
        let ids: Vec<String> = task.source_alert_ids.iter().map(u64::to_string).collect();
        out.push_str(&format!(
            "{:>3}. [{:<8}] {} -> {} (alerts: {})\n",
            task.index + 1,
            task.severity,
            task.key,
            task.branch_name,
            ids.join(","),
        ));
    }
    out
}

pub fn format_summary_text(summary: &RunSummary) -> String {
    let mut out = format!(
        "Alerts found:    {}\nTasks planned:   {}\nSucceeded:       {}\nFailed:          {}\nSkipped:         {}\n",
        summary.alerts_found,
        summary.tasks_planned,
        summary.tasks_succeeded,
        summary.tasks_failed,
        summary.tasks_skipped,
    );
    if !summary.pull_request_urls.is_empty() {
        out.push_str("\nPull requests:\n");
        for url in &summary.pull_request_urls {
            out.push_str(&format!("  {}\n", url));
        }
    }
    if !summary.failures.is_empty() {
        out.push_str("\nNeeds manual intervention:\n");
        for failure in &summary.failures {
            out.push_str(&format!("  {}: {}\n", failure.branch_name, failure.reason));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Advisory, SecurityUpdate, Severity, TaskFailure, TaskKey, TaskStatus};
    use std::collections::BTreeSet;

    fn make_task() -> RemediationTask {
        RemediationTask {
            index: 1,
            key: TaskKey {
                package_name: "lodash".into(),
                ecosystem: "npm".into(),
                manifest_path: "package.json".into(),
            },
            source_alert_ids: BTreeSet::from([12, 3]),
            severity: Severity::High,
            advisory: Advisory { id: "GHSA-p6mc-m468-83gw".into(), summary: "Prototype Pollution".into() },
            patched_version: Some("4.17.19".into()),
            branch_name: "alert-remediator/npm/lodash/package.json".into(),
            status: TaskStatus::UpdateReady,
            failure_reason: None,
            skip_reason: None,
            security_update: None,
            pull_request_url: None,
        }
    }

    #[test]
    fn test_body_references_everything() {
        let body = format_pull_request_body(&make_task());
        assert!(body.contains("`lodash`"));
        assert!(body.contains("| **Ecosystem** | npm |"));
        assert!(body.contains("| **Severity** | high |"));
        assert!(body.contains("Prototype Pollution"));
        assert!(body.contains("GHSA-p6mc-m468-83gw"));
        assert!(body.contains("**Source alerts:** #3, #12"));
        assert!(body.contains("`4.17.19`"));
    }

    #[test]
    fn test_body_prefers_security_update_version() {
        let mut task = make_task();
        task.security_update = Some(SecurityUpdate { package_name: "lodash".into(), target_version: "4.17.21".into() });
        let body = format_pull_request_body(&task);
        assert!(body.contains("`4.17.21`"));
        assert!(!body.contains("`4.17.19`"));
    }

    #[test]
    fn test_body_is_deterministic() {
        assert_eq!(format_pull_request_body(&make_task()), format_pull_request_body(&make_task()));
    }

    #[test]
    fn test_title() {
        assert_eq!(format_pull_request_title(&make_task()), "Security fix for lodash (npm)");
    }

    #[test]
    fn test_plan_lines() {
        let plan = format_plan(&[make_task()]);
        assert!(plan.contains("npm:lodash:package.json -> alert-remediator/npm/lodash/package.json"));
        assert!(plan.contains("alerts: 3,12"));
        assert_eq!(format_plan(&[]), "No remediation tasks planned.\n");
    }

    #[test]
    fn test_summary_text_lists_failures() {
        let summary = RunSummary {
            alerts_found: 2,
            tasks_planned: 2,
            tasks_succeeded: 1,
            tasks_failed: 1,
            tasks_skipped: 0,
            pull_request_urls: vec!["https://github.com/acme/web/pull/1".into()],
            failures: vec![TaskFailure { branch_name: "b".into(), reason: "boom".into() }],
        };
        let text = format_summary_text(&summary);
        assert!(text.contains("https://github.com/acme/web/pull/1"));
        assert!(text.contains("b: boom"));
    }
}
