use std::path::Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::errors::RemediatorError;
use crate::models::RunSummary;
use tracing::info;

/// Machine-readable record of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub run_id: String,
    pub repository: String,
    pub base_branch: String,
    pub dry_run: bool,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: RunSummary,
}

impl SummaryDocument {
    pub fn to_json(&self) -> Result<String, RemediatorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub async fn write_to(&self, path: &Path) -> Result<(), RemediatorError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, self.to_json()?).await?;
        info!(path = %path.display(), "Wrote run summary");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_document() -> SummaryDocument {
        SummaryDocument {
            run_id: "run-1".into(),
            repository: "acme/web".into(),
            base_branch: "main".into(),
            dry_run: false,
            finished_at: Utc::now(),
            summary: RunSummary {
                alerts_found: 3,
                tasks_planned: 2,
                tasks_succeeded: 2,
                pull_request_urls: vec!["https://github.com/acme/web/pull/1".into()],
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_summary_fields_are_flattened() {
        let json: serde_json::Value = serde_json::from_str(&make_document().to_json().unwrap()).unwrap();
        assert_eq!(json["alerts_found"], 3);
        assert_eq!(json["tasks_planned"], 2);
        assert_eq!(json["repository"], "acme/web");
        assert!(json.get("summary").is_none());
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/nested/summary.json");
        make_document().write_to(&path).await.unwrap();
        let written: SummaryDocument = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.summary.tasks_succeeded, 2);
    }
}
