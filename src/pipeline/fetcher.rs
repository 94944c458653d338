use std::collections::HashSet;
use std::sync::Arc;
use crate::errors::{with_retry, RemediatorError, RetryConfig};
use crate::models::{Alert, Repository};
use crate::platform::SecurityPlatform;
use tracing::{debug, info};

/// Retrieves every alert for a repository, following pagination.
pub struct AlertFetcher {
    platform: Arc<dyn SecurityPlatform>,
    retry: RetryConfig,
}

impl AlertFetcher {
    pub fn new(platform: Arc<dyn SecurityPlatform>, retry: RetryConfig) -> Self {
        Self { platform, retry }
    }

    /// Alerts in service order. Any failure is `RemediatorError::AlertFetch`.
    pub async fn fetch_all(&self, repo: &Repository) -> Result<Vec<Alert>, RemediatorError> {
        let mut alerts = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();
        let mut pages = 0usize;

        loop {
            let page = with_retry("list_alerts", &self.retry, || {
                self.platform.list_alerts(repo, cursor.as_deref())
            })
            .await
            .map_err(|e| RemediatorError::AlertFetch(Box::new(e)))?;

            pages += 1;
            debug!(repository = %repo, page = pages, count = page.alerts.len(), "Fetched alert page");
            alerts.extend(page.alerts);

            match page.next_cursor {
                Some(next) => {
                    if !seen_cursors.insert(next.clone()) {
                        return Err(RemediatorError::AlertFetch(Box::new(
                            RemediatorError::MalformedResponse(format!("Pagination cursor repeated: {}", next)),
                        )));
                    }
                    cursor = Some(next);
                }
                None => break,
            }
        }

        info!(repository = %repo, count = alerts.len(), pages, "Fetched alerts");
        Ok(alerts)
    }
}
