pub mod types;

use crate::error::MonitorError;
use async_trait::async_trait;
use log::debug;
use serde_json::json;
use types::{CoreStats, JobSnapshot, JobStatusReply};

/// Source of per-tick job snapshots.
///
/// `Ok(None)` means "no update this tick" and is not an error; the poller
/// leaves the previous displayed state unchanged.
#[async_trait]
pub trait JobStatusProvider: Send + Sync {
    async fn job_status(&self, jobid: u64) -> Result<Option<JobSnapshot>, MonitorError>;
}

/// HTTP JSON client for the sync backend's rc API
pub struct RcClient {
    base_url: String,
    auth: Option<(String, String)>,
    http_client: reqwest::Client,
}

impl RcClient {
    pub fn new(base_url: String, auth: Option<(String, String)>) -> Self {
        Self {
            base_url,
            auth,
            http_client: reqwest::Client::new(),
        }
    }

    async fn call(
        &self,
        endpoint: &str,
        payload: serde_json::Value,
    ) -> Result<String, MonitorError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);

        let mut request = self.http_client.post(&url).json(&payload);
        if let Some((user, pass)) = &self.auth {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request
            .send()
            .await
            .map_err(|e| MonitorError::BackendUnavailable(format!("Failed to connect: {e}")))?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(MonitorError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    /// Fetch completion state for one job (`job/status`)
    pub async fn fetch_status(&self, jobid: u64) -> Result<JobStatusReply, MonitorError> {
        let body = self.call("job/status", json!({ "jobid": jobid })).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch transfer statistics scoped to one job (`core/stats`)
    pub async fn fetch_stats(&self, jobid: u64) -> Result<CoreStats, MonitorError> {
        let body = self.call("core/stats", json!({ "jobid": jobid })).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl JobStatusProvider for RcClient {
    async fn job_status(&self, jobid: u64) -> Result<Option<JobSnapshot>, MonitorError> {
        // Both endpoints are queried each tick. Completion state is
        // required; stats are best-effort, a failed or empty stats reply
        // only skips this tick's aggregation.
        let (status, stats) = tokio::join!(self.fetch_status(jobid), self.fetch_stats(jobid));
        let status = status?;

        let stats = match stats {
            Ok(stats) => Some(stats),
            Err(e) => {
                debug!("job {jobid}: stats unavailable this tick: {e}");
                None
            }
        };

        Ok(Some(JobSnapshot {
            jobid,
            finished: status.finished,
            success: status.success,
            error: status.error,
            stats,
        }))
    }
}
