use serde::{Deserialize, Serialize};

/// Reply from the backend's `job/status` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusReply {
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: String,
}

/// Reply from the backend's `core/stats` endpoint, filtered to the fields
/// this crate consumes
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CoreStats {
    #[serde(default)]
    pub bytes: u64,
    #[serde(rename = "totalBytes", default)]
    pub total_bytes: u64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub eta: Option<f64>,
    #[serde(rename = "lastError", default)]
    pub last_error: String,
    #[serde(rename = "fatalError", default)]
    pub fatal_error: bool,
    #[serde(default)]
    pub transferring: Vec<RawTransfer>,
}

/// One entry of the `transferring` array, as the backend reports it
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTransfer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub eta: Option<f64>,
    #[serde(rename = "srcFs", default)]
    pub src_fs: Option<String>,
    #[serde(rename = "dstFs", default)]
    pub dst_fs: Option<String>,
}

/// Validated per-tick view of one job, combining `job/status` with
/// whatever `core/stats` returned.
///
/// `stats: None` means the stats endpoint had nothing usable this tick;
/// the aggregation step is skipped and the previous display stands.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    pub jobid: u64,
    pub finished: bool,
    pub success: bool,
    pub error: String,
    pub stats: Option<CoreStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_stats_deserialization() {
        let json = r#"{
            "bytes": 250,
            "totalBytes": 1000,
            "speed": 100.0,
            "eta": 7.5,
            "fatalError": false,
            "transferring": [
                {
                    "name": "photos/2024/img_0001.jpg",
                    "size": 1000,
                    "bytes": 250,
                    "speed": 100.0,
                    "srcFs": "gdrive:photos",
                    "dstFs": "/home/user/photos"
                }
            ]
        }"#;

        let stats: CoreStats = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(stats.bytes, 250);
        assert_eq!(stats.total_bytes, 1000);
        assert_eq!(stats.transferring.len(), 1);
        assert_eq!(stats.transferring[0].name, "photos/2024/img_0001.jpg");
        assert_eq!(stats.transferring[0].src_fs.as_deref(), Some("gdrive:photos"));
        assert!(!stats.fatal_error);
    }

    #[test]
    fn test_core_stats_missing_fields_default() {
        // A stats reply for a just-started job can be nearly empty
        let stats: CoreStats = serde_json::from_str("{}").expect("Failed to deserialize");
        assert_eq!(stats.bytes, 0);
        assert_eq!(stats.total_bytes, 0);
        assert!(stats.transferring.is_empty());
        assert!(stats.eta.is_none());
        assert!(!stats.fatal_error);
    }

    #[test]
    fn test_job_status_reply_deserialization() {
        let json = r#"{
            "finished": true,
            "success": false,
            "error": "directory not found",
            "duration": 12.4
        }"#;

        let reply: JobStatusReply = serde_json::from_str(json).expect("Failed to deserialize");
        assert!(reply.finished);
        assert!(!reply.success);
        assert_eq!(reply.error, "directory not found");
    }
}
