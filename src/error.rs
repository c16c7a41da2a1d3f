use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
