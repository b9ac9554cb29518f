use eyre::Report;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid patch: {0}")]
    InvalidPatch(String),
    #[error(transparent)]
    Backend(Report),
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    // Upstream
    #[error("upstream returned {status} for {path}")]
    UpstreamStatus { path: String, status: u16 },
    #[error("upstream request failed for {path}: {source}")]
    Http {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected upstream payload for {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // Persistence
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Internal(Report),
}

impl SyncError {
    pub fn decode(path: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode { path: path.into(), source }
    }
}

impl From<Report> for SyncError {
    fn from(error: Report) -> Self {
        Self::Internal(error)
    }
}
