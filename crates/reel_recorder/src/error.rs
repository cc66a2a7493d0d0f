use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("failed to read recording: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid recording: {0}")]
    Json(#[from] serde_json::Error),

    #[error("a replay needs at least 2 events, found {found}")]
    TooFewEvents { found: usize },
}
