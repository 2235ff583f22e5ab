use thiserror::Error;

/// Failures inside the live layer. None of these reach the viewer that sent
/// the intent; they are logged where the toggle is handled.
#[derive(Error, Debug)]
pub enum LiveError {
    #[error("contestant '{0}' not found")]
    NotFound(String),

    #[error("toggle rejected: {0}")]
    Unauthorized(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
