use thiserror::Error;

/// Top-level error type for the Folio backend.
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("corrupt document at {path}: {reason}")]
    CorruptDocument { path: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("channel closed: {0}")]
    ChannelClosed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FolioError {
    /// Wrap any displayable backend failure as a storage error.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}
