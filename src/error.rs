//! Error types for the storage layer and the leveling engine.

/// Failure talking to a [`crate::store::LevelStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("storage worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Failure while processing a message through the leveling engine.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("storage: {0}")]
    Store(#[from] StoreError),
    #[error("invalid experience amount {0}")]
    InvalidAmount(i64),
}

impl LevelError {
    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            LevelError::Store(_) => "storage",
            LevelError::InvalidAmount(_) => "amount",
        }
    }
}
