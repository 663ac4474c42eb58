// ⚠️ Error Types
// Row-level rejections are values; crate-level failures are RankingError

use thiserror::Error;

/// Result alias for ranking operations
pub type Result<T> = std::result::Result<T, RankingError>;

/// Crate-level failures
#[derive(Error, Debug)]
pub enum RankingError {
    /// Feed text could not be retrieved (file missing, network down, ...)
    #[error("Feed unavailable: {0}")]
    FeedUnavailable(String),

    /// Storage collaborator could not be read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// SQLite error (wraps rusqlite::Error)
    #[error("Database error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Snapshot blob or config could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV decoding error outside of a single row (e.g. unreadable header)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Why a single feed row was dropped
///
/// Never fatal for the feed: the row is skipped and the refresh continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    #[error("missing or blank name")]
    MissingName,

    #[error("percentage is not numeric: {0:?}")]
    InvalidPercentage(String),

    #[error("rank is not an integer: {0:?}")]
    InvalidRank(String),

    /// The CSV reader could not decode the line at all
    #[error("malformed CSV record: {0}")]
    Malformed(String),
}
