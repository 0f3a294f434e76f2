//! error handling
use thiserror::Error;

/// every way the orchestrator can fail
#[derive(Debug, Error)]
pub enum AppError {
    /// the remote reports the author does not exist
    #[error("no such author: {0}")]
    NoUsername(String),

    /// credentials were rejected by the remote
    #[error("unauthorized: credentials were rejected, please refresh your cookie/auth header")]
    Unauthorized,

    /// the remote returned a shape the mapper cannot parse
    #[error("response validation failed: {0}")]
    ValidationError(String),

    /// any unexpected non-2xx status
    #[error("unexpected api status {status}: {details}")]
    UnknownApiError { status: u16, details: String },

    /// connection reset, dns failure, server disconnected, connect timeout
    #[error("transient network error: {0}")]
    TransientNetworkError(String),

    /// per-file http failure
    #[error("download failed: {0}")]
    DownloadError(String),

    /// user-initiated cancellation
    #[error("cancelled")]
    DownloadCancelledError,

    /// the cache database is corrupted or schema-incompatible
    #[error("cache error: {0}")]
    CacheError(String),

    /// config.yaml is missing or invalid
    #[error("config error: {0}")]
    ConfigError(String),

    /// an i/o error
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// a reqwest error
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// a json error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// a yaml error
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// a redb transaction error
    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    /// a redb table error
    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    /// a redb storage error
    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    /// a redb commit error
    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    /// a redb database error
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),
}

impl AppError {
    /// true for the §4.5/§7 transient-network subset that C5's and C9's
    /// retry loops should retry rather than surface immediately
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::TransientNetworkError(_) => true,
            AppError::Reqwest(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// true if this is the distinguished cancellation error; retry loops
    /// must propagate it immediately instead of retrying
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::DownloadCancelledError)
    }
}

/// a [`Result`] using [`AppError`] as the `Err` variant
pub type Result<T> = std::result::Result<T, AppError>;
