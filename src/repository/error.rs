//! Repository failure taxonomy.

use mq_catalog::NetError;

/// Errors surfaced by [`Repository`](super::Repository) operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The operation is scoped to a user and nobody is logged in.
    #[error("No user is logged in")]
    UserNotAuthenticated,

    /// The requested entity is not stored locally.
    #[error("Not found: {0}")]
    DataNotFound(String),

    /// The catalog request failed. Never retried.
    #[error("Network error: {0}")]
    NetworkError(#[from] NetError),

    /// A write did not produce a usable stored entity.
    #[error("Failed to save: {0}")]
    SaveError(String),

    /// The local store failed while reading.
    #[error("Storage error: {0}")]
    Storage(#[source] mq_core::Error),

    /// A blocking call was made from a thread already driving an async
    /// runtime.
    #[error("Blocking repository call made from inside an async runtime")]
    BlockingInAsyncContext,
}

impl RepoError {
    /// Wrap a store failure that happened while writing.
    pub(crate) fn save(e: mq_core::Error) -> Self {
        RepoError::SaveError(e.to_string())
    }
}

impl From<mq_core::Error> for RepoError {
    fn from(e: mq_core::Error) -> Self {
        match e {
            mq_core::Error::NotFound { entity, id } => {
                RepoError::DataNotFound(format!("{entity} {id}"))
            }
            other => RepoError::Storage(other),
        }
    }
}
