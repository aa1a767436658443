pub type RepositoryResult<T, E = RepositoryError> = Result<T, E>;

#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum RepositoryError {
    #[error("PersistenceError: {0}")]
    PersistenceError(String),

    #[error("ConnectionError: {0}")]
    ConnectionError(String),

    #[error("QueryError: {0}")]
    QueryError(String),

    #[error("DeleteError: {0}")]
    DeleteError(String),

    #[error("ItemNotFoundError")]
    ItemNotFoundError,

    #[error("Unknown: {0}")]
    UnknownError(String),
}

pub type ServiceResult<T, E = ServiceError> = Result<T, E>;

#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("LookupError: {0}")]
    LookupError(String),

    #[error("SaveFailed: {0}")]
    SaveFailed(String),

    #[error("CleanupError: {0}")]
    CleanupError(String),

    #[error("ArchiveError: {0}")]
    ArchiveError(String),
}
