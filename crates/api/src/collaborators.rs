//! Optional external collaborators for programming exercises.
//!
//! Both services are injected as `Option<Arc<dyn ...>>`: a deployment without a
//! build server or version control simply passes `None`, and callers decide
//! whether to skip or fail fast.

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

pub type CollaborationResult<T, E = CollaborationError> = Result<T, E>;

#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum CollaborationError {
    #[error("BuildPlanError: {0}")]
    BuildPlanError(String),

    #[error("RepositoryError: {0}")]
    RepositoryError(String),
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContinuousIntegrationService: Send + Sync {
    /// Checks the build plan id against the build server.
    async fn build_plan_id_is_valid(&self, build_plan_id: &str) -> bool;

    async fn delete_build_plan(&self, build_plan_id: &str) -> CollaborationResult<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait VersionControlService: Send + Sync {
    /// Checks the repository url against the version control server.
    async fn repository_url_is_valid(&self, repository_url: &str) -> bool;

    /// Snapshot of the repository contents, suitable for storing in an archive.
    async fn export_repository(&self, repository_url: &str) -> CollaborationResult<Vec<u8>>;

    async fn delete_repository(&self, repository_url: &str) -> CollaborationResult<()>;
}
