use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::exercise::Exercise;
use crate::page::{Page, PageRequest};
use crate::RepositoryResult;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExerciseRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Exercise>>;

    async fn find_all(&self, page: &PageRequest) -> RepositoryResult<Page<Exercise>>;

    async fn find_by_course_id(
        &self,
        course_id: i64,
        page: &PageRequest,
    ) -> RepositoryResult<Page<Exercise>>;

    /// Only exercises where the given student has a participation that carries
    /// an LTI outcome url.
    async fn find_by_course_id_where_lti_outcome_url_exists(
        &self,
        course_id: i64,
        student: &str,
        page: &PageRequest,
    ) -> RepositoryResult<Page<Exercise>>;

    /// Inserts when the id is absent, updates otherwise. Returns the persisted
    /// exercise with its identity assigned.
    async fn save(&self, exercise: &Exercise) -> RepositoryResult<Exercise>;

    /// Deleting an absent id is a no-op, not an error.
    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()>;
}
