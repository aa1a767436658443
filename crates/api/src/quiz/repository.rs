use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::quiz::{QuestionStatistic, QuizSubmission};
use crate::RepositoryResult;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait QuizSubmissionRepository: Send + Sync {
    /// The submission with its full answer set.
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<QuizSubmission>>;

    /// Full unpaginated collection, answers included.
    async fn find_all(&self) -> RepositoryResult<Vec<QuizSubmission>>;

    /// Persists the submission together with its answer set. Inserts when the
    /// id is absent, updates otherwise.
    async fn save(&self, submission: &QuizSubmission) -> RepositoryResult<QuizSubmission>;

    /// Deletes the submission and its answers. A no-op when the id is absent.
    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait QuestionStatisticRepository: Send + Sync {
    async fn find_by_question_id(
        &self,
        question_id: i64,
    ) -> RepositoryResult<Option<QuestionStatistic>>;

    async fn save(&self, statistic: &QuestionStatistic) -> RepositoryResult<QuestionStatistic>;
}
