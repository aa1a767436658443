//! The graded outcome linked to a participation and its submission.
//!
//! Named `SubmissionResult` so it never shadows `std::result::Result`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::RepositoryResult;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub id: Option<i64>,
    pub participation_id: i64,
    pub submission_id: Option<i64>,
    pub completion_date: Option<DateTime<Utc>>,
}

impl SubmissionResult {
    pub fn for_participation(participation_id: i64) -> Self {
        Self {
            id: None,
            participation_id,
            submission_id: None,
            completion_date: None,
        }
    }
}

impl PartialEq for SubmissionResult {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubmissionResultRepository: Send + Sync {
    /// The most recent result for the participation, ordered by completion
    /// date descending; results without a completion date sort last.
    async fn find_first_by_participation_id_order_by_completion_date_desc(
        &self,
        participation_id: i64,
    ) -> RepositoryResult<Option<SubmissionResult>>;

    async fn save(&self, result: &SubmissionResult) -> RepositoryResult<SubmissionResult>;

    /// Deleting an absent id is a no-op, not an error.
    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()>;
}
