//! A student's enrollment/attempt record for a given exercise.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};

#[cfg(test)]
use mockall::automock;

use crate::exercise::Exercise;
use crate::{RepositoryResult, ServiceError, ServiceResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Participation {
    pub id: Option<i64>,
    pub exercise_id: i64,
    pub student: String,
    pub repository_url: Option<String>,
    pub build_plan_id: Option<String>,
    pub lti_outcome_url: Option<String>,
}

impl Participation {
    pub fn new(exercise_id: i64, student: &str) -> Self {
        Self {
            id: None,
            exercise_id,
            student: student.to_string(),
            repository_url: None,
            build_plan_id: None,
            lti_outcome_url: None,
        }
    }
}

impl PartialEq for Participation {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ParticipationRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Participation>>;

    async fn find_by_exercise_id(&self, exercise_id: i64) -> RepositoryResult<Vec<Participation>>;

    async fn find_by_exercise_id_and_student(
        &self,
        exercise_id: i64,
        student: &str,
    ) -> RepositoryResult<Option<Participation>>;

    async fn save(&self, participation: &Participation) -> RepositoryResult<Participation>;

    /// Deleting an absent id is a no-op, not an error.
    async fn delete_by_id(&self, id: i64) -> RepositoryResult<()>;
}

#[derive(Clone)]
pub struct ParticipationService {
    participation_repository: Arc<dyn ParticipationRepository>,
}

impl ParticipationService {
    pub fn new(participation_repository: Arc<dyn ParticipationRepository>) -> Self {
        Self {
            participation_repository,
        }
    }

    /// Returns the student's participation for the exercise, creating one on
    /// first access. Calling init twice never creates a second participation.
    #[instrument(skip(self, exercise), fields(student = student))]
    pub async fn init(&self, exercise: &Exercise, student: &str) -> ServiceResult<Participation> {
        let exercise_id = exercise.id.ok_or_else(|| {
            ServiceError::LookupError("cannot init a participation for an unsaved exercise".to_string())
        })?;

        let existing = self
            .participation_repository
            .find_by_exercise_id_and_student(exercise_id, student)
            .await
            .map_err(|err| {
                error!("{}", err);
                ServiceError::LookupError("error searching for existing participation".to_string())
            })?;

        if let Some(participation) = existing {
            debug!("reusing participation {:?}", participation.id);
            return Ok(participation);
        }

        self.participation_repository
            .save(&Participation::new(exercise_id, student))
            .await
            .map_err(|err| {
                error!("{}", err);
                ServiceError::SaveFailed("could not create participation".to_string())
            })
    }
}
