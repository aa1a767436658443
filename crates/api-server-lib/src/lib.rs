//! Wires the repositories, services and optional collaborators into an axum
//! router serving the /api surface.

use std::sync::Arc;

use api::collaborators::{ContinuousIntegrationService, VersionControlService};
use api::exercise::{ExerciseRepository, ExerciseService};
use api::participation::{ParticipationRepository, ParticipationService};
use api::quiz::QuizSubmissionRepository;
use api::result::SubmissionResultRepository;
use axum::routing::{delete, get, post};
use axum::Router;
use sqlite::{
    SqliteExerciseRepository, SqliteParticipationRepository, SqlitePool,
    SqliteQuizSubmissionRepository, SqliteSubmissionResultRepository,
};

pub mod auth;
pub mod error;
mod exercise_resource;
mod pagination;
mod quiz_submission_resource;
pub mod settings;

pub use settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub exercises: Arc<dyn ExerciseRepository>,
    pub participations: Arc<dyn ParticipationRepository>,
    pub quiz_submissions: Arc<dyn QuizSubmissionRepository>,
    pub results: Arc<dyn SubmissionResultRepository>,
    pub exercise_service: ExerciseService,
    pub participation_service: ParticipationService,
    pub continuous_integration: Option<Arc<dyn ContinuousIntegrationService>>,
    pub version_control: Option<Arc<dyn VersionControlService>>,
}

impl AppState {
    pub fn from_pool(
        pool: SqlitePool,
        continuous_integration: Option<Arc<dyn ContinuousIntegrationService>>,
        version_control: Option<Arc<dyn VersionControlService>>,
    ) -> Self {
        let exercises: Arc<dyn ExerciseRepository> =
            Arc::new(SqliteExerciseRepository::new(pool.clone()));
        let participations: Arc<dyn ParticipationRepository> =
            Arc::new(SqliteParticipationRepository::new(pool.clone()));
        let quiz_submissions: Arc<dyn QuizSubmissionRepository> =
            Arc::new(SqliteQuizSubmissionRepository::new(pool.clone()));
        let results: Arc<dyn SubmissionResultRepository> =
            Arc::new(SqliteSubmissionResultRepository::new(pool));

        let exercise_service = ExerciseService::new(
            exercises.clone(),
            participations.clone(),
            continuous_integration.clone(),
            version_control.clone(),
        );
        let participation_service = ParticipationService::new(participations.clone());

        Self {
            exercises,
            participations,
            quiz_submissions,
            results,
            exercise_service,
            participation_service,
            continuous_integration,
            version_control,
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/exercises",
            post(exercise_resource::create)
                .put(exercise_resource::update)
                .get(exercise_resource::list),
        )
        .route(
            "/api/exercises/{id}",
            get(exercise_resource::get_one).delete(exercise_resource::delete),
        )
        .route(
            "/api/exercises/{id}/participations",
            delete(exercise_resource::reset),
        )
        .route("/api/exercises/{id}/cleanup", delete(exercise_resource::cleanup))
        .route("/api/exercises/{id}/archive", get(exercise_resource::archive))
        .route(
            "/api/courses/{course_id}/exercises",
            get(exercise_resource::list_for_course),
        )
        .route(
            "/api/courses/{course_id}/exercises/{exercise_id}/submissions/my-latest",
            get(quiz_submission_resource::my_latest),
        )
        .route(
            "/api/quiz-submissions",
            post(quiz_submission_resource::create)
                .put(quiz_submission_resource::update)
                .get(quiz_submission_resource::list),
        )
        .route(
            "/api/quiz-submissions/{id}",
            get(quiz_submission_resource::get_one).delete(quiz_submission_resource::delete),
        )
        .with_state(state)
}
