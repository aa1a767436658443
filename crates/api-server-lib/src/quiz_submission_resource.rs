//! REST handlers for quiz submissions, including the my-latest endpoint
//! that lazily creates an empty submission for the acting student.

use api::quiz::QuizSubmission;
use api::result::SubmissionResult;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{info, instrument};

use crate::auth::ActingUser;
use crate::error::{creation_headers, deletion_headers, update_headers, ApiError};
use crate::AppState;

const ENTITY: &str = "quizSubmission";

#[instrument(skip(state, submission))]
pub async fn create(
    State(state): State<AppState>,
    _user: ActingUser,
    Json(submission): Json<QuizSubmission>,
) -> Result<Response, ApiError> {
    if submission.id.is_some() {
        return Err(ApiError::bad_request_alert(
            ENTITY,
            "idexists",
            "A new quizSubmission cannot already have an id",
        ));
    }

    let saved = state.quiz_submissions.save(&submission).await?;
    let id = saved.id.unwrap_or_default();
    let headers = creation_headers(ENTITY, id, &format!("/api/quiz-submissions/{}", id));
    Ok((StatusCode::CREATED, headers, Json(saved)).into_response())
}

#[instrument(skip(state, submission), fields(id = submission.id))]
pub async fn update(
    State(state): State<AppState>,
    user: ActingUser,
    Json(submission): Json<QuizSubmission>,
) -> Result<Response, ApiError> {
    let Some(id) = submission.id else {
        return create(State(state), user, Json(submission)).await;
    };

    let saved = state.quiz_submissions.save(&submission).await?;
    Ok((StatusCode::OK, update_headers(ENTITY, id), Json(saved)).into_response())
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    _user: ActingUser,
) -> Result<Response, ApiError> {
    let submissions = state.quiz_submissions.find_all().await?;
    Ok(Json(submissions).into_response())
}

#[instrument(skip(state))]
pub async fn get_one(
    State(state): State<AppState>,
    _user: ActingUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    match state.quiz_submissions.find_by_id(id).await? {
        Some(submission) => Ok(Json(submission).into_response()),
        None => Err(ApiError::NotFound),
    }
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    _user: ActingUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    state.quiz_submissions.delete_by_id(id).await?;
    Ok((StatusCode::OK, deletion_headers(ENTITY, id)).into_response())
}

/// The acting student's latest submission for the exercise. Initializes the
/// participation and, when no graded result exists yet, creates an empty
/// submission with its result so repeated calls return the same submission.
#[instrument(skip(state), fields(user = user.login))]
pub async fn my_latest(
    State(state): State<AppState>,
    user: ActingUser,
    Path((_course_id, exercise_id)): Path<(i64, i64)>,
) -> Result<Response, ApiError> {
    let Some(exercise) = state.exercises.find_by_id(exercise_id).await? else {
        return Err(ApiError::bad_request_alert(
            "submission",
            "exerciseNotFound",
            "No exercise was found for the given id",
        ));
    };

    let participation = state.participation_service.init(&exercise, &user.login).await?;
    let participation_id = participation
        .id
        .ok_or_else(|| ApiError::Internal("participation was not persisted".to_string()))?;

    let latest = state
        .results
        .find_first_by_participation_id_order_by_completion_date_desc(participation_id)
        .await?;

    let submission = match latest {
        Some(result) => match result.submission_id {
            Some(submission_id) => state
                .quiz_submissions
                .find_by_id(submission_id)
                .await?
                .ok_or(ApiError::NotFound)?,
            None => {
                let submission = state.quiz_submissions.save(&QuizSubmission::new()).await?;
                let mut result = result;
                result.submission_id = submission.id;
                state.results.save(&result).await?;
                submission
            }
        },
        None => {
            let submission = state.quiz_submissions.save(&QuizSubmission::new()).await?;
            let mut result = SubmissionResult::for_participation(participation_id);
            result.submission_id = submission.id;
            state.results.save(&result).await?;
            info!(
                "created initial submission {:?} for participation {}",
                submission.id, participation_id
            );
            submission
        }
    };

    Ok(Json(submission).into_response())
}
