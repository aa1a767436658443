//! REST handlers for exercises: CRUD, course listings, participation reset,
//! build-plan cleanup and repository archival.

use api::exercise::{Exercise, ExerciseVariant};
use api::page::Page;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::path::Path as FsPath;
use tracing::{info, instrument};

use crate::auth::{ActingUser, Role};
use crate::error::{
    alert_headers, creation_headers, deletion_headers, header_value, update_headers, ApiError,
};
use crate::pagination::{pagination_headers, PageQuery};
use crate::AppState;

const ENTITY: &str = "exercise";

/// Course listings serve full course pages to the web client at once.
const COURSE_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct CourseExercisesQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
    #[serde(rename = "withLtiOutcomeUrlExisting")]
    pub with_lti_outcome_url_existing: Option<bool>,
}

/// Rejects programming exercises whose build plan or repository the
/// collaborators do not know. Absent collaborators fail closed.
async fn validate(state: &AppState, exercise: &Exercise) -> Result<(), ApiError> {
    let ExerciseVariant::Programming {
        base_build_plan_id,
        base_repository_url,
    } = &exercise.variant
    else {
        return Ok(());
    };

    let plan_is_valid = match &state.continuous_integration {
        Some(ci) => ci.build_plan_id_is_valid(base_build_plan_id).await,
        None => false,
    };
    if !plan_is_valid {
        return Err(ApiError::bad_request_alert(
            ENTITY,
            "invalid.build.plan.id",
            "The base build plan id does not exist",
        ));
    }

    let url_is_valid = match &state.version_control {
        Some(vcs) => vcs.repository_url_is_valid(base_repository_url).await,
        None => false,
    };
    if !url_is_valid {
        return Err(ApiError::bad_request_alert(
            ENTITY,
            "invalid.repository.url",
            "The base repository url does not exist",
        ));
    }
    Ok(())
}

#[instrument(skip(state, exercise), fields(title = exercise.title))]
pub async fn create(
    State(state): State<AppState>,
    user: ActingUser,
    Json(exercise): Json<Exercise>,
) -> Result<Response, ApiError> {
    user.require(Role::Ta)?;
    if exercise.id.is_some() {
        return Err(ApiError::bad_request_alert(
            ENTITY,
            "idexists",
            "A new exercise cannot already have an id",
        ));
    }
    validate(&state, &exercise).await?;

    let saved = state.exercises.save(&exercise).await?;
    let id = saved.id.unwrap_or_default();
    let headers = creation_headers(ENTITY, id, &format!("/api/exercises/{}", id));
    Ok((StatusCode::CREATED, headers, Json(saved)).into_response())
}

#[instrument(skip(state, exercise), fields(id = exercise.id))]
pub async fn update(
    State(state): State<AppState>,
    user: ActingUser,
    Json(exercise): Json<Exercise>,
) -> Result<Response, ApiError> {
    user.require(Role::Ta)?;
    let Some(id) = exercise.id else {
        return create(State(state), user, Json(exercise)).await;
    };
    validate(&state, &exercise).await?;

    let saved = state.exercises.save(&exercise).await?;
    Ok((StatusCode::OK, update_headers(ENTITY, id), Json(saved)).into_response())
}

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    user: ActingUser,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    user.require(Role::Ta)?;
    let request = query.to_request(api::page::DEFAULT_PAGE_SIZE);
    let page = state.exercises.find_all(&request).await?;
    let headers = pagination_headers(&page, &request, "/api/exercises");
    Ok((StatusCode::OK, headers, Json(page.content)).into_response())
}

#[instrument(skip(state, query), fields(user = user.login))]
pub async fn list_for_course(
    State(state): State<AppState>,
    user: ActingUser,
    Path(course_id): Path<i64>,
    Query(query): Query<CourseExercisesQuery>,
) -> Result<Response, ApiError> {
    let page_query = PageQuery {
        page: query.page,
        size: query.size,
        sort: query.sort,
    };
    let request = page_query.to_request(COURSE_PAGE_SIZE);
    let page: Page<Exercise> = if query.with_lti_outcome_url_existing.unwrap_or(false) {
        state
            .exercises
            .find_by_course_id_where_lti_outcome_url_exists(course_id, &user.login, &request)
            .await?
    } else {
        state.exercises.find_by_course_id(course_id, &request).await?
    };
    let headers = pagination_headers(
        &page,
        &request,
        &format!("/api/courses/{}/exercises", course_id),
    );
    Ok((StatusCode::OK, headers, Json(page.content)).into_response())
}

#[instrument(skip(state))]
pub async fn get_one(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    user.require(Role::Ta)?;
    match state.exercises.find_by_id(id).await? {
        Some(exercise) => Ok(Json(exercise).into_response()),
        None => Err(ApiError::NotFound),
    }
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    user.require(Role::Ta)?;
    state.exercise_service.delete(id).await?;
    Ok((StatusCode::OK, deletion_headers(ENTITY, id)).into_response())
}

/// Removes every participation, returning the exercise to a clean slate.
#[instrument(skip(state))]
pub async fn reset(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    user.require(Role::Ta)?;
    if let Some(exercise) = state.exercises.find_by_id(id).await? {
        state.exercise_service.reset(&exercise).await?;
    }
    Ok((
        StatusCode::OK,
        alert_headers("exerciseApp.exercise.reset", &id.to_string()),
    )
        .into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct CleanupQuery {
    #[serde(rename = "deleteRepositories")]
    pub delete_repositories: Option<bool>,
}

#[instrument(skip(state, query))]
pub async fn cleanup(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<i64>,
    Query(query): Query<CleanupQuery>,
) -> Result<Response, ApiError> {
    user.require(Role::Ta)?;
    let delete_repositories = query.delete_repositories.unwrap_or(false);
    let archive = state.exercise_service.cleanup(id, delete_repositories).await?;
    match archive {
        Some(path) => zip_response(&path).await,
        None => Ok((
            StatusCode::OK,
            alert_headers(
                "Cleanup was successful. No repositories needed to be deleted.",
                &id.to_string(),
            ),
        )
            .into_response()),
    }
}

#[instrument(skip(state))]
pub async fn archive(
    State(state): State<AppState>,
    user: ActingUser,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    user.require(Role::Ta)?;
    match state.exercise_service.archive(id).await? {
        Some(path) => zip_response(&path).await,
        None => Ok((
            StatusCode::NO_CONTENT,
            alert_headers(
                "There was nothing to archive for this exercise.",
                &id.to_string(),
            ),
        )
            .into_response()),
    }
}

async fn zip_response(path: &FsPath) -> Result<Response, ApiError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("archive.zip");
    info!("serving archive {} ({} bytes)", file_name, bytes.len());

    let mut headers = HeaderMap::new();
    headers.insert("Content-Type", header_value("application/octet-stream"));
    headers.insert("filename", header_value(file_name));
    Ok((StatusCode::OK, headers, bytes).into_response())
}
