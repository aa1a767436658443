//! Request-level failures and the alert header convention shared with the
//! web client.

use api::{RepositoryError, ServiceError};
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::error;

pub const ALERT_HEADER: &str = "X-exerciseApp-alert";
pub const PARAMS_HEADER: &str = "X-exerciseApp-params";
pub const ERROR_HEADER: &str = "X-exerciseApp-error";

#[derive(Debug, Clone)]
pub enum ApiError {
    /// A validation failure that the client renders from the error headers.
    BadRequestAlert {
        entity: String,
        key: String,
        message: String,
    },
    NotFound,
    Unauthorized,
    Forbidden,
    Internal(String),
}

impl ApiError {
    pub fn bad_request_alert(entity: &str, key: &str, message: &str) -> Self {
        Self::BadRequestAlert {
            entity: entity.to_string(),
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ItemNotFoundError => Self::NotFound,
            other => {
                error!("{}", other);
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        error!("{}", err);
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequestAlert {
                entity,
                key,
                message,
            } => {
                let mut headers = HeaderMap::new();
                headers.insert(ERROR_HEADER, header_value(&message));
                headers.insert(PARAMS_HEADER, header_value(&entity));
                headers.insert(ALERT_HEADER, header_value(&key));
                (StatusCode::BAD_REQUEST, headers).into_response()
            }
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::Forbidden => StatusCode::FORBIDDEN.into_response(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Header values come from entity titles and file names, which may carry
/// characters a header cannot; those degrade to a placeholder instead of
/// failing the response.
pub(crate) fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or(HeaderValue::from_static("unprintable"))
}

pub(crate) fn creation_headers(entity: &str, id: i64, location: &str) -> HeaderMap {
    let mut headers = alert_headers(&format!("exerciseApp.{}.created", entity), &id.to_string());
    headers.insert(LOCATION, header_value(location));
    headers
}

pub(crate) fn update_headers(entity: &str, id: i64) -> HeaderMap {
    alert_headers(&format!("exerciseApp.{}.updated", entity), &id.to_string())
}

pub(crate) fn deletion_headers(entity: &str, id: i64) -> HeaderMap {
    alert_headers(&format!("exerciseApp.{}.deleted", entity), &id.to_string())
}

pub(crate) fn alert_headers(alert: &str, param: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ALERT_HEADER, header_value(alert));
    headers.insert(PARAMS_HEADER, header_value(param));
    headers
}
