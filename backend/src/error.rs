use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::analysis::mood_series::SeriesError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("Upstream service unavailable, please try again")]
    Upstream,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SeriesError> for AppError {
    fn from(e: SeriesError) -> Self {
        match e {
            SeriesError::InvalidArgument(msg) => AppError::Validation(msg),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = e
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            AppError::NotConfigured(_) | AppError::Upstream => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                )
            }
        };

        let body = json!({
            "error": {
                "message": message,
                "code": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(range(min = 1, max = 5, message = "Mood must be between 1 and 5"))]
        mood: i32,
        #[validate(length(min = 1))]
        title: String,
    }

    #[test]
    fn test_series_error_maps_to_validation() {
        let err: AppError = SeriesError::InvalidArgument("window_days must be positive".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_validation_errors_use_field_messages() {
        let probe = Probe {
            mood: 9,
            title: String::new(),
        };
        let err: AppError = probe.validate().unwrap_err().into();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("Mood must be between 1 and 5"));
                assert!(msg.contains("title is invalid"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Unauthorized.into_response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::RateLimited.into_response().status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(AppError::Upstream.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            AppError::NotConfigured("Chat").into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
