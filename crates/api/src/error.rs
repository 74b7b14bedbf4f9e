use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Validation failure with per-field details.
    #[error("Validation error: {message}")]
    InvalidFields {
        message: String,
        details: Vec<ValidationDetail>,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg, None)
            }
            ApiError::InvalidFields { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                Some(details),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = ErrorBody {
            success: false,
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidRollback(msg) => {
                ApiError::Validation(msg)
            }
            DomainError::ContentValidation(issues) => {
                let details: Vec<ValidationDetail> = issues
                    .into_iter()
                    .map(|issue| ValidationDetail {
                        field: issue.field,
                        message: issue.message,
                    })
                    .collect();
                ApiError::InvalidFields {
                    message: summarize(&details),
                    details,
                }
            }
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::Storage(err) => ApiError::Internal(format!("Storage error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::InvalidFields {
            message: summarize(&details),
            details,
        }
    }
}

fn summarize(details: &[ValidationDetail]) -> String {
    if details.len() == 1 {
        details[0].message.clone()
    } else {
        format!("{} validation errors", details.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::ContentIssue;
    use domain::StoreError;

    #[test]
    fn test_domain_error_status_mapping() {
        let cases = [
            (DomainError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (DomainError::InvalidRollback("no".into()), StatusCode::BAD_REQUEST),
            (
                DomainError::ContentValidation(vec![ContentIssue::new("content", "too big")]),
                StatusCode::BAD_REQUEST,
            ),
            (DomainError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (DomainError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                DomainError::Storage(StoreError::Backend("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_content_issues_become_details() {
        let err = ApiError::from(DomainError::ContentValidation(vec![
            ContentIssue::new("elementId", "bad id"),
            ContentIssue::new("content", "Disallowed HTML tag <script>"),
        ]));
        match err {
            ApiError::InvalidFields { message, details } => {
                assert_eq!(message, "2 validation errors");
                assert_eq!(details[1].field, "content");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            format!("{}", ApiError::NotFound("test".to_string())),
            "Not found: test"
        );
        assert_eq!(
            format!("{}", ApiError::Validation("test".to_string())),
            "Validation error: test"
        );
        assert_eq!(
            format!("{}", ApiError::Internal("test".to_string())),
            "Internal error: test"
        );
    }

    #[test]
    fn test_service_unavailable() {
        let response = ApiError::ServiceUnavailable("maintenance".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
