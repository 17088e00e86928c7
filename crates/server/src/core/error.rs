use crate::core::store::StoreError;
use crate::core::validation::Violation;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {}", join_violations(.0))]
    InvalidInput(Vec<Violation>),

    #[error("name already registered: {0}")]
    Conflict(String),

    #[error("participant not found: {0}")]
    NotFound(String),

    #[error("sender is not a registered participant: {0}")]
    Unauthorized(String),

    #[error("store failure: {0}")]
    Store(StoreError),
}

pub type Result<T> = core::result::Result<T, Error>;

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Store-level conflicts and misses are expected outcomes, not failures.
impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(key) => Error::Conflict(key),
            StoreError::NotFound(key) => Error::NotFound(key),
            other => Error::Store(other),
        }
    }
}

// Unreadable bodies are invalid input like any other shape problem.
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidInput(vec![Violation::new("body", rejection.body_text())])
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Error::InvalidInput(violations) => json!({
                "error": {
                    "message": "invalid input",
                    "details": violations,
                }
            }),
            Error::Store(err) => {
                error!("Store failure: {}", err);
                json!({
                    "error": {
                        "message": "internal server error"
                    }
                })
            }
            other => json!({
                "error": {
                    "message": other.to_string()
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            Error::InvalidInput(vec![]).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(Error::Conflict("a".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(Error::NotFound("a".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Unauthorized("a".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn store_errors_keep_their_meaning() {
        assert!(matches!(
            Error::from(StoreError::Conflict("Alice".into())),
            Error::Conflict(name) if name == "Alice"
        ));
        let err = Error::from(StoreError::Unexpected(anyhow::anyhow!("disk on fire")));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
