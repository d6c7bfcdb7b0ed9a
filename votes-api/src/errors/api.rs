use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};
use votes_service::VoteError;

/// Errors returned to HTTP callers.
///
/// Storage detail is logged but never sent back; callers only see a generic message
/// for server-side failures.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing or invalid caller identity")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Vote(#[from] VoteError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Vote(err) => match err {
                VoteError::InvalidTarget(_)
                | VoteError::InvalidRating { .. }
                | VoteError::InvalidText { .. } => StatusCode::BAD_REQUEST,
                VoteError::TargetNotFound(_) | VoteError::VoteNotFound(_) => StatusCode::NOT_FOUND,
                VoteError::DuplicateVote(_) | VoteError::StorageUnavailable(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        } else {
            debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (
            status,
            Json(json!({
                "status": "error",
                "message": self.public_message(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use votes_shared::types::{Rating, TargetKind, TargetRef};

    #[test]
    fn test_status_mapping() {
        let target = TargetRef::claim(Uuid::new_v4());
        let cases = [
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ApiError::bad_request("no body"), StatusCode::BAD_REQUEST),
            (
                VoteError::invalid_target("two ids").into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                VoteError::InvalidRating {
                    kind: TargetKind::Article,
                    rating: Rating::NEUTRAL,
                }
                .into(),
                StatusCode::BAD_REQUEST,
            ),
            (VoteError::InvalidText { max: 128 }.into(), StatusCode::BAD_REQUEST),
            (VoteError::TargetNotFound(target).into(), StatusCode::NOT_FOUND),
            (VoteError::VoteNotFound(target).into(), StatusCode::NOT_FOUND),
            (
                VoteError::DuplicateVote(target).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                VoteError::storage("pool timed out").into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected, "{err}");
        }
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let err = ApiError::from(VoteError::storage("password authentication failed"));
        assert_eq!(err.public_message(), "Internal server error");

        let err = ApiError::from(VoteError::InvalidText { max: 128 });
        assert!(err.public_message().contains("128"));
    }
}
