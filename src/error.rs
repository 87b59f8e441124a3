use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// One entry in a 400 validation payload. `param` names the offending
/// field; message-only entries (bad credentials, duplicate user) omit it.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<&'static str>,
    pub msg: &'static str,
}

impl FieldError {
    pub fn field(param: &'static str, msg: &'static str) -> Self {
        Self {
            param: Some(param),
            msg,
        }
    }

    pub fn msg(msg: &'static str) -> Self {
        Self { param: None, msg }
    }
}

/// Request-level error taxonomy. Everything a handler can fail with maps
/// onto one of these; nothing propagates past the handler boundary.
///
/// Display output may carry internal detail (database messages); it is
/// logged, never sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::BadRequest(msg) | ApiError::Conflict(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "errors": [FieldError::msg(msg)] })),
            )
                .into_response(),
            ApiError::Auth(msg) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "msg": msg }))).into_response()
            }
            ApiError::Forbidden(msg) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "msg": msg }))).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({ "msg": msg }))).into_response()
            }
            ApiError::Database(e) => {
                error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
            }
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400_with_field_entries() {
        let err = ApiError::Validation(vec![FieldError::field("name", "Name is required")]);
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let res = ApiError::NotFound("Post not found").into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn forbidden_maps_to_401() {
        let res = ApiError::Forbidden("User not authorized").into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn database_error_hides_detail() {
        let res = ApiError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn field_error_without_param_skips_key() {
        let json = serde_json::to_string(&FieldError::msg("Invalid credentials")).unwrap();
        assert!(!json.contains("param"));
        assert!(json.contains("Invalid credentials"));
    }
}
