use api_types::error::{ErrorBody, FieldError};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

pub use auth::{
    AuthError, Claims, TokenConfig, hash_password, issue_token, verify_password, verify_token,
};
pub use blob::{BlobError, BlobStore, LocalBlobStore, public_id};
pub use server::{ServerState, router, run_with_listener};

pub mod auth;
pub mod blob;
mod categories;
mod extract;
mod gold;
mod health;
mod inventory;
mod items;
mod server;
mod user;
mod views;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    Unauthorized(String),
    Internal(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::KeyNotFound(_) | EngineError::NotInInventory(_) => StatusCode::NOT_FOUND,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::Conflict(_) | EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidId(_) | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn code_for_engine_error(err: &EngineError) -> &'static str {
    match err {
        EngineError::Validation(_) => "validation_failed",
        EngineError::KeyNotFound(_) => "not_found",
        EngineError::NotInInventory(_) => "not_in_inventory",
        EngineError::Forbidden(_) => "forbidden",
        EngineError::Conflict(_) => "conflict",
        EngineError::ExistingKey(_) => "already_exists",
        EngineError::InvalidId(_) | EngineError::Database(_) => "internal",
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorBody {
    let code = code_for_engine_error(&err).to_string();
    match err {
        EngineError::Validation(fields) => ErrorBody {
            error: "validation failed".to_string(),
            code,
            fields: Some(
                fields
                    .into_inner()
                    .into_iter()
                    .map(|f| FieldError {
                        field: f.field,
                        message: f.message,
                    })
                    .collect(),
            ),
        },
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            internal_body(code)
        }
        EngineError::InvalidId(msg) => {
            tracing::error!("corrupt id in storage: {msg}");
            internal_body(code)
        }
        other => ErrorBody {
            error: other.to_string(),
            code,
            fields: None,
        },
    }
}

fn internal_body(code: String) -> ErrorBody {
    ErrorBody {
        error: "internal server error".to_string(),
        code,
        fields: None,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error,
                    code: "bad_request".to_string(),
                    fields: None,
                },
            ),
            ServerError::Unauthorized(error) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    error,
                    code: "unauthorized".to_string(),
                    fields: None,
                },
            ),
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    internal_body("internal".to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Engine(EngineError::invalid("body", value.body_text()))
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Engine(EngineError::invalid("path", value.body_text()))
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<BlobError> for ServerError {
    fn from(value: BlobError) -> Self {
        match value {
            BlobError::Empty => Self::Generic("picture body must not be empty".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use engine::FieldErrors;

    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = ServerError::from(EngineError::NotInInventory("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflicts_map_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_400_with_fields() {
        let mut fields = FieldErrors::default();
        fields.push("name", "must not be empty");
        let err = EngineError::Validation(fields);
        assert_eq!(status_for_engine_error(&err), StatusCode::BAD_REQUEST);

        let body = body_for_engine_error(err);
        assert_eq!(body.code, "validation_failed");
        let fields = body.fields.unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field, "name");
    }

    #[test]
    fn database_errors_are_opaque() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("secret detail".to_string()));
        assert_eq!(status_for_engine_error(&err), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_for_engine_error(err);
        assert_eq!(body.error, "internal server error");
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let res = ServerError::Unauthorized("no token".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
