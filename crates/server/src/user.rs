//! Sign-up, log-in and user profiles.

use api_types::{
    auth::{AuthResponse, LogIn, SignUp},
    user::{PictureUpdated, UserProfile},
};
use axum::{Extension, body::Bytes, extract::State, http::StatusCode};
use engine::{Caller, EngineError, FieldErrors, can_act};
use uuid::Uuid;

use crate::{
    ServerError,
    blob::{PROFILE_FOLDER, swap_picture},
    extract::{Json, Path},
    hash_password, issue_token,
    server::ServerState,
    verify_password, views,
};

const PASSWORD_MIN_CHARS: usize = 6;

fn check_password(payload: &SignUp) -> Result<(), EngineError> {
    let mut errors = FieldErrors::default();
    if payload.password.chars().count() < PASSWORD_MIN_CHARS {
        errors.push(
            "password",
            format!("password must be at least {PASSWORD_MIN_CHARS} characters"),
        );
    }
    if payload.password != payload.confirm_password {
        errors.push("confirm_password", "passwords do not match");
    }
    errors.into_result()
}

fn bad_credentials() -> ServerError {
    ServerError::Unauthorized("invalid username or password".to_string())
}

pub async fn sign_up(
    State(state): State<ServerState>,
    Json(payload): Json<SignUp>,
) -> Result<(StatusCode, Json<AuthResponse>), ServerError> {
    check_password(&payload)?;

    let hash = hash_password(&payload.password)?;
    let user = state
        .engine
        .create_user(&payload.username, &hash, false)
        .await?;
    let token = issue_token(&user, &state.tokens)?;
    tracing::info!(user_id = %user.id, "user signed up");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: views::user(user),
        }),
    ))
}

pub async fn log_in(
    State(state): State<ServerState>,
    Json(payload): Json<LogIn>,
) -> Result<Json<AuthResponse>, ServerError> {
    let credentials = match state.engine.user_credentials(&payload.username).await {
        Ok(credentials) => credentials,
        Err(EngineError::KeyNotFound(_)) => return Err(bad_credentials()),
        Err(err) => return Err(err.into()),
    };
    if !verify_password(&payload.password, &credentials.password_hash)? {
        return Err(bad_credentials());
    }

    let token = issue_token(&credentials.user, &state.tokens)?;
    Ok(Json(AuthResponse {
        token,
        user: views::user(credentials.user),
    }))
}

pub async fn profile(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserProfile>, ServerError> {
    let profile = state.engine.user_profile(user_id, &caller).await?;
    Ok(Json(views::user_profile(profile)))
}

pub async fn picture(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<PictureUpdated>, ServerError> {
    if !can_act(&caller, Some(user_id)) {
        return Err(EngineError::Forbidden("not allowed to modify this profile".to_string()).into());
    }

    let url = swap_picture(
        state.blobs.as_ref(),
        PROFILE_FOLDER,
        body.to_vec(),
        |url| state.engine.set_profile_picture(user_id, url, &caller),
    )
    .await?;
    Ok(Json(PictureUpdated { url }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up(password: &str, confirm: &str) -> SignUp {
        SignUp {
            username: "alice".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn password_rules() {
        assert!(check_password(&sign_up("secret", "secret")).is_ok());

        let Err(EngineError::Validation(fields)) = check_password(&sign_up("abc", "abd")) else {
            panic!("expected validation error");
        };
        let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, ["password", "confirm_password"]);
    }
}
