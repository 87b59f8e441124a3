use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        avatar::gravatar_url,
        dto::{LoginRequest, RegisterRequest, TokenResponse},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::User,
    },
    error::{ApiError, FieldError},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", post(register))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth", post(login).get(current_user))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let mut errors = Vec::new();
    if payload.name.trim().is_empty() {
        errors.push(FieldError::field("name", "Name is required"));
    }
    if !is_valid_email(&payload.email) {
        errors.push(FieldError::field("email", "Enter a valid email"));
    }
    if payload.password.len() < 6 {
        errors.push(FieldError::field(
            "password",
            "Password must have at least 6 characters",
        ));
    }
    if !errors.is_empty() {
        warn!(email = %payload.email, "registration payload rejected");
        return Err(ApiError::Validation(errors));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("User already exists"));
    }

    let avatar = gravatar_url(&payload.email);
    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, payload.name.trim(), &payload.email, &hash, &avatar).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let mut errors = Vec::new();
    if !is_valid_email(&payload.email) {
        errors.push(FieldError::field("email", "Enter a valid email"));
    }
    if payload.password.is_empty() {
        errors.push(FieldError::field("password", "Password is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(ApiError::BadRequest("Invalid credentials"));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::BadRequest("Invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state))]
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::Auth("User not found".into()))?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("alice@x.com"));
        assert!(is_valid_email("a.b+c@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@nodot"));
        assert!(!is_valid_email("a b@x.com"));
    }
}
