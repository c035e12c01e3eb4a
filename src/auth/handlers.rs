use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, TokenResponse},
        jwt::JwtKeys,
        password,
    },
    error::ApiError,
    state::AppState,
    users::repo::User,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Is this username/password pair valid? Unknown usernames and wrong
/// passwords both come back `false`; only infrastructure failures error.
async fn authenticate(db: &PgPool, username: &str, plain: &str) -> Result<bool, ApiError> {
    match User::find_by_username(db, username).await? {
        Some(user) => Ok(password::verify_password(plain, &user.password)?),
        None => Ok(false),
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if payload.password.is_empty() {
        warn!(username = %payload.username, "registration without password");
        return Err(ApiError::MissingCredential("password is required"));
    }

    let hash = password::hash_password(&payload.password, &state.config.password)?;

    // Duplicate usernames surface as a unique-constraint violation on the
    // insert itself, which From<sqlx::Error> classifies.
    let user = User::create(
        &state.db,
        &payload.username,
        &hash,
        &payload.first_name,
        &payload.last_name,
        &payload.phone,
    )
    .await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user.username)?;

    info!(username = %user.username, "user registered");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::MissingCredential(
            "username and password are required",
        ));
    }

    // One error for unknown user and wrong password alike.
    if !authenticate(&state.db, &payload.username, &payload.password).await? {
        warn!(username = %payload.username, "failed login");
        return Err(ApiError::InvalidCredentials);
    }

    User::update_last_login(&state.db, &payload.username).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&payload.username)?;

    info!(username = %payload.username, "user logged in");
    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_serializes_token_field() {
        let response = TokenResponse {
            token: "abc.def.ghi".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"token":"abc.def.ghi"}"#);
    }
}
