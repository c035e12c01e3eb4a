use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{ensure_correct_user, Principal},
    error::ApiError,
    messages::{
        dto::{MessagesResponse, ReceivedMessage, SentMessage},
        repo::Message,
    },
    state::AppState,
    users::repo::User,
};

use super::dto::{UserResponse, UsersResponse};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:username", get(get_user))
        .route("/users/:username/to", get(messages_to))
        .route("/users/:username/from", get(messages_from))
}

#[instrument(skip(state, _principal))]
pub async fn list_users(
    State(state): State<AppState>,
    _principal: Principal,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(UsersResponse { users }))
}

#[instrument(skip(state, principal))]
pub async fn get_user(
    State(state): State<AppState>,
    principal: Principal,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    ensure_correct_user(&principal, &username)?;

    let user = User::find_by_username(&state.db, &username)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(UserResponse { user }))
}

/// Messages received by `:username`, each with the sender's public
/// profile.
#[instrument(skip(state, _principal))]
pub async fn messages_to(
    State(state): State<AppState>,
    _principal: Principal,
    Path(username): Path<String>,
) -> Result<Json<MessagesResponse<ReceivedMessage>>, ApiError> {
    let rows = Message::list_to(&state.db, &username).await?;
    let messages = rows.into_iter().map(ReceivedMessage::from).collect();
    Ok(Json(MessagesResponse { messages }))
}

/// Messages sent by `:username`, each with the recipient's public
/// profile.
#[instrument(skip(state, _principal))]
pub async fn messages_from(
    State(state): State<AppState>,
    _principal: Principal,
    Path(username): Path<String>,
) -> Result<Json<MessagesResponse<SentMessage>>, ApiError> {
    let rows = Message::list_from(&state.db, &username).await?;
    let messages = rows.into_iter().map(SentMessage::from).collect();
    Ok(Json(MessagesResponse { messages }))
}
