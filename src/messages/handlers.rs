use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::Principal,
    error::ApiError,
    state::AppState,
};

use super::{
    dto::{CreateMessageRequest, MessageResponse, ReadReceipt, ReadResponse},
    repo::Message,
};

pub fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(create_message))
        .route("/messages/:id", get(get_message))
        .route("/messages/:id/read", post(mark_read))
}

#[instrument(skip(state, principal, payload))]
pub async fn create_message(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CreateMessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    // The sender is the verified token's username; an unknown recipient
    // fails the foreign key and comes back as 404.
    let created =
        Message::create(&state.db, &principal.0, &payload.to_username, &payload.body).await?;

    let row = Message::find_detail(&state.db, created.id)
        .await?
        .ok_or(ApiError::NotFound("message"))?;

    info!(id = created.id, from = %principal.0, to = %payload.to_username, "message sent");
    Ok(Json(MessageResponse {
        message: row.into(),
    }))
}

#[instrument(skip(state, principal))]
pub async fn get_message(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let row = Message::find_detail(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("message"))?;

    if !row.involves(&principal.0) {
        return Err(ApiError::Unauthorized);
    }

    Ok(Json(MessageResponse {
        message: row.into(),
    }))
}

#[instrument(skip(state, principal))]
pub async fn mark_read(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<i64>,
) -> Result<Json<ReadResponse>, ApiError> {
    let message = Message::find(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("message"))?;

    if !message.sent_to(&principal.0) {
        return Err(ApiError::Unauthorized);
    }

    let updated = Message::mark_read(&state.db, id).await?;

    info!(id = updated.id, by = %principal.0, "message marked read");
    Ok(Json(ReadResponse {
        message: ReadReceipt {
            id: updated.id,
            read_at: updated.read_at,
        },
    }))
}
