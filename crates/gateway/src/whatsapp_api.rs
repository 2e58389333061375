//! Messaging endpoints.
//!
//! Everything except `status` guards on session readiness first: a session
//! that is not ready answers 503 without touching the backend.

use {
    axum::{
        body::Bytes,
        extract::{Path, State},
    },
    serde::Deserialize,
    serde_json::json,
};

use perch_whatsapp::SessionManager;

use crate::{
    records::{shape_channel, shape_chat, shape_group, shape_group_summary},
    reply::{ApiError, ApiResult, ok_data, ok_message},
    state::AppState,
};

fn guard(session: &SessionManager) -> Result<(), ApiError> {
    if session.ready() {
        Ok(())
    } else {
        Err(ApiError::service_unavailable("messaging session not ready"))
    }
}

/// GET /api/whatsapp/status
pub async fn status(State(state): State<AppState>) -> ApiResult {
    let session = &state.session;
    Ok(ok_data(json!({
        "ready": session.ready(),
        "state": session.state().await.as_str(),
        "lastDisconnectReason": session.last_disconnect_reason().await,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

/// GET /api/whatsapp/chats
pub async fn chats(State(state): State<AppState>) -> ApiResult {
    guard(&state.session)?;
    let chats = state.session.chats().await?;
    Ok(ok_data(chats.iter().map(shape_chat).collect::<Vec<_>>()))
}

/// GET /api/whatsapp/groups
pub async fn groups(State(state): State<AppState>) -> ApiResult {
    guard(&state.session)?;
    let groups = state.session.groups().await?;
    Ok(ok_data(
        groups.iter().map(shape_group_summary).collect::<Vec<_>>(),
    ))
}

/// GET /api/whatsapp/group/{group_id}
pub async fn group(Path(group_id): Path<String>, State(state): State<AppState>) -> ApiResult {
    guard(&state.session)?;
    let metadata = state.session.group_info(&group_id).await?;
    Ok(ok_data(shape_group(&metadata)))
}

/// GET /api/whatsapp/channel/{channel_id}
pub async fn channel(Path(channel_id): Path<String>, State(state): State<AppState>) -> ApiResult {
    guard(&state.session)?;
    let chat = state.session.channel_info(&channel_id).await?;
    Ok(ok_data(shape_channel(&chat)))
}

#[derive(Deserialize)]
struct SendRequest {
    number: String,
    message: String,
}

/// POST /api/whatsapp/send
pub async fn send(State(state): State<AppState>, body: Bytes) -> ApiResult {
    guard(&state.session)?;
    let request: SendRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?;
    if request.number.is_empty() {
        return Err(ApiError::bad_request("'number' must not be empty"));
    }
    if request.message.is_empty() {
        return Err(ApiError::bad_request("'message' must not be empty"));
    }

    state
        .session
        .send_text(&request.number, &request.message)
        .await?;
    Ok(ok_message("message sent"))
}
