//! Panel monitoring endpoints.

use axum::extract::State;

use crate::{
    records::{shape_node, shape_server, shape_user},
    reply::{ApiResult, ok_data, ok_message},
    state::AppState,
};

/// GET /api/pterodactyl/servers
pub async fn servers(State(state): State<AppState>) -> ApiResult {
    let servers = state.panel.list_servers().await?;
    Ok(ok_data(
        servers.iter().map(shape_server).collect::<Vec<_>>(),
    ))
}

/// GET /api/pterodactyl/nodes
pub async fn nodes(State(state): State<AppState>) -> ApiResult {
    let nodes = state.panel.list_nodes().await?;
    Ok(ok_data(nodes.iter().map(shape_node).collect::<Vec<_>>()))
}

/// GET /api/pterodactyl/users
pub async fn users(State(state): State<AppState>) -> ApiResult {
    let users = state.panel.list_users().await?;
    Ok(ok_data(users.iter().map(shape_user).collect::<Vec<_>>()))
}

/// GET /api/test/pterodactyl
pub async fn probe(State(state): State<AppState>) -> ApiResult {
    state.panel.probe().await?;
    Ok(ok_message("panel reachable"))
}
