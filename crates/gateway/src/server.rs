use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        response::{Html, IntoResponse, Json},
        routing::{get, post},
    },
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

use {perch_config::PerchConfig, perch_panel::PanelClient, perch_whatsapp::SessionManager};

use crate::{ai, ai::AiProxy, panel_api, state::AppState, whatsapp_api};

/// Build the relay router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(dashboard_handler))
        .route("/health", get(health_handler))
        .route("/api/pterodactyl/servers", get(panel_api::servers))
        .route("/api/pterodactyl/nodes", get(panel_api::nodes))
        .route("/api/pterodactyl/users", get(panel_api::users))
        .route("/api/test/pterodactyl", get(panel_api::probe))
        .route("/api/whatsapp/status", get(whatsapp_api::status))
        .route("/api/whatsapp/chats", get(whatsapp_api::chats))
        .route("/api/whatsapp/groups", get(whatsapp_api::groups))
        .route("/api/whatsapp/group/{group_id}", get(whatsapp_api::group))
        .route(
            "/api/whatsapp/channel/{channel_id}",
            get(whatsapp_api::channel),
        )
        .route("/api/whatsapp/send", post(whatsapp_api::send))
        .route("/api/ai/generate", post(ai::generate))
        .layer(cors)
        .with_state(state)
}

/// Start the relay HTTP server. Runs until the process exits.
pub async fn start(config: &PerchConfig, session: Arc<SessionManager>) -> anyhow::Result<()> {
    let panel = PanelClient::new(&config.panel.base_url, &config.panel.api_key)?;
    let ai = AiProxy::new(config.ai.model_server_url.clone())?;
    let state = AppState::new(panel, session, ai);

    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Startup banner.
    let lines = [
        format!("perch v{}", env!("CARGO_PKG_VERSION")),
        format!("listening on {addr}"),
        format!("panel: {}", config.panel.base_url),
    ];
    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));

    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn dashboard_handler() -> impl IntoResponse {
    Html(include_str!("assets/dashboard.html"))
}
