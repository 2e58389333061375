use std::sync::Arc;

use {perch_panel::PanelClient, perch_whatsapp::SessionManager};

use crate::ai::AiProxy;

/// Shared app state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub panel: PanelClient,
    pub session: Arc<SessionManager>,
    pub ai: AiProxy,
}

impl AppState {
    pub fn new(panel: PanelClient, session: Arc<SessionManager>, ai: AiProxy) -> Self {
        Self { panel, session, ai }
    }
}
