//! Dashboard-facing HTTP surface.
//!
//! Lifecycle:
//! 1. Load config, build the panel client and AI proxy
//! 2. Build the router over shared [`state::AppState`]
//! 3. Bind and serve
//!
//! Every endpoint answers `{success: true, data|message}` or
//! `{success: false, error}`; faults from the panel or the messaging session
//! are mapped to status codes in [`reply`], never propagated raw. Messaging
//! handlers guard on session readiness before touching the backend.

pub mod ai;
pub mod panel_api;
pub mod records;
pub mod reply;
pub mod server;
pub mod state;
pub mod whatsapp_api;
