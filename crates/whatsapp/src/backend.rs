//! Backend seam for the messaging automation SDK.
//!
//! The session manager never talks to a wire protocol directly; it drives a
//! [`Backend`] built fresh for each connection cycle by a [`BackendFactory`].
//! A driver implementation registers lifecycle events on the sender handed to
//! [`Backend::start`] and answers the async calls below.

use std::{path::PathBuf, sync::Arc};

use {async_trait::async_trait, tokio::sync::mpsc};

use crate::{
    session::{SessionError, SessionEvent},
    types::{Chat, GroupMetadata},
};

/// Location of the persistent identity store.
///
/// Credentials live on disk keyed by a fixed client identifier, so a process
/// restart resumes the authenticated session instead of demanding a fresh QR
/// scan (unless the credentials were invalidated upstream).
#[derive(Debug, Clone)]
pub struct IdentityStore {
    pub dir: PathBuf,
    pub client_id: String,
}

impl IdentityStore {
    pub fn new(dir: PathBuf, client_id: impl Into<String>) -> Self {
        Self {
            dir,
            client_id: client_id.into(),
        }
    }

    /// Directory for this client's credentials, created on demand.
    pub fn ensure(&self) -> std::io::Result<PathBuf> {
        let path = self.dir.join(&self.client_id);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }
}

/// The opaque SDK surface: lifecycle events plus async calls.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Begin connecting. Lifecycle events flow into `events` until the
    /// backend is dropped; the call returns once startup is under way, not
    /// once the session is ready.
    async fn start(&self, events: mpsc::UnboundedSender<SessionEvent>) -> Result<(), SessionError>;

    /// All chats the session currently has synced.
    async fn chats(&self) -> Result<Vec<Chat>, SessionError>;

    /// Look up one chat by serialized JID.
    async fn chat_by_id(&self, jid: &str) -> Result<Chat, SessionError>;

    /// Group detail for a group JID.
    async fn group_metadata(&self, jid: &str) -> Result<GroupMetadata, SessionError>;

    /// Send a plain text message to a serialized JID.
    async fn send_text(&self, to: &str, body: &str) -> Result<(), SessionError>;
}

/// Builds a fresh [`Backend`] per connection cycle.
///
/// Reinitialization after a disconnect goes through here; the previous
/// backend object is discarded whole.
pub trait BackendFactory: Send + Sync {
    fn create(&self, identity: &IdentityStore) -> Result<Arc<dyn Backend>, SessionError>;
}

/// Stand-in backend used until a concrete driver is wired.
///
/// Emits no lifecycle events, so readiness stays false and the router's
/// guards answer for every messaging endpoint.
#[derive(Debug, Default)]
pub struct NoopBackend;

#[async_trait]
impl Backend for NoopBackend {
    async fn start(&self, _events: mpsc::UnboundedSender<SessionEvent>) -> Result<(), SessionError> {
        Ok(())
    }

    async fn chats(&self) -> Result<Vec<Chat>, SessionError> {
        Err(SessionError::unavailable())
    }

    async fn chat_by_id(&self, _jid: &str) -> Result<Chat, SessionError> {
        Err(SessionError::unavailable())
    }

    async fn group_metadata(&self, _jid: &str) -> Result<GroupMetadata, SessionError> {
        Err(SessionError::unavailable())
    }

    async fn send_text(&self, _to: &str, _body: &str) -> Result<(), SessionError> {
        Err(SessionError::unavailable())
    }
}

#[derive(Debug, Default)]
pub struct NoopBackendFactory;

impl BackendFactory for NoopBackendFactory {
    fn create(&self, _identity: &IdentityStore) -> Result<Arc<dyn Backend>, SessionError> {
        Ok(Arc::new(NoopBackend))
    }
}
