use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use {
    thiserror::Error,
    tokio::{
        sync::{Mutex, RwLock, mpsc},
        task::JoinHandle,
    },
    tracing::{error, info, warn},
};

use crate::{
    backend::{Backend, BackendFactory, IdentityStore, NoopBackend},
    types::{self, Chat, GroupMetadata},
};

/// Delay between a disconnect and the replacement session's initialization.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SessionError {
    /// The session cannot serve calls right now (no backend, not connected).
    #[error("messaging session unavailable: {0}")]
    Unavailable(String),

    /// Lookup target does not exist.
    #[error("chat not found: {0}")]
    NotFound(String),

    /// A group operation resolved to a chat that is not a group.
    #[error("{0} is not a group chat")]
    NotAGroup(String),

    /// The backend failed mid-call.
    #[error("backend error: {0}")]
    Backend(String),
}

impl SessionError {
    pub fn unavailable() -> Self {
        Self::Unavailable("no messaging backend is wired".into())
    }
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initializing,
    QrPending,
    Authenticated,
    Ready,
    Disconnected,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::QrPending => "qr_pending",
            Self::Authenticated => "authenticated",
            Self::Ready => "ready",
            Self::Disconnected => "disconnected",
        }
    }
}

/// Lifecycle events emitted by the backend.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Authentication challenge to render for the operator.
    Qr(String),
    Authenticated,
    /// Session fully usable; chats are synced.
    Ready,
    AuthFailure(String),
    Disconnected(String),
}

// ── Shared readiness state ───────────────────────────────────────────────────

/// Cloneable view of the session's readiness and lifecycle state.
///
/// Written only by the event pump; read by router guards and the status
/// endpoint.
#[derive(Clone, Default)]
pub struct SessionHandle {
    inner: Arc<HandleInner>,
}

#[derive(Default)]
struct HandleInner {
    ready: AtomicBool,
    state: RwLock<SessionState>,
    last_disconnect: RwLock<Option<String>>,
}

impl SessionHandle {
    pub fn ready(&self) -> bool {
        self.inner.ready.load(Ordering::Acquire)
    }

    pub async fn state(&self) -> SessionState {
        *self.inner.state.read().await
    }

    pub async fn last_disconnect_reason(&self) -> Option<String> {
        self.inner.last_disconnect.read().await.clone()
    }

    fn set_ready(&self, ready: bool) {
        self.inner.ready.store(ready, Ordering::Release);
    }

    async fn set_state(&self, state: SessionState) {
        *self.inner.state.write().await = state;
    }

    async fn record_disconnect(&self, reason: String) {
        *self.inner.last_disconnect.write().await = Some(reason);
    }
}

// ── Session manager ──────────────────────────────────────────────────────────

/// Owns the single process-wide messaging session.
///
/// At most one backend is live at a time. A disconnect discards it and
/// schedules a full re-creation after [`RECONNECT_DELAY`]; the pending
/// attempt lives in a slot so a disconnect burst replaces it instead of
/// stacking duplicates.
pub struct SessionManager {
    identity: IdentityStore,
    factory: Arc<dyn BackendFactory>,
    handle: SessionHandle,
    backend: RwLock<Arc<dyn Backend>>,
    reconnect: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    pub fn new(identity: IdentityStore, factory: Arc<dyn BackendFactory>) -> Arc<Self> {
        Arc::new(Self {
            identity,
            factory,
            handle: SessionHandle::default(),
            backend: RwLock::new(Arc::new(NoopBackend)),
            reconnect: Mutex::new(None),
        })
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn ready(&self) -> bool {
        self.handle.ready()
    }

    pub async fn state(&self) -> SessionState {
        self.handle.state().await
    }

    pub async fn last_disconnect_reason(&self) -> Option<String> {
        self.handle.last_disconnect_reason().await
    }

    /// Construct a fresh backend and start it.
    ///
    /// Failures are logged and swallowed: a broken initialization must not
    /// take the relay down, and it does not auto-retry (unlike the disconnect
    /// path). Callers must not invoke concurrently before the prior session
    /// is torn down.
    pub async fn initialize(self: &Arc<Self>) {
        self.handle.set_state(SessionState::Initializing).await;

        if let Err(e) = self.identity.ensure() {
            error!(error = %e, dir = %self.identity.dir.display(), "identity store unavailable, session not started");
            return;
        }

        let backend = match self.factory.create(&self.identity) {
            Ok(b) => b,
            Err(e) => {
                error!(error = %e, "session initialization failed");
                return;
            },
        };
        *self.backend.write().await = Arc::clone(&backend);

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(Self::pump(Arc::clone(self), rx));

        if let Err(e) = backend.start(tx).await {
            error!(error = %e, "session start failed");
        }
    }

    /// Tear down: cancel any pending reconnect, drop the backend, clear
    /// readiness.
    pub async fn stop(&self) {
        if let Some(task) = self.reconnect.lock().await.take() {
            task.abort();
        }
        self.handle.set_ready(false);
        self.handle.set_state(SessionState::Uninitialized).await;
        *self.backend.write().await = Arc::new(NoopBackend);
        info!("session stopped");
    }

    fn pump(
        manager: Arc<Self>,
        mut rx: mpsc::UnboundedReceiver<SessionEvent>,
    ) -> std::pin::Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move {
            while let Some(event) = rx.recv().await {
                manager.on_event(event).await;
            }
        })
    }

    async fn on_event(self: &Arc<Self>, event: SessionEvent) {
        match event {
            SessionEvent::Qr(code) => {
                self.handle.set_state(SessionState::QrPending).await;
                info!("scan the QR code below to authenticate");
                match render_qr(&code) {
                    Some(art) => println!("{art}"),
                    None => warn!(data = %code, "could not render QR challenge"),
                }
            },
            SessionEvent::Authenticated => {
                // Readiness flips only on Ready; the backend is still syncing
                // chat state here.
                self.handle.set_state(SessionState::Authenticated).await;
                info!("session authenticated");
            },
            SessionEvent::Ready => {
                self.handle.set_state(SessionState::Ready).await;
                self.handle.set_ready(true);
                info!("session ready");
            },
            SessionEvent::AuthFailure(reason) => {
                self.handle.set_ready(false);
                // No auto-retry: stored credentials are likely invalid and a
                // reconnect would loop on the same failure.
                error!(reason = %reason, "authentication failed, manual re-login required");
            },
            SessionEvent::Disconnected(reason) => {
                self.handle.set_ready(false);
                self.handle.set_state(SessionState::Disconnected).await;
                self.handle.record_disconnect(reason.clone()).await;
                warn!(
                    reason = %reason,
                    delay_s = RECONNECT_DELAY.as_secs(),
                    "session disconnected, scheduling reinitialization"
                );
                self.schedule_reconnect().await;
            },
        }
    }

    /// Schedule `initialize()` after the reconnect delay, replacing any
    /// pending attempt.
    async fn schedule_reconnect(self: &Arc<Self>) {
        let mut slot = self.reconnect.lock().await;
        if let Some(prev) = slot.take() {
            prev.abort();
        }
        let manager = Arc::clone(self);
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(RECONNECT_DELAY).await;
            manager.initialize().await;
        }));
    }

    async fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&*self.backend.read().await)
    }

    // ── Operations ───────────────────────────────────────────────────────────

    pub async fn chats(&self) -> Result<Vec<Chat>, SessionError> {
        self.backend().await.chats().await
    }

    /// Chats that are groups.
    pub async fn groups(&self) -> Result<Vec<Chat>, SessionError> {
        Ok(self
            .chats()
            .await?
            .into_iter()
            .filter(|c| c.is_group)
            .collect())
    }

    /// Group detail for a (bare or suffixed) group ID.
    ///
    /// A lookup that resolves to a non-group chat is a client error, not a
    /// silent coercion.
    pub async fn group_info(&self, group_id: &str) -> Result<GroupMetadata, SessionError> {
        let jid = types::normalize_group_jid(group_id);
        let backend = self.backend().await;
        let chat = backend.chat_by_id(&jid).await?;
        if !chat.is_group {
            return Err(SessionError::NotAGroup(jid));
        }
        backend.group_metadata(&jid).await
    }

    /// Broadcast-channel detail for a (bare or suffixed) channel ID.
    pub async fn channel_info(&self, channel_id: &str) -> Result<Chat, SessionError> {
        let jid = types::normalize_broadcast_jid(channel_id);
        self.backend().await.chat_by_id(&jid).await
    }

    /// Send a direct text message. `number` may be bare or already suffixed.
    pub async fn send_text(&self, number: &str, message: &str) -> Result<(), SessionError> {
        let jid = types::normalize_user_jid(number);
        self.backend().await.send_text(&jid, message).await
    }
}

/// Render a QR challenge as terminal block art.
fn render_qr(data: &str) -> Option<String> {
    let code = qrcode::QrCode::new(data.as_bytes()).ok()?;
    Some(
        code.render::<qrcode::render::unicode::Dense1x2>()
            .quiet_zone(true)
            .build(),
    )
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{Mutex as StdMutex, atomic::AtomicUsize},
    };

    use async_trait::async_trait;

    use super::*;

    /// Backend that replays a fixed event script on start and serves canned
    /// chats.
    struct ScriptedBackend {
        script: Vec<SessionEvent>,
        chats: Vec<Chat>,
        sent: Arc<StdMutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl Backend for ScriptedBackend {
        async fn start(
            &self,
            events: mpsc::UnboundedSender<SessionEvent>,
        ) -> Result<(), SessionError> {
            for event in &self.script {
                let _ = events.send(event.clone());
            }
            Ok(())
        }

        async fn chats(&self) -> Result<Vec<Chat>, SessionError> {
            Ok(self.chats.clone())
        }

        async fn chat_by_id(&self, jid: &str) -> Result<Chat, SessionError> {
            self.chats
                .iter()
                .find(|c| c.id == jid)
                .cloned()
                .ok_or_else(|| SessionError::NotFound(jid.to_string()))
        }

        async fn group_metadata(&self, jid: &str) -> Result<GroupMetadata, SessionError> {
            let chat = self.chat_by_id(jid).await?;
            Ok(GroupMetadata {
                id: chat.id,
                name: chat.name,
                ..GroupMetadata::default()
            })
        }

        async fn send_text(&self, to: &str, body: &str) -> Result<(), SessionError> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            Ok(())
        }
    }

    /// Factory handing out one scripted backend per initialization cycle.
    struct ScriptedFactory {
        creations: AtomicUsize,
        scripts: StdMutex<VecDeque<Vec<SessionEvent>>>,
        chats: Vec<Chat>,
        sent: Arc<StdMutex<Vec<(String, String)>>>,
    }

    impl ScriptedFactory {
        fn new(scripts: Vec<Vec<SessionEvent>>) -> Arc<Self> {
            Arc::new(Self {
                creations: AtomicUsize::new(0),
                scripts: StdMutex::new(scripts.into()),
                chats: Vec::new(),
                sent: Arc::new(StdMutex::new(Vec::new())),
            })
        }

        fn with_chats(scripts: Vec<Vec<SessionEvent>>, chats: Vec<Chat>) -> Arc<Self> {
            Arc::new(Self {
                creations: AtomicUsize::new(0),
                scripts: StdMutex::new(scripts.into()),
                chats,
                sent: Arc::new(StdMutex::new(Vec::new())),
            })
        }

        fn creations(&self) -> usize {
            self.creations.load(Ordering::SeqCst)
        }
    }

    impl BackendFactory for ScriptedFactory {
        fn create(&self, _identity: &IdentityStore) -> Result<Arc<dyn Backend>, SessionError> {
            self.creations.fetch_add(1, Ordering::SeqCst);
            let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
            Ok(Arc::new(ScriptedBackend {
                script,
                chats: self.chats.clone(),
                sent: Arc::clone(&self.sent),
            }))
        }
    }

    fn manager_with(factory: Arc<ScriptedFactory>) -> (Arc<SessionManager>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let identity = IdentityStore::new(dir.path().to_path_buf(), "test");
        (SessionManager::new(identity, factory), dir)
    }

    /// Let the event pump drain everything queued so far.
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn ready_only_after_ready_event() {
        let factory = ScriptedFactory::new(vec![vec![
            SessionEvent::Authenticated,
        ]]);
        let (manager, _dir) = manager_with(Arc::clone(&factory));

        assert!(!manager.ready());
        manager.initialize().await;
        settle().await;

        // Authenticated alone must not flip readiness.
        assert!(!manager.ready());
        assert_eq!(manager.state().await, SessionState::Authenticated);
    }

    #[tokio::test]
    async fn full_lifecycle_reaches_ready() {
        let factory = ScriptedFactory::new(vec![vec![
            SessionEvent::Qr("challenge-data".into()),
            SessionEvent::Authenticated,
            SessionEvent::Ready,
        ]]);
        let (manager, _dir) = manager_with(factory);

        manager.initialize().await;
        settle().await;

        assert!(manager.ready());
        assert_eq!(manager.state().await, SessionState::Ready);
    }

    #[tokio::test]
    async fn auth_failure_clears_readiness_without_retry() {
        let factory = ScriptedFactory::new(vec![vec![
            SessionEvent::Ready,
            SessionEvent::AuthFailure("invalid credentials".into()),
        ]]);
        let (manager, _dir) = manager_with(Arc::clone(&factory));

        manager.initialize().await;
        settle().await;

        assert!(!manager.ready());
        assert_eq!(factory.creations(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_reinitializes_after_delay() {
        let factory = ScriptedFactory::new(vec![
            vec![SessionEvent::Ready, SessionEvent::Disconnected("stream lost".into())],
            vec![SessionEvent::Ready],
        ]);
        let (manager, _dir) = manager_with(Arc::clone(&factory));

        manager.initialize().await;
        settle().await;

        assert!(!manager.ready());
        assert_eq!(manager.state().await, SessionState::Disconnected);
        assert_eq!(
            manager.last_disconnect_reason().await.as_deref(),
            Some("stream lost")
        );
        assert_eq!(factory.creations(), 1);

        // The replacement session comes up after the fixed delay.
        tokio::time::sleep(RECONNECT_DELAY + Duration::from_secs(1)).await;
        settle().await;

        assert_eq!(factory.creations(), 2);
        assert!(manager.ready());
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_burst_schedules_exactly_one_reinitialization() {
        let factory = ScriptedFactory::new(vec![
            vec![
                SessionEvent::Disconnected("first".into()),
                SessionEvent::Disconnected("second".into()),
            ],
            vec![],
        ]);
        let (manager, _dir) = manager_with(Arc::clone(&factory));

        manager.initialize().await;
        settle().await;
        assert_eq!(factory.creations(), 1);

        // Well past two delays: a stacked pending attempt would have produced
        // a third creation.
        tokio::time::sleep(RECONNECT_DELAY * 3).await;
        settle().await;

        assert_eq!(factory.creations(), 2);
        assert_eq!(
            manager.last_disconnect_reason().await.as_deref(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn group_info_rejects_non_group_chat() {
        let factory = ScriptedFactory::with_chats(
            vec![vec![SessionEvent::Ready]],
            vec![Chat {
                id: "123@g.us".into(),
                name: "direct".into(),
                is_group: false,
                ..Chat::default()
            }],
        );
        let (manager, _dir) = manager_with(factory);
        manager.initialize().await;
        settle().await;

        let err = manager.group_info("123").await.unwrap_err();
        assert!(matches!(err, SessionError::NotAGroup(_)));
    }

    #[tokio::test]
    async fn group_info_returns_metadata_for_groups() {
        let factory = ScriptedFactory::with_chats(
            vec![vec![SessionEvent::Ready]],
            vec![Chat {
                id: "120363XYZ@g.us".into(),
                name: "ops".into(),
                is_group: true,
                ..Chat::default()
            }],
        );
        let (manager, _dir) = manager_with(factory);
        manager.initialize().await;
        settle().await;

        // Bare and suffixed IDs resolve identically.
        let bare = manager.group_info("120363XYZ").await.unwrap();
        let suffixed = manager.group_info("120363XYZ@g.us").await.unwrap();
        assert_eq!(bare.id, suffixed.id);
        assert_eq!(bare.name, "ops");
    }

    #[tokio::test]
    async fn missing_chat_is_not_found() {
        let factory = ScriptedFactory::with_chats(vec![vec![SessionEvent::Ready]], vec![]);
        let (manager, _dir) = manager_with(factory);
        manager.initialize().await;
        settle().await;

        let err = manager.group_info("nope").await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[tokio::test]
    async fn send_text_normalizes_target() {
        let factory = ScriptedFactory::new(vec![vec![SessionEvent::Ready]]);
        let (manager, _dir) = manager_with(Arc::clone(&factory));
        manager.initialize().await;
        settle().await;

        manager.send_text("6281234", "hello").await.unwrap();
        manager.send_text("6281234@c.us", "again").await.unwrap();

        let sent = factory.sent.lock().unwrap();
        assert_eq!(sent[0].0, "6281234@c.us");
        assert_eq!(sent[1].0, "6281234@c.us");
    }

    #[tokio::test]
    async fn stop_cancels_pending_reconnect() {
        let factory = ScriptedFactory::new(vec![
            vec![SessionEvent::Disconnected("gone".into())],
            vec![],
        ]);
        let (manager, _dir) = manager_with(Arc::clone(&factory));
        manager.initialize().await;
        settle().await;

        manager.stop().await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(factory.creations(), 1);
        assert_eq!(manager.state().await, SessionState::Uninitialized);
    }

    #[test]
    fn qr_renders_to_block_art() {
        let art = render_qr("https://example.com/pair").unwrap();
        assert!(!art.is_empty());
    }
}
