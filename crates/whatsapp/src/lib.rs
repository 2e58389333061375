//! Messaging session lifecycle.
//!
//! One long-lived WhatsApp session per process. The [`session::SessionManager`]
//! consumes lifecycle events from the backend on a single pump task, exposes
//! readiness through a cloneable [`session::SessionHandle`], and recreates the
//! backend wholesale after a disconnect. The old connection object is
//! discarded, never repaired.
//!
//! The concrete wire driver is behind the [`backend::Backend`] trait; this
//! crate treats it as an opaque collaborator that emits events and answers
//! async calls.

pub mod backend;
pub mod session;
pub mod types;

pub use {
    backend::{Backend, BackendFactory, IdentityStore, NoopBackend, NoopBackendFactory},
    session::{SessionError, SessionEvent, SessionHandle, SessionManager, SessionState},
    types::{Chat, GroupMetadata, Participant},
};
