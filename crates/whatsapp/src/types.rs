//! Upstream chat/group shapes and JID normalization.

/// Domain suffix for group chats.
pub const GROUP_SUFFIX: &str = "@g.us";
/// Domain suffix for direct contacts.
pub const USER_SUFFIX: &str = "@c.us";
/// Domain suffix for broadcast channels.
pub const BROADCAST_SUFFIX: &str = "@status.broadcast";

/// A chat as the backend reports it.
#[derive(Debug, Clone, Default)]
pub struct Chat {
    /// Serialized JID, e.g. `6281234567890@c.us` or `120363xyz@g.us`.
    pub id: String,
    pub name: String,
    pub is_group: bool,
    pub is_read_only: bool,
    pub unread_count: u32,
    /// Unix seconds of the last activity.
    pub timestamp: i64,
    /// Body of the most recent message, when the backend has one synced.
    pub last_message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Participant {
    pub id: String,
    pub is_admin: bool,
    pub is_super_admin: bool,
}

/// Group detail as the backend reports it.
#[derive(Debug, Clone, Default)]
pub struct GroupMetadata {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub participants: Vec<Participant>,
    /// Unix seconds of group creation.
    pub created_at: Option<i64>,
    pub is_read_only: bool,
}

/// Suffix a bare group ID with `@g.us`. Idempotent.
pub fn normalize_group_jid(id: &str) -> String {
    with_suffix(id, GROUP_SUFFIX)
}

/// Suffix a bare phone number with `@c.us`. Idempotent.
pub fn normalize_user_jid(id: &str) -> String {
    with_suffix(id, USER_SUFFIX)
}

/// Suffix a bare channel ID with `@status.broadcast`. Idempotent.
pub fn normalize_broadcast_jid(id: &str) -> String {
    with_suffix(id, BROADCAST_SUFFIX)
}

fn with_suffix(id: &str, suffix: &str) -> String {
    if id.ends_with(suffix) {
        id.to_string()
    } else {
        format!("{id}{suffix}")
    }
}
