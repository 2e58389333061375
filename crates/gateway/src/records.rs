//! Normalized record shapes for the dashboard.
//!
//! Each shaper is a total projection from an upstream object to a flat,
//! field-stable record: every field is always present, with a documented
//! default standing in for anything the upstream omitted.

use serde::Serialize;

use {
    perch_panel::{NodeAttributes, ServerAttributes, UserAttributes},
    perch_whatsapp::{Chat, GroupMetadata},
};

/// Stands in for a missing group description.
pub const NO_DESCRIPTION: &str = "No description";
/// Stands in for a chat with no synced last message.
pub const NO_MESSAGES: &str = "No messages";
/// Preview length for the last message body, in characters.
const LAST_MESSAGE_PREVIEW: usize = 50;

// ── Panel records ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ServerRecord {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub status: String,
    pub memory: i64,
    pub disk: i64,
    pub cpu: i64,
    pub node: i64,
    pub suspension_status: String,
    pub created_at: String,
}

pub fn shape_server(server: &ServerAttributes) -> ServerRecord {
    ServerRecord {
        id: server.id,
        uuid: server.uuid.clone(),
        name: server.name.clone(),
        // Null upstream status means no special state (installing, restoring…).
        status: server.status.clone().unwrap_or_else(|| "running".into()),
        memory: server.limits.memory,
        disk: server.limits.disk,
        cpu: server.limits.cpu,
        node: server.node,
        suspension_status: if server.suspended {
            "suspended".into()
        } else {
            "active".into()
        },
        created_at: server.created_at.clone(),
    }
}

#[derive(Debug, Serialize)]
pub struct NodeRecord {
    pub id: i64,
    pub name: String,
    pub location: i64,
    pub memory: i64,
    pub disk: i64,
    pub maintenance: bool,
    pub created_at: String,
}

pub fn shape_node(node: &NodeAttributes) -> NodeRecord {
    NodeRecord {
        id: node.id,
        name: node.name.clone(),
        location: node.location_id,
        memory: node.memory,
        disk: node.disk,
        maintenance: node.maintenance_mode,
        created_at: node.created_at.clone(),
    }
}

#[derive(Debug, Serialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: String,
}

pub fn shape_user(user: &UserAttributes) -> UserRecord {
    UserRecord {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        created_at: user.created_at.clone(),
    }
}

// ── Messaging records ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRecord {
    pub id: String,
    pub name: String,
    pub is_group: bool,
    pub is_read_only: bool,
    pub unread_count: u32,
    pub timestamp: i64,
    pub last_message: String,
}

pub fn shape_chat(chat: &Chat) -> ChatRecord {
    let last_message = match &chat.last_message {
        Some(body) => body.chars().take(LAST_MESSAGE_PREVIEW).collect(),
        None => NO_MESSAGES.to_string(),
    };
    ChatRecord {
        id: chat.id.clone(),
        name: chat.name.clone(),
        is_group: chat.is_group,
        is_read_only: chat.is_read_only,
        unread_count: chat.unread_count,
        timestamp: chat.timestamp,
        last_message,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummaryRecord {
    pub id: String,
    pub name: String,
    pub unread_count: u32,
    pub timestamp: i64,
}

pub fn shape_group_summary(chat: &Chat) -> GroupSummaryRecord {
    GroupSummaryRecord {
        id: chat.id.clone(),
        name: chat.name.clone(),
        unread_count: chat.unread_count,
        timestamp: chat.timestamp,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    pub id: String,
    pub is_admin: bool,
    pub is_super_admin: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub participants: Vec<ParticipantRecord>,
    pub participant_count: usize,
    pub created_at: i64,
    pub is_read_only: bool,
}

pub fn shape_group(group: &GroupMetadata) -> GroupRecord {
    let participants: Vec<ParticipantRecord> = group
        .participants
        .iter()
        .map(|p| ParticipantRecord {
            id: p.id.clone(),
            is_admin: p.is_admin,
            is_super_admin: p.is_super_admin,
        })
        .collect();
    GroupRecord {
        id: group.id.clone(),
        name: group.name.clone(),
        description: group
            .description
            .clone()
            .unwrap_or_else(|| NO_DESCRIPTION.into()),
        participant_count: participants.len(),
        participants,
        created_at: group.created_at.unwrap_or(0),
        is_read_only: group.is_read_only,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    pub id: String,
    pub name: String,
    pub is_read_only: bool,
    pub timestamp: i64,
}

pub fn shape_channel(chat: &Chat) -> ChannelRecord {
    ChannelRecord {
        id: chat.id.clone(),
        name: chat.name.clone(),
        is_read_only: chat.is_read_only,
        timestamp: chat.timestamp,
    }
}

#[cfg(test)]
mod tests {
    use {perch_panel::types::ServerLimits, perch_whatsapp::Participant};

    use super::*;

    #[test]
    fn node_record_matches_dashboard_shape() {
        let node = NodeAttributes {
            id: 1,
            name: "n1".into(),
            location_id: 2,
            memory: 8192,
            disk: 50000,
            maintenance_mode: false,
            created_at: "2024-01-01".into(),
        };
        let shaped = serde_json::to_value(shape_node(&node)).unwrap();
        assert_eq!(
            shaped,
            serde_json::json!({
                "id": 1, "name": "n1", "location": 2, "memory": 8192,
                "disk": 50000, "maintenance": false, "created_at": "2024-01-01"
            })
        );
    }

    #[test]
    fn server_defaults_fill_absent_fields() {
        let server = ServerAttributes {
            id: 4,
            uuid: String::new(),
            name: "lobby".into(),
            status: None,
            suspended: true,
            limits: ServerLimits {
                memory: 1024,
                disk: 5000,
                cpu: 100,
            },
            node: 2,
            created_at: String::new(),
        };
        let record = shape_server(&server);
        assert_eq!(record.status, "running");
        assert_eq!(record.suspension_status, "suspended");
        // Field-stable: absent upstream values still serialize.
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["uuid"], "");
        assert_eq!(value["created_at"], "");
    }

    #[test]
    fn chat_without_last_message_gets_placeholder() {
        let chat = Chat {
            id: "1@c.us".into(),
            name: "alice".into(),
            ..Chat::default()
        };
        let record = shape_chat(&chat);
        assert_eq!(record.last_message, NO_MESSAGES);
    }

    #[test]
    fn long_last_message_is_previewed() {
        let body = "x".repeat(120);
        let chat = Chat {
            id: "1@c.us".into(),
            last_message: Some(body),
            ..Chat::default()
        };
        let record = shape_chat(&chat);
        assert_eq!(record.last_message.chars().count(), 50);
    }

    #[test]
    fn multibyte_last_message_truncates_on_char_boundary() {
        let body = "héllo wörld ".repeat(10);
        let chat = Chat {
            id: "1@c.us".into(),
            last_message: Some(body),
            ..Chat::default()
        };
        // Must not panic or split a code point.
        let record = shape_chat(&chat);
        assert_eq!(record.last_message.chars().count(), 50);
    }

    #[test]
    fn chat_record_uses_camel_case() {
        let chat = Chat {
            id: "1@c.us".into(),
            unread_count: 3,
            ..Chat::default()
        };
        let value = serde_json::to_value(shape_chat(&chat)).unwrap();
        assert!(value.get("unreadCount").is_some());
        assert!(value.get("isGroup").is_some());
        assert!(value.get("unread_count").is_none());
    }

    #[test]
    fn group_without_description_gets_placeholder() {
        let group = GroupMetadata {
            id: "120363@g.us".into(),
            name: "ops".into(),
            participants: vec![
                Participant {
                    id: "1@c.us".into(),
                    is_admin: true,
                    is_super_admin: false,
                },
                Participant {
                    id: "2@c.us".into(),
                    is_admin: false,
                    is_super_admin: false,
                },
            ],
            ..GroupMetadata::default()
        };
        let record = shape_group(&group);
        assert_eq!(record.description, NO_DESCRIPTION);
        assert_eq!(record.participant_count, 2);
        assert_eq!(record.created_at, 0);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["participants"][0]["isAdmin"], true);
        assert_eq!(value["participantCount"], 2);
    }
}
