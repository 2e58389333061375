//! Upstream payload types for the panel's application API.
//!
//! The panel wraps everything in `{object, data: [{object, attributes}]}`
//! envelopes; only the attribute fields the dashboard projects are typed,
//! everything else is ignored.

use serde::Deserialize;

/// List envelope: `{"object": "list", "data": [...]}`.
#[derive(Debug, Deserialize)]
pub struct PanelList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<PanelObject<T>>,
}

/// Single-object envelope: `{"object": "...", "attributes": {...}}`.
#[derive(Debug, Deserialize)]
pub struct PanelObject<T> {
    pub attributes: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerAttributes {
    pub id: i64,
    #[serde(default)]
    pub uuid: String,
    pub name: String,
    /// Installing/suspended/restoring marker; null for a plain running server.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub limits: ServerLimits,
    #[serde(default)]
    pub node: i64,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerLimits {
    #[serde(default)]
    pub memory: i64,
    #[serde(default)]
    pub disk: i64,
    #[serde(default)]
    pub cpu: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeAttributes {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub location_id: i64,
    #[serde(default)]
    pub memory: i64,
    #[serde(default)]
    pub disk: i64,
    #[serde(default)]
    pub maintenance_mode: bool,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserAttributes {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub created_at: String,
}
