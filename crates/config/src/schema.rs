//! Config schema types (panel, gateway, whatsapp, ai).

use std::path::PathBuf;

use serde::Deserialize;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PerchConfig {
    pub panel: PanelConfig,
    pub gateway: GatewayConfig,
    pub whatsapp: WhatsappConfig,
    pub ai: AiConfig,
}

/// Hosting-panel connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Panel base URL, without the `/api/application` suffix.
    pub base_url: String,

    /// Application API key (`ptla_…`). Env var takes precedence if set.
    pub api_key: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
            api_key: String::new(),
        }
    }
}

/// Dashboard-facing HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

/// Messaging session settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WhatsappConfig {
    /// Identifier for the on-disk identity store, so a restart reuses the
    /// authenticated session instead of demanding a fresh QR scan.
    pub client_id: String,

    /// Identity store directory. Defaults to `<data_dir>/whatsapp`.
    pub data_dir: Option<PathBuf>,
}

impl Default for WhatsappConfig {
    fn default() -> Self {
        Self {
            client_id: "perch".into(),
            data_dir: None,
        }
    }
}

/// Generation-proxy settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Model server endpoint. Empty/unset leaves the proxy unconfigured.
    pub model_server_url: Option<String>,
}

impl PerchConfig {
    /// Apply environment overrides on top of file values.
    ///
    /// File values already went through `${ENV}` substitution; these named
    /// variables win regardless so deployments can skip the file entirely.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("PERCH_PANEL_URL")
            && !url.is_empty()
        {
            self.panel.base_url = url;
        }
        if let Ok(key) = std::env::var("PERCH_PANEL_API_KEY")
            && !key.is_empty()
        {
            self.panel.api_key = key;
        }
        if let Ok(bind) = std::env::var("PERCH_BIND")
            && !bind.is_empty()
        {
            self.gateway.bind = bind;
        }
        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse()
        {
            self.gateway.port = port;
        }
        if let Ok(url) = std::env::var("MODEL_SERVER_URL")
            && !url.is_empty()
        {
            self.ai.model_server_url = Some(url);
        }
        if let Ok(dir) = std::env::var("PERCH_WA_DATA_DIR")
            && !dir.is_empty()
        {
            self.whatsapp.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Resolved identity store directory for the messaging session.
    pub fn whatsapp_data_dir(&self) -> PathBuf {
        self.whatsapp
            .data_dir
            .clone()
            .unwrap_or_else(|| crate::loader::data_dir().join("whatsapp"))
    }
}
