use {
    reqwest::{Client, Method, StatusCode},
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    serde_json::Value,
    thiserror::Error,
    tracing::{debug, warn},
};

use crate::types::{NodeAttributes, PanelList, ServerAttributes, UserAttributes};

/// Fixed per-request timeout. The panel is the slow dependency here; anything
/// past this window is reported as a transport failure, not awaited forever.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Versioned media type required by the panel's application API.
const PANEL_ACCEPT: &str = "Application/vnd.pterodactyl.v1+json";

/// Failure half of every panel call.
#[derive(Debug, Error)]
pub enum PanelError {
    /// Network-level failure: refused connection, DNS, timeout.
    #[error("panel request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The panel answered with a non-2xx status.
    #[error("panel returned {status}: {detail}")]
    Upstream { status: u16, detail: String },

    /// 2xx response whose body did not match the expected envelope.
    #[error("unexpected panel payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Stateless executor for panel application-API calls.
#[derive(Clone)]
pub struct PanelClient {
    http: Client,
    base_url: String,
    api_key: Secret<String>,
}

impl std::fmt::Debug for PanelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl PanelClient {
    /// Create a client for the panel at `base_url` (without the
    /// `/api/application` suffix).
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, PanelError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: Secret::new(api_key.to_string()),
        })
    }

    /// Execute a panel call and normalize the outcome.
    ///
    /// `endpoint` is a path relative to `/api/application/` unless it is
    /// already an absolute URL. Any non-2xx response or network fault comes
    /// back as [`PanelError`]; no raw reqwest error escapes mid-handler.
    pub async fn call(&self, endpoint: &str, method: Method) -> Result<Value, PanelError> {
        let url = self.endpoint_url(endpoint);
        debug!(%url, %method, "panel request");

        let response = self
            .http
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .header("Content-Type", "application/json")
            .header("Accept", PANEL_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(status, &body);
            warn!(%url, status = status.as_u16(), error = %detail, "panel request failed");
            return Err(PanelError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response.json().await?)
    }

    /// GET convenience wrapper.
    pub async fn get(&self, endpoint: &str) -> Result<Value, PanelError> {
        self.call(endpoint, Method::GET).await
    }

    /// Connectivity probe: one cheap list call, discarding the payload.
    pub async fn probe(&self) -> Result<(), PanelError> {
        self.get("servers").await.map(|_| ())
    }

    pub async fn list_servers(&self) -> Result<Vec<ServerAttributes>, PanelError> {
        let value = self.get("servers").await?;
        let list: PanelList<ServerAttributes> = serde_json::from_value(value)?;
        Ok(list.data.into_iter().map(|o| o.attributes).collect())
    }

    pub async fn list_nodes(&self) -> Result<Vec<NodeAttributes>, PanelError> {
        let value = self.get("nodes").await?;
        let list: PanelList<NodeAttributes> = serde_json::from_value(value)?;
        Ok(list.data.into_iter().map(|o| o.attributes).collect())
    }

    pub async fn list_users(&self) -> Result<Vec<UserAttributes>, PanelError> {
        let value = self.get("users").await?;
        let list: PanelList<UserAttributes> = serde_json::from_value(value)?;
        Ok(list.data.into_iter().map(|o| o.attributes).collect())
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!("{}/api/application/{}", self.base_url, endpoint)
    }
}

/// Pick the most specific error message available from a failure response.
///
/// The panel reports errors as `{"errors": [{"code", "status", "detail"}]}`;
/// the first detail wins. Anything unparseable falls back to the status line
/// plus whatever body text came back.
fn error_detail(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        errors: Vec<ErrorEntry>,
    }
    #[derive(Deserialize)]
    struct ErrorEntry {
        #[serde(default)]
        detail: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(entry) = parsed.errors.first()
        && !entry.detail.is_empty()
    {
        return entry.detail.clone();
    }

    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    }
}
