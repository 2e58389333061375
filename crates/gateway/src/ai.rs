//! Generation proxy.
//!
//! Forwards dashboard prompts to an external model server when one is
//! configured. The model server answers `{"reply": "..."}`; everything else
//! about it is opaque.

use {
    axum::{body::Bytes, extract::State},
    reqwest::Client,
    serde::Deserialize,
    serde_json::{Value, json},
    thiserror::Error,
    tracing::{debug, warn},
};

use crate::{
    reply::{ApiError, ApiResult, ok_data},
    state::AppState,
};

/// Generation calls run a full model inference; give them more room than
/// panel calls.
const GENERATE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

const DEFAULT_MAX_TOKENS: u32 = 512;

#[derive(Debug, Error)]
pub enum AiProxyError {
    #[error("model server is not configured")]
    Unconfigured,

    #[error("model server request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model server returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

impl From<AiProxyError> for ApiError {
    fn from(err: AiProxyError) -> Self {
        match err {
            AiProxyError::Unconfigured => ApiError::service_unavailable(err.to_string()),
            AiProxyError::Transport(_) | AiProxyError::Upstream { .. } => {
                ApiError::bad_gateway(err.to_string())
            },
        }
    }
}

#[derive(Clone)]
pub struct AiProxy {
    http: Client,
    url: Option<String>,
}

impl AiProxy {
    pub fn new(url: Option<String>) -> Result<Self, AiProxyError> {
        let http = Client::builder().timeout(GENERATE_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: url.filter(|u| !u.is_empty()),
        })
    }

    pub fn configured(&self) -> bool {
        self.url.is_some()
    }

    /// Forward one generation request and return the model's reply text.
    pub async fn generate(
        &self,
        prompt: &str,
        history: &[Value],
        max_tokens: u32,
    ) -> Result<String, AiProxyError> {
        let url = self.url.as_ref().ok_or(AiProxyError::Unconfigured)?;
        debug!(%url, "generation request");

        let response = self
            .http
            .post(url)
            .json(&json!({
                "prompt": prompt,
                "history": history,
                "max_tokens": max_tokens,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), "generation request failed");
            return Err(AiProxyError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        #[derive(Deserialize)]
        struct ModelReply {
            #[serde(default)]
            reply: String,
        }
        let parsed: ModelReply = response.json().await?;
        Ok(parsed.reply)
    }
}

#[derive(Deserialize)]
struct GenerateRequest {
    prompt: String,
    #[serde(default)]
    history: Vec<Value>,
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

/// POST /api/ai/generate
pub async fn generate(State(state): State<AppState>, body: Bytes) -> ApiResult {
    let request: GenerateRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("invalid request body: {e}")))?;
    if request.prompt.is_empty() {
        return Err(ApiError::bad_request("'prompt' must not be empty"));
    }

    let reply = state
        .ai
        .generate(&request.prompt, &request.history, request.max_tokens)
        .await?;
    Ok(ok_data(json!({ "reply": reply })))
}
