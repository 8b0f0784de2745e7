//! Generative Language API client.

use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{GenerationRequest, TextGenerator};
use crate::error::InterpretError;
use crate::storage::{keyring_store, InterpretConfig};

/// Keyring entry holding the API key.
pub const API_KEY_ENTRY: &str = "gemini_api_key";
/// Environment variable checked before the keyring.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// API key from `GEMINI_API_KEY`, then the OS keyring.
pub fn resolve_api_key() -> Option<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            return Some(key.trim().to_string());
        }
    }
    match keyring_store::get(API_KEY_ENTRY) {
        Ok(key) => key.filter(|k| !k.is_empty()),
        Err(e) => {
            debug!(error = %e, "keyring unavailable");
            None
        }
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, config: &InterpretConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        }
    }

    /// Client built from the resolved API key, if one is configured.
    pub fn from_env(config: &InterpretConfig) -> Option<Self> {
        resolve_api_key().map(|key| Self::new(key, config))
    }

    fn url(&self) -> Result<Url, InterpretError> {
        let mut url = Url::parse(&format!(
            "{}/models/{}:generateContent",
            self.endpoint, self.model
        ))
        .map_err(|e| InterpretError::Upstream(format!("invalid endpoint: {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    fn body(request: &GenerationRequest) -> Value {
        let mut generation_config = json!({
            "temperature": request.temperature,
            "maxOutputTokens": request.max_output_tokens,
        });
        if request.json_mode {
            generation_config["responseMimeType"] = json!("application/json");
        }
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
            "generationConfig": generation_config,
        })
    }

    async fn send(&self, request: &GenerationRequest) -> Result<String, InterpretError> {
        let resp = self
            .client
            .post(self.url()?)
            .json(&Self::body(request))
            .send()
            .await?;

        let status = resp.status();
        let payload: Value = resp.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            let message = payload["error"]["message"]
                .as_str()
                .unwrap_or("no error message");
            return Err(InterpretError::Upstream(format!("HTTP {status}: {message}")));
        }

        candidate_text(&payload)
            .ok_or_else(|| InterpretError::Upstream("response contained no candidates".into()))
    }
}

/// Concatenated text parts of the first candidate.
fn candidate_text(payload: &Value) -> Option<String> {
    let parts = payload["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, InterpretError> {
        debug!(model = %self.model, json_mode = request.json_mode, "generate request");
        let secs = self.timeout.as_secs();
        tokio::time::timeout(self.timeout, self.send(request))
            .await
            .map_err(|_| InterpretError::Timeout { secs })?
    }
}
