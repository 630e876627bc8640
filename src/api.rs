//! Storyscript Cloud API client

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::config::Settings;
use crate::output::PebbleError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("You are not logged in. Set STORY_ACCESS_TOKEN in your environment or .env file.")]
    NotLoggedIn,

    #[error("Request to Storyscript Cloud timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("Failed to connect to Storyscript Cloud: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    #[error("Failed to parse Storyscript Cloud response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("STORY_API_URL '{url}' is not a usable base URL: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("'{0}' is not a valid name")]
    InvalidName(String),
}

impl ApiError {
    fn from_send(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout(e)
        } else {
            ApiError::Transport(e)
        }
    }

    /// Pebble error for reporting a failed `op`
    pub fn to_pebble(&self, op: &str) -> PebbleError {
        let message = self.to_string();
        let err = match self {
            ApiError::NotLoggedIn => PebbleError::auth("NOT_LOGGED_IN", &message),
            ApiError::Timeout(_) => PebbleError::timeout("API_TIMEOUT", &message, 5),
            ApiError::Transport(_) => PebbleError::net("API_UNREACHABLE", &message),
            ApiError::Status { status: 401 | 403, .. } => PebbleError::auth("API_UNAUTHORIZED", &message),
            ApiError::Status { status: 404, .. } => PebbleError::ext("API_NOT_FOUND", &message),
            ApiError::Status { .. } => PebbleError::ext("API_ERROR", &message),
            ApiError::Decode(_) => PebbleError::ext("API_BAD_RESPONSE", &message),
            ApiError::InvalidBaseUrl { .. } => PebbleError::input("BAD_CONFIG", &message),
            ApiError::InvalidName(_) => PebbleError::input("INVALID_NAME", &message),
        };
        err.with_op(op)
    }
}

// ============ API Types ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub name: String,
    #[serde(default)]
    pub maintenance: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub name: String,
}

/// Named JSON configs the platform stores on the user's behalf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Registry,
    Container,
}

impl ConfigKind {
    fn path(&self) -> &'static str {
        match self {
            ConfigKind::Registry => "registry_configs",
            ConfigKind::Container => "container_configs",
        }
    }

    /// Human label, e.g. "registry config"
    pub fn label(&self) -> &'static str {
        match self {
            ConfigKind::Registry => "registry config",
            ConfigKind::Container => "container config",
        }
    }
}

// ============ Client ============

pub struct ApiClient {
    client: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("story-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Transport)?;

        let invalid = |reason: String| ApiError::InvalidBaseUrl {
            url: settings.api_url.clone(),
            reason,
        };
        let base_url = Url::parse(&settings.api_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("it cannot carry a path".to_string()));
        }

        Ok(Self {
            client,
            base_url,
            access_token: settings.access_token.clone(),
        })
    }

    /// Base URL with `segments` appended. Each segment is percent-encoded as a
    /// whole, so a name can never reach outside its collection.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        if let Some(bad) = segments.iter().copied().find(|s| matches!(*s, "" | "." | "..")) {
            return Err(ApiError::InvalidName(bad.to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "it cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let token = self.access_token.as_deref().ok_or(ApiError::NotLoggedIn)?;
        let url = self.endpoint(segments)?;
        Ok(self
            .client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json"))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let resp = builder.send().await.map_err(ApiError::from_send)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    async fn send_json<T: for<'de> Deserialize<'de>>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        self.send(builder).await?.json().await.map_err(ApiError::Decode)
    }

    // ============ Apps ============

    pub async fn list_apps(&self) -> Result<Vec<App>, ApiError> {
        self.send_json(self.request(Method::GET, &["apps"])?).await
    }

    pub async fn create_app(&self, name: &str, team: Option<&str>) -> Result<(), ApiError> {
        let body = json!({"name": name, "team": team});
        self.send(self.request(Method::POST, &["apps"])?.json(&body)).await?;
        Ok(())
    }

    pub async fn destroy_app(&self, name: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &["apps", name])?).await?;
        Ok(())
    }

    // ============ Registry / container configs ============

    pub async fn list_configs(&self, kind: ConfigKind) -> Result<Vec<ConfigSummary>, ApiError> {
        self.send_json(self.request(Method::GET, &[kind.path()])?).await
    }

    pub async fn get_config(&self, kind: ConfigKind, name: &str) -> Result<Value, ApiError> {
        self.send_json(self.request(Method::GET, &[kind.path(), name])?).await
    }

    pub async fn create_config(
        &self,
        kind: ConfigKind,
        name: &str,
        config: &Value,
        team: Option<&str>,
    ) -> Result<(), ApiError> {
        let body = json!({"name": name, "config": config, "team": team});
        self.send(self.request(Method::POST, &[kind.path()])?.json(&body)).await?;
        Ok(())
    }

    pub async fn update_config(&self, kind: ConfigKind, name: &str, config: &Value) -> Result<(), ApiError> {
        let body = json!({"config": config});
        self.send(self.request(Method::PUT, &[kind.path(), name])?.json(&body)).await?;
        Ok(())
    }

    pub async fn delete_config(&self, kind: ConfigKind, name: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &[kind.path(), name])?).await?;
        Ok(())
    }
}

/// Pull a readable message out of an error body
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 200 {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}
