//! Client for the external guidance backend
//!
//! The backend is a black box that takes a field description and answers
//! with advice, a warning, and optionally a clarification question. Every
//! call is a single attempt; failures surface as one generic message.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::chat::{ChatReply, ChatRequest};
use crate::types::FieldQuery;

/// The one message users see for any backend failure
pub const UNAVAILABLE_MESSAGE: &str = "Unable to connect to AI service";

/// Failures talking to the guidance backend
#[derive(Debug, Clone, thiserror::Error)]
pub enum GuidanceError {
    #[error("request to guidance backend failed: {0}")]
    Network(String),
    #[error("guidance backend returned HTTP {0}")]
    Status(u16),
    #[error("guidance backend sent an unreadable response: {0}")]
    Malformed(String),
    #[error("guidance request timed out: {0}")]
    Timeout(String),
    #[error("no guidance backend configured")]
    NotConfigured,
}

impl GuidanceError {
    /// Text shown in the panel
    pub fn user_message(&self) -> &'static str {
        UNAVAILABLE_MESSAGE
    }
}

/// Body of `POST /form-help`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormHelpRequest {
    pub field_label: String,
    pub field_type: String,
    /// Comma-joined option labels, when the field has any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_options: Option<String>,
    pub form_context: String,
}

impl FormHelpRequest {
    pub fn from_query(query: &FieldQuery, form_context: &str) -> Self {
        let joined = query.joined_option_labels();
        Self {
            field_label: query.question.clone(),
            field_type: query.kind.as_str().to_string(),
            field_options: if joined.is_empty() { None } else { Some(joined) },
            form_context: form_context.to_string(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One answer to a clarification question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendation: String,
}

/// Backend answer for one field. Missing or null members fall back to
/// defaults so partial bodies still render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuidanceResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub advice: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub warning: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub needs_interaction: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification_question: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub question_options: Vec<QuestionOption>,
}

impl GuidanceResponse {
    /// Whether the response carries a usable clarification question
    pub fn is_interactive(&self) -> bool {
        self.needs_interaction
            && self
                .clarification_question
                .as_deref()
                .is_some_and(|q| !q.trim().is_empty())
            && !self.question_options.is_empty()
    }
}

/// Anything that can answer guidance and chat requests
#[async_trait]
pub trait GuidanceBackend: Send + Sync {
    async fn form_help(&self, request: &FormHelpRequest) -> Result<GuidanceResponse, GuidanceError>;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, GuidanceError>;
}

/// HTTP implementation of [`GuidanceBackend`]
#[derive(Debug, Clone)]
pub struct GuidanceClient {
    client: reqwest::Client,
    base_url: String,
}

impl GuidanceClient {
    /// `base_url` is the API root, e.g. `https://host/api`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = url::Url::parse(base_url)
            .with_context(|| format!("Invalid guidance endpoint: {}", base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Guidance endpoint must be http or https: {}", base_url);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("formaid/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, GuidanceError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GuidanceError::Timeout(url.clone())
                } else {
                    GuidanceError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Guidance backend returned {} for {}", status, url);
            return Err(GuidanceError::Status(status.as_u16()));
        }

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GuidanceError::Timeout(url.clone())
            } else {
                GuidanceError::Network(e.to_string())
            }
        })?;

        serde_json::from_str(&text).map_err(|e| {
            warn!("Unreadable guidance response from {}: {}", url, e);
            GuidanceError::Malformed(e.to_string())
        })
    }
}

#[async_trait]
impl GuidanceBackend for GuidanceClient {
    async fn form_help(&self, request: &FormHelpRequest) -> Result<GuidanceResponse, GuidanceError> {
        self.post_json("form-help", request).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, GuidanceError> {
        self.post_json("chat", request).await
    }
}

#[cfg(test)]
#[path = "guidance_test.rs"]
mod guidance_test;
