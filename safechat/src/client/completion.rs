//! Chat completion requests over an [`HttpTransport`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use crate::config::{ClientConfig, Credential};
use crate::errors::ApiError;

/// Role of a chat message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Persona/instructions.
    System,
    /// The person typing.
    User,
    /// The model.
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body for the completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// System prompt followed by the user's message.
    pub messages: Vec<ChatMessage>,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl ChatRequest {
    /// Builds the request for `user_message` from `config`.
    #[must_use]
    pub fn from_config(config: &ClientConfig, user_message: &str) -> Self {
        Self {
            model: config.model.clone(),
            messages: vec![
                ChatMessage::system(config.system_prompt.clone()),
                ChatMessage::user(user_message),
            ],
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Token accounting reported by the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    /// Prompt tokens.
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Generated tokens.
    #[serde(default)]
    pub completion_tokens: u32,
    /// Sum of both.
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

/// Response body from the completions endpoint. Only the fields read here
/// are modelled; everything else is ignored.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    /// Model that actually served the request.
    #[serde(default)]
    pub model: Option<String>,
    /// Token usage, when reported.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Content of the first choice's message, if any.
    #[must_use]
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
    }
}

/// Something that turns a user message into an assistant reply.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Requests a completion for `user_message`.
    async fn complete(&self, user_message: &str) -> Result<String, ApiError>;
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct CompletionClient {
    config: ClientConfig,
    credential: Option<Credential>,
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("config", &self.config)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

impl CompletionClient {
    /// Creates a client over an explicit transport.
    #[must_use]
    pub fn new(
        config: ClientConfig,
        credential: Option<Credential>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            config,
            credential,
            transport,
        }
    }

    /// Creates a client using [`ReqwestTransport`] with the configured timeout.
    pub fn with_reqwest(
        config: ClientConfig,
        credential: Option<Credential>,
    ) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::new(config, credential, Arc::new(transport)))
    }

    /// Whether a credential is present.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Builds the HTTP request for `user_message`.
    pub fn build_request(&self, user_message: &str) -> Result<HttpRequest, ApiError> {
        let credential = self
            .credential
            .as_ref()
            .ok_or_else(ApiError::missing_credential)?;

        let body = serde_json::to_value(ChatRequest::from_config(&self.config, user_message))
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(HttpRequest {
            url: self.config.endpoint.clone(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                (
                    "Authorization".to_string(),
                    format!("Bearer {}", credential.expose()),
                ),
                ("HTTP-Referer".to_string(), self.config.referer.clone()),
                ("X-Title".to_string(), self.config.app_title.clone()),
            ],
            body,
        })
    }
}

/// Extracts the trimmed assistant message from a success body.
pub fn parse_completion(body: &str) -> Result<String, ApiError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;

    if let Some(usage) = &response.usage {
        debug!(
            model = response.model.as_deref().unwrap_or("unknown"),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "Completion usage"
        );
    }

    match response.first_content().map(str::trim) {
        Some(content) if !content.is_empty() => Ok(content.to_string()),
        _ => Err(ApiError::EmptyResponse),
    }
}

#[async_trait]
impl Completer for CompletionClient {
    async fn complete(&self, user_message: &str) -> Result<String, ApiError> {
        let request = self.build_request(user_message)?;

        info!(
            model = %self.config.model,
            endpoint = %self.config.endpoint,
            "Sending completion request"
        );
        let response = self.transport.post_json(request).await?;

        if !response.is_success() {
            warn!(status = response.status, "Completion request failed");
            return Err(ApiError::http(response.status, response.body));
        }

        parse_completion(&response.body)
    }
}
