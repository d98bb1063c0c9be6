//! Error types for the safechat pipeline.
//!
//! Completion failures are modelled by [`ApiError`]; the orchestrator turns
//! every one of them into a user-facing [`crate::pipeline::FailureReason`].

use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

/// Name of the environment variable holding the API credential.
pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";

/// The main error type for safechat operations.
#[derive(Debug, Error)]
pub enum SafechatError {
    /// A completion request failed.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// A denylist pattern could not be compiled.
    #[error("Invalid denylist term '{term}': {reason}")]
    InvalidTerm {
        /// The offending term.
        term: String,
        /// Why compilation failed.
        reason: String,
    },
}

/// Errors raised by the completion client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No credential is configured. Fatal and not retryable.
    #[error("{0}")]
    Config(String),

    /// The endpoint answered with a non-success status.
    #[error("API request failed with status {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The response carried no assistant message.
    #[error("API returned an empty response")]
    EmptyResponse,

    /// The request body could not be serialized.
    #[error("Failed to build API request: {0}")]
    Request(String),

    /// A success response whose body was not the expected JSON.
    #[error("Failed to decode API response: {0}")]
    Decode(String),

    /// The request never produced a response (connect, TLS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Creates the missing-credential error with setup instructions.
    #[must_use]
    pub fn missing_credential() -> Self {
        Self::Config(format!(
            "{API_KEY_ENV_VAR} environment variable is not set.\n\
             Set it before running:\n  \
             bash/zsh:    export {API_KEY_ENV_VAR}=\"your-key-here\"\n  \
             PowerShell:  $env:{API_KEY_ENV_VAR}=\"your-key-here\"\n  \
             cmd.exe:     set {API_KEY_ENV_VAR}=your-key-here"
        ))
    }

    /// Creates an HTTP status error.
    #[must_use]
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport(reason.into())
    }

    /// Short machine-readable kind, used in events and logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Http { .. } => "http",
            Self::EmptyResponse => "empty_response",
            Self::Request(_) => "request",
            Self::Decode(_) => "decode",
            Self::Transport(_) => "transport",
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), json!(self.kind()));
        if let Self::Http { status, body } = self {
            map.insert("status".to_string(), json!(status));
            map.insert("body".to_string(), json!(body));
        }
        map.insert("message".to_string(), json!(self.to_string()));
        map
    }
}
