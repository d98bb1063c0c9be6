//! Configuration for the completion client.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

use crate::errors::API_KEY_ENV_VAR;

/// Default completions endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Persona sent as the system message on every request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a safe, friendly and helpful assistant. \
    Answer clearly and concisely, and decline requests that could cause harm.";

/// Static settings for building and sending completion requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Completions endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// System prompt establishing the assistant persona.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Upper bound on generated tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Value of the `HTTP-Referer` header.
    #[serde(default = "default_referer")]
    pub referer: String,
    /// Value of the `X-Title` header.
    #[serde(default = "default_app_title")]
    pub app_title: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout() -> f64 {
    60.0
}

fn default_referer() -> String {
    "https://github.com/safechat/safechat-rust".to_string()
}

fn default_app_title() -> String {
    "SafeChat".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            system_prompt: default_system_prompt(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
            referer: default_referer(),
            app_title: default_app_title(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Gets timeout as Duration.
    ///
    /// Values that are not positive, not finite, or too large for a
    /// `Duration` fall back to the default.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        let fallback = Duration::from_secs_f64(default_timeout());
        if self.timeout_seconds <= 0.0 {
            warn!(timeout_seconds = self.timeout_seconds, "Non-positive timeout, using default");
            return fallback;
        }
        Duration::try_from_secs_f64(self.timeout_seconds).unwrap_or_else(|_| {
            warn!(timeout_seconds = self.timeout_seconds, "Timeout out of range, using default");
            fallback
        })
    }
}

/// An API key. Its `Debug` output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Reads the key from the process environment.
    ///
    /// Returns `None` when the variable is unset or blank.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the key through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        lookup(API_KEY_ENV_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self)
    }

    /// The raw key.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.max_tokens, 500);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"model": "test/model", "timeout_seconds": 5}"#).unwrap();

        assert_eq!(config.model, "test/model");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.app_title, "SafeChat");
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new()
            .with_endpoint("http://localhost:1234/v1/chat/completions")
            .with_model("local")
            .with_timeout(2.5);

        assert_eq!(config.model, "local");
        assert_eq!(config.timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn test_out_of_range_timeouts_fall_back_to_default() {
        let default = ClientConfig::default().timeout();

        let huge: ClientConfig = serde_json::from_str(r#"{"timeout_seconds": 1e30}"#).unwrap();
        assert_eq!(huge.timeout(), default);

        for seconds in [0.0, -3.0, f64::INFINITY, f64::NAN] {
            assert_eq!(ClientConfig::new().with_timeout(seconds).timeout(), default);
        }
    }

    #[test]
    fn test_credential_lookup() {
        let found = Credential::from_lookup(|name| {
            assert_eq!(name, API_KEY_ENV_VAR);
            Some("  sk-test  ".to_string())
        });
        assert_eq!(found.unwrap().expose(), "sk-test");

        assert!(Credential::from_lookup(|_| None).is_none());
        assert!(Credential::from_lookup(|_| Some("   ".to_string())).is_none());
    }

    #[test]
    fn test_credential_debug_hides_secret() {
        let credential = Credential::new("sk-secret");
        assert_eq!(format!("{credential:?}"), "Credential(***)");
    }
}
