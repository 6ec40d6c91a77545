use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Capability providers a chat can route outbound calls to.
///
/// The set is closed on purpose: request payloads carry provider names as
/// strings, and anything outside this set is a validation error at the
/// boundary, never a half-supported passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Self-hosted model runtime. Never requires a credential.
    Ollama,
    /// Hosted xAI API.
    Xai,
    /// Hosted OpenRouter gateway.
    OpenRouter,
}

impl Provider {
    pub const ALL: &[Provider] = &[Provider::Ollama, Provider::Xai, Provider::OpenRouter];

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::Xai => "xai",
            Provider::OpenRouter => "openrouter",
        }
    }

    /// Parse a provider name from a request payload. Case-insensitive,
    /// whitespace-tolerant; `None` for anything outside the supported set.
    pub fn parse(value: &str) -> Option<Provider> {
        match value.trim().to_lowercase().as_str() {
            "ollama" => Some(Provider::Ollama),
            "xai" => Some(Provider::Xai),
            "openrouter" => Some(Provider::OpenRouter),
            _ => None,
        }
    }

    /// Whether outbound calls to this provider need an API key at all.
    /// The self-hosted runtime is always exempt.
    pub fn requires_credential(self) -> bool {
        !matches!(self, Provider::Ollama)
    }

    /// Environment variable holding the process-wide fallback key, if the
    /// provider takes one.
    pub fn default_key_env(self) -> Option<&'static str> {
        match self {
            Provider::Ollama => None,
            Provider::Xai => Some("XAI_API_KEY"),
            Provider::OpenRouter => Some("OPENROUTER_API_KEY"),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
