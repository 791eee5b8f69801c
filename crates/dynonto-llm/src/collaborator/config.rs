//! Collaborator configuration, loaded from the environment.

use std::fmt;
use std::str::FromStr;

pub const ENV_PROVIDER: &str = "LLM_PROVIDER";
pub const ENV_API_KEY: &str = "LLM_API_KEY";
pub const ENV_MODEL: &str = "LLM_MODEL";
pub const ENV_BASE_URL: &str = "LLM_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "LLM_TIMEOUT_SECS";

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    OpenAi,
    Anthropic,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4-turbo-preview",
            Provider::Anthropic => "claude-3-5-sonnet-20241022",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com/v1",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(ConfigError::UnsupportedProvider {
                name: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported LLM provider: {name} (expected openai or anthropic)")]
    UnsupportedProvider { name: String },
    #[error("invalid {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("provider {0} was not compiled in (enable the `{0}` feature)")]
    ProviderDisabled(Provider),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Clone, PartialEq, Eq)]
pub struct CollaboratorConfig {
    pub provider: Provider,
    /// `None` (or blank) selects the offline canned-response path.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

// Keep the credential out of logs.
impl fmt::Debug for CollaboratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollaboratorConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self::for_provider(Provider::default())
    }
}

impl CollaboratorConfig {
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            provider,
            api_key: None,
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match get(ENV_PROVIDER) {
            Some(name) => name.parse()?,
            None => Provider::default(),
        };
        let mut config = Self::for_provider(provider);
        config.api_key = get(ENV_API_KEY);
        if let Some(model) = get(ENV_MODEL) {
            config.model = model;
        }
        if let Some(url) = get(ENV_BASE_URL) {
            config.base_url = normalize_base_url(&url);
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            config.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: ENV_TIMEOUT_SECS,
                value: raw,
            })?;
        }
        Ok(config)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = normalize_base_url(url);
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// The credential, if one is configured and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.credential().is_some()
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
