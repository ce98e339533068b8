use convotree::ResponderError;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Which responder implementation answers requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponderKind {
    #[default]
    Mock,
    Backend,
    OpenAi,
}

impl ResponderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponderKind::Mock => "mock",
            ResponderKind::Backend => "backend",
            ResponderKind::OpenAi => "openai",
        }
    }
}

impl fmt::Display for ResponderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponderKind {
    type Err = ResponderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(ResponderKind::Mock),
            "backend" => Ok(ResponderKind::Backend),
            "openai" => Ok(ResponderKind::OpenAi),
            other => Err(ResponderError::UnknownMode(other.to_string())),
        }
    }
}

/// Everything needed to build a responder.
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    pub kind: ResponderKind,
    /// Base URL of a chat backend; requests go to `<base>/chat`.
    pub backend_url: String,
    /// Full URL of an OpenAI-compatible chat completions endpoint.
    pub openai_url: String,
    pub model: String,
    /// Overrides the `<MODE>_API_KEY` environment variable.
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// Makes the mock responder deterministic.
    pub seed: Option<u64>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            kind: ResponderKind::default(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            openai_url: DEFAULT_OPENAI_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            seed: None,
        }
    }
}

impl ResponderConfig {
    pub fn with_kind(mut self, kind: ResponderKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    pub fn with_openai_url(mut self, url: impl Into<String>) -> Self {
        self.openai_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The explicit key if set, otherwise `<KIND>_API_KEY` from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| api_key_from_env(self.kind.as_str()))
    }
}

/// Name of the environment variable holding the key for `mode`.
pub fn api_key_var(mode: &str) -> String {
    format!("{}_API_KEY", mode.to_ascii_uppercase())
}

/// Read `<MODE>_API_KEY`, treating an empty value as unset.
pub fn api_key_from_env(mode: &str) -> Option<String> {
    env::var(api_key_var(mode))
        .ok()
        .filter(|key| !key.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResponderConfig::default();
        assert_eq!(config.kind, ResponderKind::Mock);
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builder() {
        let config = ResponderConfig::default()
            .with_kind(ResponderKind::OpenAi)
            .with_model("gpt-4o-mini")
            .with_api_key("sk-test")
            .with_timeout(Duration::from_secs(5))
            .with_seed(3);
        assert_eq!(config.kind, ResponderKind::OpenAi);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-test"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("mock".parse::<ResponderKind>().unwrap(), ResponderKind::Mock);
        assert_eq!(" OpenAI ".parse::<ResponderKind>().unwrap(), ResponderKind::OpenAi);
        assert_eq!("backend".parse::<ResponderKind>().unwrap(), ResponderKind::Backend);
        let err = "anthropic".parse::<ResponderKind>().unwrap_err();
        assert!(matches!(err, ResponderError::UnknownMode(ref m) if m == "anthropic"));
    }

    #[test]
    fn test_kind_display_roundtrip() {
        for kind in [ResponderKind::Mock, ResponderKind::Backend, ResponderKind::OpenAi] {
            assert_eq!(kind.to_string().parse::<ResponderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_api_key_var() {
        assert_eq!(api_key_var("openai"), "OPENAI_API_KEY");
        assert_eq!(api_key_var("backend"), "BACKEND_API_KEY");
    }
}
