//! Configuration for the agent playground.
//!
//! Read once at startup from environment variables (a `.env` file is loaded
//! into the environment first):
//! - `LLM_PROVIDER` - `openai`, `anthropic`, anything else uses the echo backend.
//! - `OPENAI_API_KEY` - Optional. Sent as a bearer token when set.
//! - `OPENAI_BASE_URL` - Defaults to `https://api.openai.com/v1`.
//! - `OPENAI_MODEL` - Defaults to `gpt-4o-mini`.
//! - `ANTHROPIC_API_KEY` - Sent in the `x-api-key` header.
//! - `ANTHROPIC_BASE_URL` - Defaults to `https://api.anthropic.com/v1`.
//! - `ANTHROPIC_MODEL` - Defaults to `claude-3-5-sonnet-latest`.
//! - `DOCS_DIR` - Optional directory of `.txt`/`.md` files to index.
//! - `TOP_K` - Documents retrieved per turn. Defaults to `2`.
//! - `CHUNK_CHARS` - Maximum chunk length when indexing files. Defaults to `800`.
//!
//! Empty values are treated as unset.

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Echo,
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// Unknown names fall back to the echo backend.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Self::OpenAi,
            "anthropic" => Self::Anthropic,
            _ => Self::Echo,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Echo => "echo",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderKind,
    pub openai: OpenAiConfig,
    pub anthropic: AnthropicConfig,

    /// Corpus directory; the built-in documents are used when unset
    pub docs_dir: Option<PathBuf>,

    pub top_k: usize,
    pub chunk_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Echo,
            openai: OpenAiConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
            },
            anthropic: AnthropicConfig {
                api_key: None,
                base_url: "https://api.anthropic.com/v1".to_string(),
                model: "claude-3-5-sonnet-latest".to_string(),
            },
            docs_dir: None,
            top_k: 2,
            chunk_chars: 800,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let provider = get("LLM_PROVIDER")
            .map(|name| ProviderKind::from_name(&name))
            .unwrap_or(defaults.provider);

        let openai = OpenAiConfig {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.openai.base_url),
            model: get("OPENAI_MODEL").unwrap_or(defaults.openai.model),
        };

        let anthropic = AnthropicConfig {
            api_key: get("ANTHROPIC_API_KEY"),
            base_url: get("ANTHROPIC_BASE_URL").unwrap_or(defaults.anthropic.base_url),
            model: get("ANTHROPIC_MODEL").unwrap_or(defaults.anthropic.model),
        };

        let top_k = get("TOP_K")
            .map(|v| parse_number("TOP_K", &v))
            .transpose()?
            .unwrap_or(defaults.top_k);

        let chunk_chars = get("CHUNK_CHARS")
            .map(|v| parse_number("CHUNK_CHARS", &v))
            .transpose()?
            .unwrap_or(defaults.chunk_chars);

        Ok(Self {
            provider,
            openai,
            anthropic,
            docs_dir: get("DOCS_DIR").map(PathBuf::from),
            top_k,
            chunk_chars,
        })
    }

    /// The model name the selected provider will be called with.
    pub fn model(&self) -> &str {
        match self.provider {
            ProviderKind::Echo => "echo",
            ProviderKind::OpenAi => &self.openai.model,
            ProviderKind::Anthropic => &self.anthropic.model,
        }
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.provider, ProviderKind::Echo);
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.anthropic.model, "claude-3-5-sonnet-latest");
        assert!(config.openai.api_key.is_none());
        assert!(config.docs_dir.is_none());
        assert_eq!(config.top_k, 2);
        assert_eq!(config.chunk_chars, 800);
        assert_eq!(config.model(), "echo");
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(ProviderKind::from_name("openai"), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::from_name(" Anthropic "), ProviderKind::Anthropic);
        assert_eq!(ProviderKind::from_name("ollama"), ProviderKind::Echo);
        assert_eq!(ProviderKind::from_name(""), ProviderKind::Echo);
    }

    #[test]
    fn test_reads_provider_settings() {
        let config = config_from(&[
            ("LLM_PROVIDER", "anthropic"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("ANTHROPIC_MODEL", "claude-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ("DOCS_DIR", "/srv/docs"),
            ("TOP_K", "4"),
        ])
        .unwrap();

        assert_eq!(config.provider, ProviderKind::Anthropic);
        assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-ant"));
        assert_eq!(config.model(), "claude-test");
        assert_eq!(config.openai.base_url, "http://localhost:8080/v1");
        assert_eq!(config.docs_dir, Some(PathBuf::from("/srv/docs")));
        assert_eq!(config.top_k, 4);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = config_from(&[("OPENAI_API_KEY", ""), ("OPENAI_MODEL", "  ")]).unwrap();
        assert!(config.openai.api_key.is_none());
        assert_eq!(config.openai.model, "gpt-4o-mini");
    }

    #[test]
    fn test_invalid_number() {
        let err = config_from(&[("TOP_K", "two")]).unwrap_err();
        assert!(err.to_string().starts_with("Invalid value for TOP_K"));
    }
}
