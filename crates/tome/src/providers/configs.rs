use anyhow::{anyhow, Result};
use std::env;

pub const DEFAULT_HOST: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Configuration for the Anthropic messages backend, built once at startup
/// and handed to whichever component needs it.
#[derive(Debug, Clone)]
pub struct AnthropicProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl AnthropicProviderConfig {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_tokens: 1000,
        }
    }

    /// Read the configuration from the environment. The API key is required,
    /// host and model fall back to their defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow!("ANTHROPIC_API_KEY environment variable is not set"))?;

        let mut config = Self::new(api_key);
        if let Ok(host) = env::var("ANTHROPIC_HOST") {
            config.host = host;
        }
        if let Ok(model) = env::var("ANTHROPIC_MODEL") {
            config.model = model;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AnthropicProviderConfig::new("test_api_key");
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_tokens, 1000);
    }
}
