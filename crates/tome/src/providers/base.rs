use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::message::Message;
use crate::models::tool::Tool;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Base trait for the model backend
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next message from the conversation so far
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_defaults_to_unknown() {
        let usage = Usage::default();
        assert!(usage.input_tokens.is_none());
        assert!(usage.output_tokens.is_none());
        assert!(usage.total_tokens.is_none());
    }

    #[test]
    fn test_usage_roundtrip() -> Result<()> {
        let usage = Usage::new(Some(7), Some(3), Some(10));
        let parsed: Usage = serde_json::from_str(&serde_json::to_string(&usage)?)?;
        assert_eq!(parsed.input_tokens, Some(7));
        assert_eq!(parsed.output_tokens, Some(3));
        assert_eq!(parsed.total_tokens, Some(10));
        Ok(())
    }
}
