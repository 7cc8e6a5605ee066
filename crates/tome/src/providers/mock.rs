use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Provider, Usage};

/// What one completion request carried, kept for assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: String,
    pub message_count: usize,
    pub tool_names: Vec<String>,
}

/// Scripted backend for tests: hands out a fixed sequence of replies, in
/// order, and records what every completion request carried. Once the script
/// runs out it answers with an empty assistant message.
pub struct MockProvider {
    replies: Mutex<Vec<Message>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockProvider {
    pub fn new(replies: Vec<Message>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the recorded requests, usable after the provider has
    /// been boxed and handed to an agent.
    pub fn request_log(&self) -> Arc<Mutex<Vec<RecordedRequest>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system: system.to_string(),
            message_count: messages.len(),
            tool_names: tools.iter().map(|tool| tool.name.clone()).collect(),
        });

        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.is_empty() {
            Message::assistant().with_text("")
        } else {
            replies.remove(0)
        };
        Ok((reply, Usage::default()))
    }
}
