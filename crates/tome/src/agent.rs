use anyhow::{anyhow, Result};
use futures::stream::BoxStream;
use tracing::debug;

use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::message::{Message, ToolRequest};
use crate::prompt::system_prompt;
use crate::providers::base::Provider;
use crate::tools::toolkit::Toolkit;

/// Agent wires the model backend to the research toolkit and runs the
/// tool-call round for one user turn.
pub struct Agent {
    provider: Box<dyn Provider>,
    toolkit: Toolkit,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, toolkit: Toolkit) -> Self {
        Self { provider, toolkit }
    }

    /// Resolve a single tool request. Backend failures are handed back to the
    /// model inside the tool result; an unknown tool or bad parameters end
    /// the run.
    async fn resolve(&self, request: &ToolRequest) -> Result<AgentResult<Vec<Content>>> {
        let call = request
            .tool_call
            .as_ref()
            .map_err(|e| anyhow!("Malformed tool request {}: {}", request.id, e))?;

        debug!(tool = %call.name, id = %request.id, "dispatching tool call");
        match self.toolkit.dispatch(call).await {
            Ok(contents) => Ok(Ok(contents)),
            Err(error @ AgentError::ExecutionError(_)) => Ok(Err(error)),
            Err(error) => Err(error.into()),
        }
    }

    /// Create a stream that yields each message generated for this turn: the
    /// assistant's response, then, if it requested tools, one user message
    /// batching every tool result and the follow-up response. At most one
    /// tool round per turn; a tool request in the follow-up response is left
    /// unserviced.
    pub fn reply<'a>(&'a self, messages: &[Message]) -> BoxStream<'a, Result<Message>> {
        let mut messages = messages.to_vec();

        Box::pin(async_stream::try_stream! {
            let system = system_prompt();
            let tools = self.toolkit.tools();

            let (response, usage) = self
                .provider
                .complete(&system, &messages, &tools)
                .await?;
            debug!(
                input_tokens = ?usage.input_tokens,
                output_tokens = ?usage.output_tokens,
                "completion finished"
            );
            yield response.clone();

            let tool_requests: Vec<ToolRequest> = response
                .content
                .iter()
                .filter_map(|content| content.as_tool_request())
                .cloned()
                .collect();

            if !tool_requests.is_empty() {
                messages.push(response);

                // Resolve sequentially, in the order the model returned them,
                // and batch every result into a single user message
                let mut tool_message = Message::user();
                for request in &tool_requests {
                    let output = self.resolve(request).await?;
                    tool_message = tool_message.with_tool_response(request.id.clone(), output);
                }
                messages.push(tool_message.clone());
                yield tool_message;

                let (followup, usage) = self
                    .provider
                    .complete(&system, &messages, &tools)
                    .await?;
                debug!(
                    input_tokens = ?usage.input_tokens,
                    output_tokens = ?usage.output_tokens,
                    "follow-up completion finished"
                );
                yield followup;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::MessageContent;
    use crate::models::role::Role;
    use crate::models::tool::ToolCall;
    use crate::providers::mock::MockProvider;
    use crate::tools::save::SaveTool;
    use futures::TryStreamExt;
    use serde_json::json;

    async fn collect(agent: &Agent, messages: &[Message]) -> Result<Vec<Message>> {
        let mut stream = agent.reply(messages);
        let mut collected = Vec::new();
        while let Some(message) = stream.try_next().await? {
            collected.push(message);
        }
        Ok(collected)
    }

    #[tokio::test]
    async fn test_simple_response() -> Result<()> {
        let response = Message::assistant().with_text("<answer>Hello!</answer>");
        let provider = MockProvider::new(vec![response.clone()]);
        let agent = Agent::new(Box::new(provider), Toolkit::new());

        let messages = collect(&agent, &[Message::user().with_text("Hi")]).await?;

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0], response);
        Ok(())
    }

    #[tokio::test]
    async fn test_tool_call_round() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("notes.txt");
        let provider = MockProvider::new(vec![
            Message::assistant().with_tool_request(
                "1",
                Ok(ToolCall::new(
                    "save_text",
                    json!({"data": "observed", "filename": out.to_str().unwrap()}),
                )),
            ),
            Message::assistant().with_text("<answer>Done</answer>"),
        ]);
        let agent = Agent::new(
            Box::new(provider),
            Toolkit::new().with_save(SaveTool::with_path(dir.path().join("default.txt"))),
        );

        let messages = collect(&agent, &[Message::user().with_text("Save this")]).await?;

        // Tool request, batched results, and the follow-up text
        assert_eq!(messages.len(), 3);
        assert!(messages[0]
            .content
            .iter()
            .any(|c| matches!(c, MessageContent::ToolRequest(_))));
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[2].first_text(), Some("<answer>Done</answer>"));
        assert!(out.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_multiple_tool_calls_batched_in_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        let provider = MockProvider::new(vec![
            Message::assistant()
                .with_tool_request(
                    "1",
                    Ok(ToolCall::new(
                        "save_text",
                        json!({"data": "a", "filename": first.to_str().unwrap()}),
                    )),
                )
                .with_tool_request(
                    "2",
                    Ok(ToolCall::new(
                        "save_text",
                        json!({"data": "b", "filename": second.to_str().unwrap()}),
                    )),
                ),
            Message::assistant().with_text("<answer>All saved</answer>"),
        ]);
        let agent = Agent::new(
            Box::new(provider),
            Toolkit::new().with_save(SaveTool::with_path(dir.path().join("default.txt"))),
        );

        let messages = collect(&agent, &[Message::user().with_text("Save both")]).await?;

        assert_eq!(messages.len(), 3);
        let responses: Vec<&str> = messages[1]
            .content
            .iter()
            .filter_map(|c| c.as_tool_response())
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(responses, vec!["1", "2"]);
        assert!(first.exists());
        assert!(second.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_followup_reoffers_same_tool_schema() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("notes.txt");
        let provider = MockProvider::new(vec![
            Message::assistant().with_tool_request(
                "1",
                Ok(ToolCall::new(
                    "save_text",
                    json!({"data": "observed", "filename": out.to_str().unwrap()}),
                )),
            ),
            Message::assistant().with_text("<answer>Done</answer>"),
        ]);
        let log = provider.request_log();
        let agent = Agent::new(
            Box::new(provider),
            Toolkit::new().with_save(SaveTool::with_path(dir.path().join("default.txt"))),
        );

        collect(&agent, &[Message::user().with_text("Save this")]).await?;

        let requests = log.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].tool_names, vec!["get_article", "save_text"]);
        assert_eq!(requests[1].tool_names, requests[0].tool_names);
        assert!(requests[0].system.contains("<answer>"));
        // History grows by the assistant response and the batched tool results
        assert_eq!(requests[0].message_count, 1);
        assert_eq!(requests[1].message_count, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_tool_is_fatal() -> Result<()> {
        let provider = MockProvider::new(vec![Message::assistant()
            .with_tool_request("1", Ok(ToolCall::new("get_weather", json!({"city": "Lima"}))))]);
        let agent = Agent::new(Box::new(provider), Toolkit::new());

        let mut stream = agent.reply(&[Message::user().with_text("Weather?")]);
        // The assistant message itself is yielded before dispatch fails
        assert!(stream.try_next().await?.is_some());
        let error = stream.try_next().await.unwrap_err();
        assert!(error.to_string().contains("get_weather"));
        Ok(())
    }

    #[tokio::test]
    async fn test_execution_error_carried_in_result() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let provider = MockProvider::new(vec![
            Message::assistant().with_tool_request(
                "1",
                Ok(ToolCall::new(
                    "save_text",
                    json!({"data": "x", "filename": "/no/such/dir/out.txt"}),
                )),
            ),
            Message::assistant().with_text("<answer>That failed</answer>"),
        ]);
        let agent = Agent::new(
            Box::new(provider),
            Toolkit::new().with_save(SaveTool::with_path(dir.path().join("default.txt"))),
        );

        let messages = collect(&agent, &[Message::user().with_text("Save")]).await?;

        assert_eq!(messages.len(), 3);
        let response = messages[1].content[0].as_tool_response().unwrap();
        assert_eq!(response.id, "1");
        assert!(response.tool_result.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_followup_tool_request_is_not_serviced() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let first = dir.path().join("first.txt");
        let unserviced = dir.path().join("unserviced.txt");
        let provider = MockProvider::new(vec![
            Message::assistant().with_tool_request(
                "1",
                Ok(ToolCall::new(
                    "save_text",
                    json!({"data": "a", "filename": first.to_str().unwrap()}),
                )),
            ),
            Message::assistant().with_tool_request(
                "2",
                Ok(ToolCall::new(
                    "save_text",
                    json!({"data": "b", "filename": unserviced.to_str().unwrap()}),
                )),
            ),
        ]);
        let agent = Agent::new(
            Box::new(provider),
            Toolkit::new().with_save(SaveTool::with_path(dir.path().join("default.txt"))),
        );

        let messages = collect(&agent, &[Message::user().with_text("Chain tools")]).await?;

        // The stream ends after the follow-up; its tool request is ignored
        assert_eq!(messages.len(), 3);
        assert!(first.exists());
        assert!(!unserviced.exists());
        Ok(())
    }
}
