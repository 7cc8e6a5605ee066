use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::errors::AgentError;
use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};
use crate::providers::base::Usage;

/// Convert internal Message format to the Anthropic messages specification
pub fn messages_to_anthropic_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut blocks = Vec::new();

        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    if !text.text.is_empty() {
                        blocks.push(json!({
                            "type": "text",
                            "text": text.text,
                        }));
                    }
                }
                MessageContent::ToolRequest(request) => match &request.tool_call {
                    Ok(tool_call) => {
                        blocks.push(json!({
                            "type": "tool_use",
                            "id": request.id,
                            "name": tool_call.name,
                            "input": tool_call.arguments,
                        }));
                    }
                    Err(e) => {
                        blocks.push(json!({
                            "type": "text",
                            "text": format!("Error: {}", e),
                        }));
                    }
                },
                MessageContent::ToolResponse(response) => match &response.tool_result {
                    Ok(contents) => {
                        let text = contents
                            .iter()
                            .filter_map(|content| content.as_text())
                            .collect::<Vec<_>>()
                            .join("\n");
                        blocks.push(json!({
                            "type": "tool_result",
                            "tool_use_id": response.id,
                            "content": text,
                        }));
                    }
                    Err(e) => {
                        // An error result is shown to the model so it can interpret the message
                        blocks.push(json!({
                            "type": "tool_result",
                            "tool_use_id": response.id,
                            "content": format!("The tool call returned the following error:\n{}", e),
                            "is_error": true,
                        }));
                    }
                },
            }
        }

        if !blocks.is_empty() {
            messages_spec.push(json!({
                "role": message.role,
                "content": blocks,
            }));
        }
    }

    messages_spec
}

/// Convert internal Tool format to the Anthropic tool specification
pub fn tools_to_anthropic_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "name": tool.name,
            "description": tool.description,
            "input_schema": tool.input_schema,
        }));
    }

    Ok(result)
}

/// Convert an Anthropic API response to internal Message format
pub fn anthropic_response_to_message(response: &Value) -> Result<Message> {
    let original = response
        .get("content")
        .and_then(|content| content.as_array())
        .ok_or_else(|| anyhow!("Invalid response format from Anthropic API"))?;

    let mut content = Vec::new();

    for block in original {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                let text = block
                    .get("text")
                    .and_then(|t| t.as_str())
                    .ok_or_else(|| anyhow!("Text content block is missing its text"))?;
                content.push(MessageContent::text(text));
            }
            Some("tool_use") => {
                let id = block["id"].as_str().unwrap_or_default().to_string();
                let name = block["name"].as_str().unwrap_or_default().to_string();

                match block.get("input") {
                    Some(input) => {
                        content.push(MessageContent::tool_request(
                            id,
                            Ok(ToolCall::new(&name, input.clone())),
                        ));
                    }
                    None => {
                        let error = AgentError::InvalidParameters(format!(
                            "Tool use block for '{}' is missing its input",
                            name
                        ));
                        content.push(MessageContent::tool_request(id, Err(error)));
                    }
                }
            }
            // Unknown block types are dropped rather than failing the whole response
            _ => continue,
        }
    }

    Ok(Message {
        role: Role::Assistant,
        created: chrono::Utc::now().timestamp(),
        content,
    })
}

/// Pull token usage out of an Anthropic API response
pub fn get_usage(response: &Value) -> Usage {
    let usage = response.get("usage");

    let input_tokens = usage
        .and_then(|u| u.get("input_tokens"))
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let output_tokens = usage
        .and_then(|u| u.get("output_tokens"))
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let total_tokens = match (input_tokens, output_tokens) {
        (Some(input), Some(output)) => Some(input + output),
        _ => None,
    };

    Usage::new(input_tokens, output_tokens, total_tokens)
}
