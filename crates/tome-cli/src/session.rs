use anyhow::{anyhow, Result};
use cliclack::{input, spinner};
use console::style;
use futures::StreamExt;

use tome::agent::Agent;
use tome::answer::extract_answer;
use tome::models::message::{Message, MessageContent};
use tome::models::role::Role;

pub struct Session {
    agent: Agent,
}

impl Session {
    pub fn new(agent: Agent) -> Self {
        Session { agent }
    }

    pub async fn start(&mut self) -> Result<()> {
        let mut messages: Vec<Message> = Vec::new();

        loop {
            let text: String = input("User:").placeholder("").interact()?;
            if text.trim().eq_ignore_ascii_case("exit") {
                break;
            }
            messages.push(Message::user().with_text(&text));

            let spin = spinner();
            spin.start("thinking");
            let result = self.run_turn(&mut messages).await;
            spin.stop("");

            // Tool lookup failures and malformed responses are fatal
            let answer = result?;
            println!("{}", extract_answer(&answer));
            println!();
        }

        Ok(())
    }

    /// Drive one reply stream, appending every generated message to the
    /// history, and return the text of the final assistant message.
    async fn run_turn(&self, messages: &mut Vec<Message>) -> Result<String> {
        let mut stream = self.agent.reply(messages);
        let mut last_text: Option<String> = None;

        while let Some(next) = stream.next().await {
            let message = next?;
            render_tool_activity(&message);
            if message.role == Role::Assistant {
                last_text = message.first_text().map(String::from);
            }
            messages.push(message);
        }

        last_text.ok_or_else(|| anyhow!("model response did not include a text block"))
    }
}

fn render_tool_activity(message: &Message) {
    for content in &message.content {
        if let MessageContent::ToolRequest(request) = content {
            if let Ok(call) = &request.tool_call {
                println!(
                    "{}",
                    style(format!("Assistant wants to use the {} tool", call.name)).dim()
                );
            }
        }
    }
}
