use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::Tool;

pub const DEFAULT_SEARCH_HOST: &str = "https://html.duckduckgo.com";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; tome/0.1)";

/// Web search via the DuckDuckGo HTML endpoint (no API key needed). A single
/// backend call per invocation; results are scraped out of the returned page.
pub struct SearchTool {
    client: Client,
    host: String,
}

impl SearchTool {
    pub fn new() -> Self {
        Self::with_host(DEFAULT_SEARCH_HOST)
    }

    pub fn with_host<S: Into<String>>(host: S) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            host: host.into(),
        }
    }

    pub fn descriptor() -> Tool {
        Tool::new(
            "search",
            "Search the web for information",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            }),
        )
    }

    pub async fn call(&self, query: &str) -> AgentResult<Vec<Content>> {
        let url = format!(
            "{}/html/?q={}",
            self.host.trim_end_matches('/'),
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AgentError::ExecutionError(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AgentError::ExecutionError(format!(
                "Search request failed: {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AgentError::ExecutionError(format!("Search request failed: {}", e)))?;

        let results = extract_results(&html);
        debug!(query, results = results.len(), "web search finished");

        if results.is_empty() {
            Ok(vec![Content::text(format!(
                "No results found for: {}",
                query
            ))])
        } else {
            Ok(vec![Content::text(results.join("\n\n"))])
        }
    }
}

impl Default for SearchTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract search results from the DuckDuckGo HTML page.
fn extract_results(html: &str) -> Vec<String> {
    let mut results = Vec::new();

    for (i, chunk) in html.split("class=\"result__body\"").enumerate().skip(1) {
        if i > 5 {
            break;
        }

        let title = chunk
            .split("class=\"result__a\"")
            .nth(1)
            .and_then(|s| s.split('>').nth(1))
            .and_then(|s| s.split('<').next())
            .unwrap_or("");

        let snippet = chunk
            .split("class=\"result__snippet\"")
            .nth(1)
            .and_then(|s| s.split('>').nth(1))
            .and_then(|s| s.split('<').next())
            .unwrap_or("");

        let url = chunk
            .split("class=\"result__url\"")
            .nth(1)
            .and_then(|s| s.split('>').nth(1))
            .and_then(|s| s.split('<').next())
            .map(|s| s.trim())
            .unwrap_or("");

        if !title.is_empty() {
            results.push(format!(
                "{}\n{}\nURL: {}",
                html_decode(title),
                html_decode(snippet),
                url
            ));
        }
    }

    results
}

/// Basic HTML entity decoding.
fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
}
