use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::Tool;

pub const DEFAULT_WIKIPEDIA_HOST: &str = "https://en.wikipedia.org";

/// Encyclopedia lookup: resolves a search term to the best-matching Wikipedia
/// page and returns that page's plain text. One backend call per step, no
/// caching and no retries.
pub struct ArticleTool {
    client: Client,
    host: String,
}

impl ArticleTool {
    pub fn new() -> Self {
        Self::with_host(DEFAULT_WIKIPEDIA_HOST)
    }

    pub fn with_host<S: Into<String>>(host: S) -> Self {
        Self {
            client: Client::new(),
            host: host.into(),
        }
    }

    pub fn descriptor() -> Tool {
        Tool::new(
            "get_article",
            "A tool to retrieve an up to date Wikipedia article.",
            json!({
                "type": "object",
                "properties": {
                    "search_term": {
                        "type": "string",
                        "description": "The search term to find a wikipedia article by title"
                    }
                },
                "required": ["search_term"]
            }),
        )
    }

    pub async fn call(&self, search_term: &str) -> AgentResult<Vec<Content>> {
        let title = self.resolve_title(search_term).await?;
        debug!(search_term, %title, "resolved wikipedia page");
        let text = self.page_extract(&title).await?;
        Ok(vec![Content::text(text)])
    }

    fn api_url(&self) -> String {
        format!("{}/w/api.php", self.host.trim_end_matches('/'))
    }

    async fn get(&self, query: &[(&str, &str)]) -> AgentResult<Value> {
        let response = self
            .client
            .get(self.api_url())
            .query(query)
            .send()
            .await
            .map_err(|e| AgentError::ExecutionError(format!("Wikipedia request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AgentError::ExecutionError(format!(
                "Wikipedia request failed: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AgentError::ExecutionError(format!("Invalid Wikipedia response: {}", e)))
    }

    /// Find the title of the best-matching page, erroring when nothing matches
    async fn resolve_title(&self, search_term: &str) -> AgentResult<String> {
        let data = self
            .get(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", search_term),
                ("srlimit", "1"),
                ("format", "json"),
            ])
            .await?;

        data["query"]["search"][0]["title"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                AgentError::ExecutionError(format!(
                    "No Wikipedia page matches '{}'",
                    search_term
                ))
            })
    }

    async fn page_extract(&self, title: &str) -> AgentResult<String> {
        let data = self
            .get(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
            ])
            .await?;

        // The pages object is keyed by page id, which we do not know up front
        data["query"]["pages"]
            .as_object()
            .and_then(|pages| pages.values().next())
            .and_then(|page| page["extract"].as_str())
            .map(String::from)
            .ok_or_else(|| {
                AgentError::ExecutionError(format!("Page '{}' has no readable content", title))
            })
    }
}

impl Default for ArticleTool {
    fn default() -> Self {
        Self::new()
    }
}
