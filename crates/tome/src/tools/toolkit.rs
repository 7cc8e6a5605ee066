use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};

use super::article::ArticleTool;
use super::save::SaveTool;
use super::search::SearchTool;

/// The closed set of capabilities the model can request, with their typed
/// inputs. Parsing a [`ToolCall`] into a variant happens once, at the edge;
/// dispatch is an exhaustive match, so an unknown tool name can only fail
/// here.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    GetArticle { search_term: String },
    Search { query: String },
    SaveText { data: String, filename: Option<String> },
}

impl ToolInvocation {
    pub fn from_call(call: &ToolCall) -> AgentResult<Self> {
        match call.name.as_str() {
            "get_article" => Ok(ToolInvocation::GetArticle {
                search_term: required_str(call, "search_term")?,
            }),
            "search" => Ok(ToolInvocation::Search {
                query: required_str(call, "query")?,
            }),
            "save_text" => Ok(ToolInvocation::SaveText {
                data: required_str(call, "data")?,
                filename: call
                    .arguments
                    .get("filename")
                    .and_then(|v| v.as_str())
                    .map(String::from),
            }),
            other => Err(AgentError::ToolNotFound(other.to_string())),
        }
    }
}

fn required_str(call: &ToolCall, key: &str) -> AgentResult<String> {
    call.arguments
        .get(key)
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| {
            AgentError::InvalidParameters(format!(
                "{} requires a string '{}' parameter",
                call.name, key
            ))
        })
}

/// The tools offered to the model. Article lookup is always registered;
/// search and save are opt-in, and a request for one that is not registered
/// fails as ToolNotFound.
pub struct Toolkit {
    article: ArticleTool,
    search: Option<SearchTool>,
    save: Option<SaveTool>,
}

impl Toolkit {
    pub fn new() -> Self {
        Self {
            article: ArticleTool::new(),
            search: None,
            save: None,
        }
    }

    pub fn with_article(mut self, article: ArticleTool) -> Self {
        self.article = article;
        self
    }

    pub fn with_search(mut self, search: SearchTool) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_save(mut self, save: SaveTool) -> Self {
        self.save = Some(save);
        self
    }

    /// Descriptors for the registered tools, sent unchanged on every model call
    pub fn tools(&self) -> Vec<Tool> {
        let mut tools = vec![ArticleTool::descriptor()];
        if self.search.is_some() {
            tools.push(SearchTool::descriptor());
        }
        if self.save.is_some() {
            tools.push(SaveTool::descriptor());
        }
        tools
    }

    pub async fn dispatch(&self, call: &ToolCall) -> AgentResult<Vec<Content>> {
        match ToolInvocation::from_call(call)? {
            ToolInvocation::GetArticle { search_term } => self.article.call(&search_term).await,
            ToolInvocation::Search { query } => match &self.search {
                Some(search) => search.call(&query).await,
                None => Err(AgentError::ToolNotFound("search".to_string())),
            },
            ToolInvocation::SaveText { data, filename } => match &self.save {
                Some(save) => save.call(&data, filename.as_deref()).await,
                None => Err(AgentError::ToolNotFound("save_text".to_string())),
            },
        }
    }
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::new()
    }
}
