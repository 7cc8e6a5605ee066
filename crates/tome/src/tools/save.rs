use chrono::Local;
use serde_json::json;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::Tool;

pub const DEFAULT_SAVE_FILE: &str = "research_output.txt";

/// Persistence sink: appends timestamped text blocks to a plain text file.
/// Append-only, no rotation, no structure beyond the timestamp header.
pub struct SaveTool {
    path: PathBuf,
}

impl SaveTool {
    pub fn new() -> Self {
        Self::with_path(DEFAULT_SAVE_FILE)
    }

    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn descriptor() -> Tool {
        Tool::new(
            "save_text",
            "Save the data to a txt file",
            json!({
                "type": "object",
                "properties": {
                    "data": {
                        "type": "string",
                        "description": "The text to save"
                    },
                    "filename": {
                        "type": "string",
                        "description": "Destination file, defaults to research_output.txt"
                    }
                },
                "required": ["data"]
            }),
        )
    }

    pub async fn call(&self, data: &str, filename: Option<&str>) -> AgentResult<Vec<Content>> {
        let path = filename.map(PathBuf::from).unwrap_or_else(|| self.path.clone());
        let confirmation = save_to_txt(data, &path)?;
        Ok(vec![Content::text(confirmation)])
    }
}

impl Default for SaveTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Append a timestamped block to the destination file and confirm.
pub fn save_to_txt(data: &str, path: &Path) -> AgentResult<String> {
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let block = format!(
        "----- Research Output --- Timestamp: {} -----\n\n{}\n\n",
        timestamp, data
    );

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            AgentError::ExecutionError(format!("Failed to open {}: {}", path.display(), e))
        })?;

    file.write_all(block.as_bytes()).map_err(|e| {
        AgentError::ExecutionError(format!("Failed to write {}: {}", path.display(), e))
    })?;

    Ok(format!("Output saved to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_appends_timestamped_blocks() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.txt");

        let first = save_to_txt("hello", &path)?;
        let second = save_to_txt("hello", &path)?;
        assert!(first.contains("out.txt"));
        assert_eq!(first, second);

        let contents = std::fs::read_to_string(&path)?;
        let headers = contents
            .matches("----- Research Output --- Timestamp: ")
            .count();
        assert_eq!(headers, 2);
        assert_eq!(contents.matches("hello").count(), 2);
        Ok(())
    }

    #[test]
    fn test_save_preserves_prior_contents() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "existing line\n")?;

        save_to_txt("appended", &path)?;

        let contents = std::fs::read_to_string(&path)?;
        assert!(contents.starts_with("existing line\n"));
        assert!(contents.contains("appended"));
        Ok(())
    }

    #[test]
    fn test_save_unwritable_destination() {
        let result = save_to_txt("data", Path::new("/no/such/dir/out.txt"));
        assert!(matches!(result, Err(AgentError::ExecutionError(_))));
    }

    #[tokio::test]
    async fn test_call_uses_default_path() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let default_path = dir.path().join("research_output.txt");

        let tool = SaveTool::with_path(&default_path);
        let contents = tool.call("note", None).await?;

        assert!(contents[0].as_text().unwrap().contains("research_output.txt"));
        assert!(default_path.exists());
        Ok(())
    }
}
