//! Parsing of story documents from text and files.

use std::path::Path;

use stardust_core::error::DomainError;

use super::markdown::parse_markdown_story;
use crate::domain::story::Story;

/// Supported story document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryFormat {
    /// JSON in the camelCase story contract.
    Json,
    /// YAML in the camelCase story contract.
    Yaml,
    /// Markdown with optional YAML front matter.
    Markdown,
}

impl StoryFormat {
    /// Infers the format from a file extension. Returns `None` for files that
    /// are not story documents.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// Parses a story document.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the document is malformed or the
/// story has no scenes.
pub fn parse_story(source: &str, format: StoryFormat) -> Result<Story, DomainError> {
    match format {
        StoryFormat::Json => serde_json::from_str(source)
            .map_err(|e| DomainError::Validation(format!("invalid story document: {e}"))),
        StoryFormat::Yaml => serde_yaml::from_str(source)
            .map_err(|e| DomainError::Validation(format!("invalid story document: {e}"))),
        StoryFormat::Markdown => parse_markdown_story(source),
    }
}

/// Reads and parses a story file, inferring the format from its extension.
///
/// # Errors
///
/// Returns `DomainError::Validation` for unknown extensions or malformed
/// documents, and `DomainError::Infrastructure` if the file cannot be read.
pub async fn load_story_file(path: &Path) -> Result<Story, DomainError> {
    let format = StoryFormat::from_path(path).ok_or_else(|| {
        DomainError::Validation(format!("unsupported story file: {}", path.display()))
    })?;
    let source = tokio::fs::read_to_string(path).await.map_err(|e| {
        DomainError::Infrastructure(format!("failed to read {}: {e}", path.display()))
    })?;
    parse_story(&source, format).map_err(|e| match e {
        DomainError::Validation(message) => {
            DomainError::Validation(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}
