//! In-memory catalog of playable stories, keyed by slug.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use stardust_core::error::DomainError;
use tracing::info;

use super::loader::{StoryFormat, load_story_file};
use crate::domain::demo::{DEMO_SLUG, demo_story};
use crate::domain::story::Story;

/// Listing entry for a catalogued story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorySummary {
    /// Catalog key.
    pub slug: String,
    /// Story title.
    pub title: String,
    /// Informational age label.
    pub age_range: String,
    /// Number of scenes.
    pub scene_count: usize,
    /// Reading time rounded to whole minutes.
    pub estimated_minutes: u64,
}

/// Stories available for playback.
#[derive(Debug, Clone, Default)]
pub struct StoryCatalog {
    stories: BTreeMap<String, Arc<Story>>,
}

impl StoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding only the demo story.
    #[must_use]
    pub fn with_demo() -> Self {
        let mut catalog = Self::new();
        catalog.insert(DEMO_SLUG, demo_story());
        catalog
    }

    /// Registers a story, returning the one it replaced.
    pub fn insert(&mut self, slug: impl Into<String>, story: Story) -> Option<Arc<Story>> {
        self.stories.insert(slug.into(), Arc::new(story))
    }

    /// Looks up a story by slug.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoryNotFound` if the slug is unknown.
    pub fn get(&self, slug: &str) -> Result<Arc<Story>, DomainError> {
        self.stories
            .get(slug)
            .cloned()
            .ok_or_else(|| DomainError::StoryNotFound(slug.to_owned()))
    }

    /// Summaries of every story, ordered by slug.
    #[must_use]
    pub fn summaries(&self) -> Vec<StorySummary> {
        self.stories
            .iter()
            .map(|(slug, story)| StorySummary {
                slug: slug.clone(),
                title: story.title().to_owned(),
                age_range: story.age_range().to_owned(),
                scene_count: story.scene_count(),
                estimated_minutes: story.estimated_minutes(),
            })
            .collect()
    }

    /// Number of catalogued stories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    /// Returns true when the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Loads every story document in `dir`. The slug is the file stem.
    /// Files with other extensions are skipped.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the directory cannot be read
    /// and `DomainError::Validation` for the first malformed document.
    pub async fn load_dir(&mut self, dir: &Path) -> Result<usize, DomainError> {
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
            DomainError::Infrastructure(format!("failed to read {}: {e}", dir.display()))
        })?;

        let mut loaded = 0;
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            DomainError::Infrastructure(format!("failed to read {}: {e}", dir.display()))
        })? {
            let path = entry.path();
            if StoryFormat::from_path(&path).is_none() {
                continue;
            }
            let Some(slug) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            let story = load_story_file(&path).await?;
            info!(slug = %slug, title = %story.title(), scenes = story.scene_count(), "loaded story");
            self.insert(slug, story);
            loaded += 1;
        }
        Ok(loaded)
    }
}
