//! The `Story` and `Scene` value types.

use serde::{Deserialize, Serialize};
use stardust_core::error::DomainError;

/// One narrated unit of a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Heading shown above the scene.
    pub title: String,
    /// Text handed verbatim to the narration driver.
    #[serde(default)]
    pub narration_text: String,
    /// Reference to the scene illustration. Not resolved or validated.
    #[serde(default)]
    pub image_url: String,
    /// Accessibility text for the illustration.
    #[serde(default)]
    pub alt_text: String,
    /// Optional stage directions supplied by the story source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scene_actions: Vec<String>,
}

impl Scene {
    /// Creates a scene without stage directions.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        narration_text: impl Into<String>,
        image_url: impl Into<String>,
        alt_text: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            narration_text: narration_text.into(),
            image_url: image_url.into(),
            alt_text: alt_text.into(),
            scene_actions: Vec::new(),
        }
    }

    /// Returns true when there is nothing for the narrator to say.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.narration_text.trim().is_empty()
    }
}

/// An immutable, validated story. Always holds at least one scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoryDocument")]
pub struct Story {
    pub(crate) title: String,
    pub(crate) age_range: String,
    pub(crate) scenes: Vec<Scene>,
    pub(crate) estimated_duration_seconds: u64,
}

impl Story {
    /// Builds a story from its parts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `scenes` is empty.
    pub fn new(
        title: impl Into<String>,
        age_range: impl Into<String>,
        scenes: Vec<Scene>,
        estimated_duration_seconds: u64,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        if scenes.is_empty() {
            return Err(DomainError::Validation(format!(
                "story \"{title}\" must contain at least one scene"
            )));
        }
        for (index, scene) in scenes.iter().enumerate() {
            if scene.is_silent() {
                tracing::warn!(
                    story = %title,
                    scene_index = index,
                    "scene has no narration text; it will advance silently"
                );
            }
        }
        Ok(Self {
            title,
            age_range: age_range.into(),
            scenes,
            estimated_duration_seconds,
        })
    }

    /// Story title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Informational age label, e.g. `4-8 years`.
    #[must_use]
    pub fn age_range(&self) -> &str {
        &self.age_range
    }

    /// Scenes in narration order.
    #[must_use]
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Returns the scene at `index`, if any.
    #[must_use]
    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    /// Number of scenes. Never zero.
    #[must_use]
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Index of the final scene.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.scenes.len() - 1
    }

    /// Informational reading time in seconds.
    #[must_use]
    pub fn estimated_duration_seconds(&self) -> u64 {
        self.estimated_duration_seconds
    }

    /// Reading time rounded to the nearest whole minute.
    #[must_use]
    pub fn estimated_minutes(&self) -> u64 {
        (self.estimated_duration_seconds + 30) / 60
    }
}

/// Wire shape accepted from story sources before validation.
///
/// `storyTitle` and `estimatedReadTimeSeconds` are accepted for documents
/// produced by the web client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoryDocument {
    #[serde(alias = "storyTitle")]
    title: String,
    #[serde(default)]
    age_range: String,
    scenes: Vec<Scene>,
    #[serde(default, alias = "estimatedReadTimeSeconds")]
    estimated_duration_seconds: u64,
}

impl TryFrom<StoryDocument> for Story {
    type Error = DomainError;

    fn try_from(doc: StoryDocument) -> Result<Self, Self::Error> {
        Story::new(
            doc.title,
            doc.age_range,
            doc.scenes,
            doc.estimated_duration_seconds,
        )
    }
}
