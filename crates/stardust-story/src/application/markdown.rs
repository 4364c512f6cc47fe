//! Markdown story documents.
//!
//! Layout:
//!
//! ```markdown
//! ---
//! ageRange: 4-8 years
//! estimatedDurationSeconds: 120
//! ---
//! # Story title
//!
//! ## First scene title
//! ![alt text](https://example.com/image.png)
//!
//! Narration paragraphs...
//! ```
//!
//! Front matter is optional. Text before the first `##` heading is ignored.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use serde::Deserialize;
use stardust_core::error::DomainError;

use crate::domain::story::{Scene, Story};

/// Narration pace used to estimate reading time when the document omits it.
const NARRATION_WORDS_PER_MINUTE: usize = 120;

/// Pause budgeted between scenes when estimating reading time.
const SETTLE_SECONDS_PER_SCENE: usize = 1;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrontMatter {
    #[serde(default)]
    age_range: Option<String>,
    #[serde(default)]
    estimated_duration_seconds: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Nothing,
    FrontMatter,
    StoryTitle,
    SceneTitle,
    Paragraph,
}

#[derive(Debug, Default)]
struct SceneDraft {
    title: String,
    paragraphs: Vec<String>,
    image_url: Option<String>,
    alt_text: String,
}

impl SceneDraft {
    fn into_scene(self) -> Scene {
        Scene::new(
            self.title.trim(),
            self.paragraphs.join(" "),
            self.image_url.unwrap_or_default(),
            self.alt_text.trim(),
        )
    }
}

/// Parses a Markdown story document.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the front matter is not valid YAML
/// or the document has no `##` scene headings.
pub fn parse_markdown_story(source: &str) -> Result<Story, DomainError> {
    let mut front_matter = String::new();
    let mut title = String::new();
    let mut drafts: Vec<SceneDraft> = Vec::new();
    let mut paragraph = String::new();
    let mut capture = Capture::Nothing;
    // Set while inside the first image of the current scene.
    let mut capturing_alt = false;

    for event in Parser::new_ext(source, Options::ENABLE_YAML_STYLE_METADATA_BLOCKS) {
        match event {
            Event::Start(Tag::MetadataBlock(_)) => capture = Capture::FrontMatter,
            Event::Start(Tag::Heading { level, .. }) => {
                capture = match level {
                    HeadingLevel::H1 => Capture::StoryTitle,
                    HeadingLevel::H2 => {
                        drafts.push(SceneDraft::default());
                        Capture::SceneTitle
                    }
                    _ => Capture::Nothing,
                };
            }
            Event::Start(Tag::Paragraph) if !drafts.is_empty() => {
                paragraph.clear();
                capture = Capture::Paragraph;
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                if let Some(draft) = drafts.last_mut() {
                    if draft.image_url.is_none() {
                        draft.image_url = Some(dest_url.to_string());
                        capturing_alt = true;
                    }
                }
            }
            Event::End(TagEnd::Image) => capturing_alt = false,
            Event::End(TagEnd::Paragraph) => {
                if capture == Capture::Paragraph {
                    let text = paragraph.split_whitespace().collect::<Vec<_>>().join(" ");
                    if let (Some(draft), false) = (drafts.last_mut(), text.is_empty()) {
                        draft.paragraphs.push(text);
                    }
                }
                capture = Capture::Nothing;
            }
            Event::End(TagEnd::MetadataBlock(_) | TagEnd::Heading(_)) => {
                capture = Capture::Nothing;
            }
            Event::Text(text) | Event::Code(text) => {
                if capturing_alt {
                    if let Some(draft) = drafts.last_mut() {
                        draft.alt_text.push_str(&text);
                    }
                    continue;
                }
                match capture {
                    Capture::FrontMatter => front_matter.push_str(&text),
                    Capture::StoryTitle => title.push_str(&text),
                    Capture::SceneTitle => {
                        if let Some(draft) = drafts.last_mut() {
                            draft.title.push_str(&text);
                        }
                    }
                    Capture::Paragraph => paragraph.push_str(&text),
                    Capture::Nothing => {}
                }
            }
            Event::SoftBreak | Event::HardBreak if capture == Capture::Paragraph => {
                paragraph.push(' ');
            }
            _ => {}
        }
    }

    let meta: FrontMatter = if front_matter.trim().is_empty() {
        FrontMatter::default()
    } else {
        serde_yaml::from_str(&front_matter)
            .map_err(|e| DomainError::Validation(format!("invalid front matter: {e}")))?
    };

    let scenes: Vec<Scene> = drafts.into_iter().map(SceneDraft::into_scene).collect();
    let estimated = meta
        .estimated_duration_seconds
        .unwrap_or_else(|| estimate_duration_seconds(&scenes));

    Story::new(
        title.trim(),
        meta.age_range.unwrap_or_default(),
        scenes,
        estimated,
    )
}

/// Estimates reading time from the narration word count.
fn estimate_duration_seconds(scenes: &[Scene]) -> u64 {
    let words: usize = scenes
        .iter()
        .map(|scene| scene.narration_text.split_whitespace().count())
        .sum();
    let seconds = (words * 60).div_ceil(NARRATION_WORDS_PER_MINUTE)
        + scenes.len() * SETTLE_SECONDS_PER_SCENE;
    u64::try_from(seconds).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LUNA: &str = "---
ageRange: 4-8 years
---
# Luna's Mars Adventure

An intro paragraph that is not part of any scene.

## The Journey Begins
![Mars from space](https://img/mars.png)

Luna looked up at the
twinkling stars.

She dreamed of Mars.

## Landing on Mars

With a gentle bump, the ship landed.
";

    #[test]
    fn test_parse_markdown_builds_scenes_from_h2_sections() {
        // Act
        let story = parse_markdown_story(LUNA).unwrap();

        // Assert
        assert_eq!(story.title(), "Luna's Mars Adventure");
        assert_eq!(story.age_range(), "4-8 years");
        assert_eq!(story.scene_count(), 2);

        let first = &story.scenes()[0];
        assert_eq!(first.title, "The Journey Begins");
        assert_eq!(first.image_url, "https://img/mars.png");
        assert_eq!(first.alt_text, "Mars from space");
        assert_eq!(
            first.narration_text,
            "Luna looked up at the twinkling stars. She dreamed of Mars."
        );

        let second = &story.scenes()[1];
        assert_eq!(second.image_url, "");
        assert_eq!(second.narration_text, "With a gentle bump, the ship landed.");
    }

    #[test]
    fn test_parse_markdown_estimates_duration_when_missing() {
        // 18 words -> ceil(18 * 60 / 120) = 9 seconds, plus 1 per scene.
        let story = parse_markdown_story(LUNA).unwrap();
        assert_eq!(story.estimated_duration_seconds(), 11);
    }

    #[test]
    fn test_parse_markdown_prefers_front_matter_duration() {
        let source = "---\nestimatedDurationSeconds: 240\n---\n# T\n\n## S\n\nHello.\n";
        let story = parse_markdown_story(source).unwrap();
        assert_eq!(story.estimated_duration_seconds(), 240);
        assert_eq!(story.age_range(), "");
    }

    #[test]
    fn test_parse_markdown_without_scenes_is_rejected() {
        let result = parse_markdown_story("# Lonely title\n\nJust words.\n");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_parse_markdown_rejects_broken_front_matter() {
        let source = "---\nageRange: [unclosed\n---\n# T\n\n## S\n\nHi.\n";
        let result = parse_markdown_story(source);
        match result {
            Err(DomainError::Validation(message)) => assert!(message.contains("front matter")),
            other => panic!("expected Validation error, got {other:?}"),
        }
    }
}
