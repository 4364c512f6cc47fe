//! Built-in demo story, served until a generated story is available.

use super::story::{Scene, Story};

/// Catalog slug of the demo story.
pub const DEMO_SLUG: &str = "demo";

/// "Luna's Mars Adventure": three scenes for ages 4-8.
#[must_use]
pub fn demo_story() -> Story {
    Story {
        title: "Luna's Mars Adventure".to_owned(),
        age_range: "4-8 years".to_owned(),
        estimated_duration_seconds: 300,
        scenes: vec![
            Scene::new(
                "The Journey Begins",
                "Luna looked up at the twinkling stars and dreamed of visiting Mars, \
                 the red planet she'd seen in pictures.",
                "https://images.unsplash.com/photo-1446776877081-d282a0f896e2?w=800",
                "A beautiful view of Mars from space showing its rusty red surface",
            ),
            Scene::new(
                "Landing on Mars",
                "With a gentle bump, Luna's spaceship landed on Mars. The landscape was \
                 covered in beautiful red dust that sparkled in the sunlight.",
                "https://images.unsplash.com/photo-1446776653964-20c1d3a81b06?w=800",
                "Mars surface with rocky terrain and red dust",
            ),
            Scene::new(
                "Space Friends",
                "As Luna explored, she discovered friendly space creatures who showed her \
                 the most amazing crystal caves hidden beneath the red rocks.",
                "https://images.unsplash.com/photo-1502134249126-9f3755a50d78?w=800",
                "Artistic representation of friendly alien creatures on Mars",
            ),
        ],
    }
}
