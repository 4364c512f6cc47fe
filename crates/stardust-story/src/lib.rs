//! Stardust Stories — story model and story sources.
//!
//! Defines the immutable `Story`/`Scene` contract consumed by the playback
//! engine, the built-in demo story, and loaders for JSON, YAML, and Markdown
//! story documents.

pub mod application;
pub mod domain;
