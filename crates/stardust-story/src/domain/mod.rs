//! Story domain types.

pub mod demo;
pub mod story;
