//! Story loading and cataloguing.

pub mod catalog;
pub mod loader;
pub mod markdown;
