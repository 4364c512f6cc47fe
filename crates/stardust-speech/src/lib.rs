//! Speech output backends for the Stardust Stories narration driver.

pub mod espeak;
pub mod silent;

pub use espeak::EspeakBackend;
pub use silent::SilentBackend;
