//! Command abstractions.

use uuid::Uuid;

/// Trait implemented by every user-initiated command.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID linking the command to the events it produces.
    fn correlation_id(&self) -> Uuid;
}
