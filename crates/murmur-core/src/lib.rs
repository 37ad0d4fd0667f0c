//! Core types for murmur: the story graph, play state, and chat transcript.
//!
//! A story is authored data: nodes of chat lines with followups, guarded
//! choices, and an ordered list of endings. Conditions and effects are small
//! declarative operations, so a story can be loaded from JSON and replayed
//! against a [`PlayState`] without embedding any scripting.

/// Error types used throughout the crate.
pub mod error;
/// Chat transcript messages and speakers.
pub mod message;
/// Mutable progress snapshot owned by the playback engine.
pub mod state;
/// Authored story data: nodes, choices, conditions, effects, endings.
pub mod story;
/// Integrity checks over a loaded story graph.
pub mod validate;

/// Re-export error types.
pub use error::{StoryError, StoryResult};
/// Re-export transcript types.
pub use message::{Message, Speaker};
/// Re-export play state types.
pub use state::{ActivityStatus, PlayState, WaitProgress};
/// Re-export story types.
pub use story::{
    Choice, Condition, Effect, Ending, EndingCategory, Followup, StoryGraph, StoryNode,
};
/// Re-export validation types.
pub use validate::{ValidationIssue, validate};
