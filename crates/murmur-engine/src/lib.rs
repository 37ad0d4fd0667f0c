//! Narrative playback engine for murmur.
//!
//! [`StoryEngine`] walks a [`murmur_core::StoryGraph`], pacing message
//! delivery through a [`TimeProvider`], persisting every resumable step
//! through a [`murmur_store::SaveManager`], and reporting progress to any
//! number of subscribers as [`EngineEvent`]s.

/// Text chunking and the typing-time model.
pub mod chunk;
/// Engine configuration.
pub mod config;
/// Error types for the engine crate.
pub mod error;
/// Events delivered to presentation layers.
pub mod event;
/// The text-generation boundary.
pub mod generator;
/// Prompt construction and reply parsing for language models.
pub mod prompt;
/// Free-text resolution and text substitution.
pub mod resolver;
/// Time suspension strategies.
pub mod time;

mod engine;

/// Re-exports of [`chunk::split_into_chunks`] and [`chunk::typing_delay`].
pub use chunk::{split_into_chunks, typing_delay};
/// Re-export of [`config::EngineConfig`].
pub use config::EngineConfig;
/// Re-exports of the engine handle and its phase.
pub use engine::{Phase, StoryEngine};
/// Re-exports of [`error::EngineError`], [`error::EngineResult`], and [`error::GenerationError`].
pub use error::{EngineError, EngineResult, GenerationError};
/// Re-exports of [`event::EngineEvent`], [`event::EventBus`], and [`event::OfferedChoice`].
pub use event::{EngineEvent, EventBus, OfferedChoice};
/// Re-exports of the text-generation traits and the prompted adapter.
pub use generator::{CompletionRequest, LanguageModel, PromptedGenerator, TextGenerator};
/// Re-export of [`resolver::ResponseResolver`].
pub use resolver::ResponseResolver;
/// Re-exports of the time strategies.
pub use time::{CompressedTime, RealTime, TimeMode, TimeProvider, format_duration, time_provider};
