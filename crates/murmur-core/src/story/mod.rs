//! Authored story data.
//!
//! Everything here is read-only at runtime. Conditions and effects are
//! declarative so the engine can interpret them against a [`PlayState`].
//!
//! [`PlayState`]: crate::state::PlayState

mod condition;
mod effect;
mod ending;
mod graph;
mod node;

pub use condition::Condition;
pub use effect::Effect;
pub use ending::{Ending, EndingCategory};
pub use graph::StoryGraph;
pub use node::{Choice, Followup, StoryNode};
