//! State transforms applied on node entry or when a choice is taken.

use serde::{Deserialize, Serialize};

use crate::state::PlayState;

/// A single state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Effect {
    /// Set a flag.
    SetFlag {
        /// Flag key.
        flag: String,
        /// Value to set.
        #[serde(default = "default_flag_value")]
        value: bool,
    },
    /// Append an item to the inventory.
    AddItem {
        /// Item label.
        item: String,
    },
    /// Shift health by a signed amount.
    AdjustHealth {
        /// Amount to add (negative to subtract).
        delta: i32,
    },
    /// Move to a new scene label.
    SetLocation {
        /// Location label.
        location: String,
    },
    /// Shift affinity with an entity.
    AdjustRelationship {
        /// Entity name.
        entity: String,
        /// Amount to add (negative to subtract).
        delta: i32,
    },
}

fn default_flag_value() -> bool {
    true
}

impl Effect {
    /// Apply this effect to the state.
    pub fn apply(&self, state: &mut PlayState) {
        match self {
            Effect::SetFlag { flag, value } => state.set_flag(flag.clone(), *value),
            Effect::AddItem { item } => state.add_item(item.clone()),
            Effect::AdjustHealth { delta } => state.adjust_health(*delta),
            Effect::SetLocation { location } => state.location = location.clone(),
            Effect::AdjustRelationship { entity, delta } => {
                state.adjust_relationship(entity.clone(), *delta)
            }
        }
    }

    /// Apply a list of effects in authored order.
    pub fn apply_all(effects: &[Effect], state: &mut PlayState) {
        for effect in effects {
            effect.apply(state);
        }
    }
}
