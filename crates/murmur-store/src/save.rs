//! Save slots: play-state snapshot, transcript, and export bundles.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use murmur_core::{Message, PlayState};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::store::KeyValueStore;

/// Portable snapshot of one save slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBundle {
    /// Saved play state, if any.
    pub game_state: Option<PlayState>,
    /// Saved transcript, if any.
    pub messages: Option<Vec<Message>>,
    /// When the bundle was produced.
    pub export_date: DateTime<Utc>,
}

/// Reads and writes the records of one save slot.
#[derive(Clone)]
pub struct SaveManager {
    store: Arc<dyn KeyValueStore>,
    slot: String,
}

impl SaveManager {
    /// Manage the `"default"` slot of `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            slot: "default".to_string(),
        }
    }

    /// Use a different slot name.
    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }

    /// Active slot name.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// The underlying store, shared with settings.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    fn state_key(&self) -> String {
        format!("{}.game_state", self.slot)
    }

    fn messages_key(&self) -> String {
        format!("{}.messages", self.slot)
    }

    /// Overwrite the saved play state.
    pub fn save_state(&self, state: &PlayState) -> StoreResult<()> {
        let json = serde_json::to_string(state)?;
        self.store.set(&self.state_key(), &json)
    }

    /// Read the saved play state. `Ok(None)` when nothing was saved.
    pub fn load_state(&self) -> StoreResult<Option<PlayState>> {
        match self.store.get(&self.state_key())? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Overwrite the saved transcript.
    pub fn save_messages(&self, messages: &[Message]) -> StoreResult<()> {
        let json = serde_json::to_string(messages)?;
        self.store.set(&self.messages_key(), &json)
    }

    /// Read the saved transcript. `Ok(None)` when nothing was saved.
    pub fn load_messages(&self) -> StoreResult<Option<Vec<Message>>> {
        match self.store.get(&self.messages_key())? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Whether a play state exists in this slot.
    pub fn has_save(&self) -> StoreResult<bool> {
        Ok(self.store.get(&self.state_key())?.is_some())
    }

    /// Delete both records of this slot.
    pub fn clear(&self) -> StoreResult<()> {
        self.store.remove(&self.state_key())?;
        self.store.remove(&self.messages_key())?;
        debug!(slot = %self.slot, "save cleared");
        Ok(())
    }

    /// Serialize both records into a JSON bundle.
    pub fn export_bundle(&self) -> StoreResult<String> {
        let bundle = SaveBundle {
            game_state: self.load_state()?,
            messages: self.load_messages()?,
            export_date: Utc::now(),
        };
        Ok(serde_json::to_string_pretty(&bundle)?)
    }

    /// Replace both records with the contents of a bundle.
    ///
    /// The bundle is parsed completely before anything is written; a
    /// malformed bundle leaves the slot untouched. Missing sections remove
    /// the corresponding record.
    pub fn import_bundle(&self, json: &str) -> StoreResult<()> {
        let bundle: SaveBundle = serde_json::from_str(json)?;
        let previous_state = self.store.get(&self.state_key())?;

        match &bundle.game_state {
            Some(state) => self.save_state(state)?,
            None => self.store.remove(&self.state_key())?,
        }

        let written = match &bundle.messages {
            Some(messages) => self.save_messages(messages),
            None => self.store.remove(&self.messages_key()),
        };

        if let Err(e) = written {
            warn!(slot = %self.slot, error = %e, "import failed, restoring previous state");
            let restored = match previous_state {
                Some(json) => self.store.set(&self.state_key(), &json),
                None => self.store.remove(&self.state_key()),
            };
            if let Err(restore) = restored {
                warn!(slot = %self.slot, error = %restore, "could not restore previous state");
            }
            return Err(e);
        }

        debug!(slot = %self.slot, exported = %bundle.export_date, "save imported");
        Ok(())
    }
}

impl std::fmt::Debug for SaveManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveManager")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}
