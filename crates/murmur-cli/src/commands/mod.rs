pub mod check;
pub mod export;
pub mod import;
pub mod play;
pub mod reset;
pub mod settings;
pub mod status;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use murmur_core::StoryGraph;
use murmur_store::{FileStore, KeyValueStore, SaveManager, Settings};

/// Save directory and slot selected on the command line.
pub struct SaveTarget {
    dir: PathBuf,
    slot: String,
}

impl SaveTarget {
    pub fn new(dir: &Path, slot: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            slot: slot.to_string(),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(FileStore::new(&self.dir))
    }

    /// Save manager for the selected slot.
    pub fn manager(&self) -> SaveManager {
        SaveManager::new(self.store()).with_slot(self.slot.clone())
    }

    /// Settings stored alongside the saves.
    pub fn settings(&self) -> Result<Settings, String> {
        Settings::load(self.store().as_ref()).map_err(|e| format!("failed to read settings: {e}"))
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), String> {
        settings
            .save(self.store().as_ref())
            .map_err(|e| format!("failed to write settings: {e}"))
    }
}

/// Read and parse a story file.
fn load_story(path: &Path) -> Result<StoryGraph, String> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    StoryGraph::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
}
