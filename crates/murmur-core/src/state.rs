//! Play state: the complete mutable progress snapshot of one save slot.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound for [`PlayState::health`].
pub const MAX_HEALTH: i32 = 100;

/// What the narrative character is doing, as shown on the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    /// Present in the conversation.
    #[default]
    Active,
    /// Composing a reply.
    Busy,
    /// Offline for a simulated wait.
    Away,
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Busy => write!(f, "busy"),
            Self::Away => write!(f, "away"),
        }
    }
}

/// How far the simulated wait of the current node has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitProgress {
    /// No wait has been announced for the current node.
    #[default]
    NotStarted,
    /// The "offline" line was sent and the character has not returned yet.
    Away,
    /// The character came back online.
    Done,
}

/// The player's progress through a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayState {
    /// Node currently being played or just completed.
    pub current_node_id: String,
    /// Item labels in the order they were picked up.
    pub inventory: Vec<String>,
    /// Affinity score per named entity.
    pub relationships: BTreeMap<String, i32>,
    /// Named boolean switches. Never removed once set.
    pub flags: BTreeMap<String, bool>,
    /// Free-text scene label.
    pub location: String,
    /// Vitality, kept within `0..=MAX_HEALTH`.
    pub health: i32,
    /// Wall-clock instant of the last state-changing player action.
    pub last_action_at: DateTime<Utc>,
    /// Nodes entered so far, in first-visit order.
    pub visited_nodes: Vec<String>,
    /// Status shown for the narrative character.
    pub activity_status: ActivityStatus,
    /// Whether every line of the current node has been emitted.
    #[serde(default)]
    pub messages_complete: bool,
    /// Target of a taken choice whose exit wait has not finished yet.
    #[serde(default)]
    pub pending_node_id: Option<String>,
    /// Ending already reached, if the story is over.
    #[serde(default)]
    pub ending_id: Option<String>,
    /// Progress of the wait after the current node.
    #[serde(default)]
    pub wait_progress: WaitProgress,
}

impl PlayState {
    /// Create a fresh state positioned at `start_node`.
    pub fn new(start_node: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            current_node_id: start_node.into(),
            inventory: Vec::new(),
            relationships: BTreeMap::new(),
            flags: BTreeMap::new(),
            location: "unknown".to_string(),
            health: MAX_HEALTH,
            last_action_at: now,
            visited_nodes: Vec::new(),
            activity_status: ActivityStatus::Active,
            messages_complete: false,
            pending_node_id: None,
            ending_id: None,
            wait_progress: WaitProgress::NotStarted,
        }
    }

    /// Check whether a flag is set to `true`.
    pub fn flag(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    /// Set a flag value.
    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.flags.insert(key.into(), value);
    }

    /// Check if the inventory holds an item.
    pub fn has_item(&self, item: &str) -> bool {
        self.inventory.iter().any(|i| i == item)
    }

    /// Append an item to the inventory.
    pub fn add_item(&mut self, item: impl Into<String>) {
        let item = item.into();
        if !self.has_item(&item) {
            self.inventory.push(item);
        }
    }

    /// Affinity with an entity; unknown entities score 0.
    pub fn relationship(&self, entity: &str) -> i32 {
        self.relationships.get(entity).copied().unwrap_or(0)
    }

    /// Shift the affinity with an entity by `delta`.
    pub fn adjust_relationship(&mut self, entity: impl Into<String>, delta: i32) {
        let score = self.relationships.entry(entity.into()).or_insert(0);
        *score = score.saturating_add(delta);
    }

    /// Shift health by `delta`, clamped to `0..=MAX_HEALTH`.
    pub fn adjust_health(&mut self, delta: i32) {
        self.health = self.health.saturating_add(delta).clamp(0, MAX_HEALTH);
    }

    /// Record a node visit. Returns `false` if it was already visited.
    pub fn visit(&mut self, node_id: &str) -> bool {
        if self.has_visited(node_id) {
            return false;
        }
        self.visited_nodes.push(node_id.to_string());
        true
    }

    /// Check if a node has been entered before.
    pub fn has_visited(&self, node_id: &str) -> bool {
        self.visited_nodes.iter().any(|n| n == node_id)
    }

    /// Whether the story has reached an ending.
    pub fn is_over(&self) -> bool {
        self.ending_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> PlayState {
        PlayState::new("intro", Utc::now())
    }

    #[test]
    fn play_state_new() {
        let state = fresh();
        assert_eq!(state.current_node_id, "intro");
        assert_eq!(state.health, MAX_HEALTH);
        assert_eq!(state.location, "unknown");
        assert_eq!(state.activity_status, ActivityStatus::Active);
        assert!(state.inventory.is_empty());
        assert!(!state.messages_complete);
        assert!(!state.is_over());
    }

    #[test]
    fn inventory_is_append_only_without_duplicates() {
        let mut state = fresh();
        state.add_item("radio");
        state.add_item("flashlight");
        state.add_item("radio");
        assert_eq!(state.inventory, vec!["radio", "flashlight"]);
        assert!(state.has_item("radio"));
        assert!(!state.has_item("rope"));
    }

    #[test]
    fn health_is_clamped() {
        let mut state = fresh();
        state.adjust_health(-70);
        assert_eq!(state.health, 30);
        state.adjust_health(-50);
        assert_eq!(state.health, 0);
        state.adjust_health(500);
        assert_eq!(state.health, MAX_HEALTH);
    }

    #[test]
    fn visits_keep_first_order() {
        let mut state = fresh();
        assert!(state.visit("a"));
        assert!(state.visit("b"));
        assert!(!state.visit("a"));
        assert_eq!(state.visited_nodes, vec!["a", "b"]);
    }

    #[test]
    fn relationships_default_to_zero() {
        let mut state = fresh();
        assert_eq!(state.relationship("solon"), 0);
        state.adjust_relationship("solon", 3);
        state.adjust_relationship("solon", -1);
        assert_eq!(state.relationship("solon"), 2);
    }

    #[test]
    fn old_saves_without_new_fields_still_load() {
        let json = r#"{
            "current_node_id": "intro",
            "inventory": [],
            "relationships": {},
            "flags": {"isInjured": true},
            "location": "lab",
            "health": 80,
            "last_action_at": "2024-05-01T10:00:00Z",
            "visited_nodes": ["intro"],
            "activity_status": "away"
        }"#;
        let state: PlayState = serde_json::from_str(json).unwrap();
        assert!(state.flag("isInjured"));
        assert!(!state.messages_complete);
        assert_eq!(state.pending_node_id, None);
        assert_eq!(state.wait_progress, WaitProgress::NotStarted);
        assert_eq!(state.activity_status, ActivityStatus::Away);
    }
}
