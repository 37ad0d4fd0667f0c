//! Story nodes and the choices that connect them.

use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::effect::Effect;
use crate::message::Speaker;
use crate::state::PlayState;

/// One authored narrative beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryNode {
    /// Unique identifier for this node.
    pub id: String,
    /// Who speaks the primary text.
    pub speaker: Speaker,
    /// The primary text.
    pub text: String,
    /// Pause before the first line, shown as "typing".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_delay_ms: Option<u64>,
    /// Lines sent after the primary text, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub followups: Vec<Followup>,
    /// Player choices leaving this node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    /// Simulated time the speaker is unavailable after this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_time_ms: Option<u64>,
    /// Flavor line shown while the speaker is away.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_message: Option<String>,
    /// Effects applied once when the node becomes current.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_enter: Vec<Effect>,
    /// Instruction for an optional text generator to rewrite the primary text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_hint: Option<String>,
}

impl StoryNode {
    /// Create a node with the given id, speaker, and text.
    pub fn new(id: impl Into<String>, speaker: impl Into<Speaker>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            speaker: speaker.into(),
            text: text.into(),
            entry_delay_ms: None,
            followups: Vec::new(),
            choices: Vec::new(),
            wait_time_ms: None,
            activity_message: None,
            on_enter: Vec::new(),
            generation_hint: None,
        }
    }

    /// Set the entry delay.
    pub fn with_entry_delay(mut self, ms: u64) -> Self {
        self.entry_delay_ms = Some(ms);
        self
    }

    /// Add a followup line.
    pub fn with_followup(mut self, followup: Followup) -> Self {
        self.followups.push(followup);
        self
    }

    /// Add a choice.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Set the simulated wait after this node.
    pub fn with_wait(mut self, ms: u64) -> Self {
        self.wait_time_ms = Some(ms);
        self
    }

    /// Set the away flavor line.
    pub fn with_activity(mut self, message: impl Into<String>) -> Self {
        self.activity_message = Some(message.into());
        self
    }

    /// Add an on-enter effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.on_enter.push(effect);
        self
    }

    /// Set the generation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.generation_hint = Some(hint.into());
        self
    }

    /// Entry delay, if non-zero.
    pub fn entry_delay(&self) -> Option<u64> {
        self.entry_delay_ms.filter(|ms| *ms > 0)
    }

    /// Wait time, if non-zero.
    pub fn wait_time(&self) -> Option<u64> {
        self.wait_time_ms.filter(|ms| *ms > 0)
    }

    /// Choices whose guards pass for `state`, in authored order.
    pub fn available_choices(&self, state: &PlayState) -> Vec<&Choice> {
        self.choices
            .iter()
            .filter(|c| c.is_available(state))
            .collect()
    }

    /// Find a choice by id, ignoring guards.
    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

/// A line sent after a node's primary text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Followup {
    /// The line text.
    pub text: String,
    /// Pause before this line.
    #[serde(default)]
    pub delay_ms: u64,
    /// Speaker override; defaults to the node speaker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<Speaker>,
}

impl Followup {
    /// Create a followup line.
    pub fn new(text: impl Into<String>, delay_ms: u64) -> Self {
        Self {
            text: text.into(),
            delay_ms,
            speaker: None,
        }
    }

    /// Override the speaker.
    pub fn with_speaker(mut self, speaker: impl Into<Speaker>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }
}

/// A player-selectable transition to another node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Unique id within its node.
    pub id: String,
    /// The text shown to the player and echoed into the transcript.
    pub text: String,
    /// Node to continue with.
    pub target: String,
    /// Guard; the choice is hidden when it evaluates false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Effects applied when the choice is taken.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
}

impl Choice {
    /// Create a new choice.
    pub fn new(id: impl Into<String>, text: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            target: target.into(),
            condition: None,
            effects: Vec::new(),
        }
    }

    /// Set the guard.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Add an effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Whether the guard passes for `state`.
    pub fn is_available(&self, state: &PlayState) -> bool {
        self.condition.as_ref().is_none_or(|c| c.evaluate(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn node_builder() {
        let node = StoryNode::new("prologue_1", "system", "A typhoon is approaching...")
            .with_entry_delay(3500)
            .with_followup(Followup::new("Research Log: Day 37.", 3500).with_speaker("maya"))
            .with_choice(Choice::new("c1", "What is the research about?", "prologue_2"));

        assert_eq!(node.speaker, Speaker::System);
        assert_eq!(node.entry_delay(), Some(3500));
        assert_eq!(node.followups[0].speaker, Some(Speaker::from("maya")));
        assert_eq!(node.choices.len(), 1);
        assert_eq!(node.wait_time(), None);
    }

    #[test]
    fn zero_delays_are_treated_as_absent() {
        let node = StoryNode::new("a", "maya", "hi")
            .with_entry_delay(0)
            .with_wait(0);
        assert_eq!(node.entry_delay(), None);
        assert_eq!(node.wait_time(), None);
    }

    #[test]
    fn guarded_choices_are_filtered() {
        let node = StoryNode::new("lab", "maya", "What now?")
            .with_choice(Choice::new("stay", "Stay put.", "stay"))
            .with_choice(
                Choice::new("radio", "Use the radio.", "radio").with_condition(Condition::HasItem {
                    item: "radio".to_string(),
                }),
            );

        let mut state = PlayState::new("lab", Utc::now());
        let ids: Vec<_> = node
            .available_choices(&state)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["stay"]);

        state.add_item("radio");
        assert_eq!(node.available_choices(&state).len(), 2);
        assert!(node.choice("radio").is_some());
    }

    #[test]
    fn parses_minimal_json_node() {
        let node: StoryNode = serde_json::from_str(
            r#"{"id": "a", "speaker": "maya", "text": "hello",
                "choices": [{"id": "c", "text": "hi", "target": "b"}]}"#,
        )
        .unwrap();
        assert!(node.followups.is_empty());
        assert!(node.on_enter.is_empty());
        assert_eq!(node.choices[0].target, "b");
        assert!(node.choices[0].condition.is_none());
    }
}
