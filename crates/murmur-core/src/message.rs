//! Chat transcript messages.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who a message is attributed to.
///
/// Serialized as a plain string: `"system"`, `"player"`, or the character id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Speaker {
    /// Narration, ambient lines, and engine notices.
    System,
    /// The person playing.
    Player,
    /// An authored character, by id.
    Character(String),
}

impl Speaker {
    /// Whether this is the reserved system speaker.
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }

    /// The id string this speaker serializes to.
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::Player => "player",
            Self::Character(id) => id,
        }
    }
}

impl From<String> for Speaker {
    fn from(value: String) -> Self {
        match value.as_str() {
            "system" => Self::System,
            "player" => Self::Player,
            _ => Self::Character(value),
        }
    }
}

impl From<&str> for Speaker {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Speaker> for String {
    fn from(value: Speaker) -> Self {
        match value {
            Speaker::Character(id) => id,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line in the chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id.
    pub id: Uuid,
    /// The rendered text.
    pub text: String,
    /// Who said it.
    pub speaker: Speaker,
    /// When it was sent; `None` for system and ambient lines.
    pub timestamp: Option<DateTime<Utc>>,
    /// Whether the player authored it.
    pub is_player: bool,
    /// Whether the timestamp should be displayed.
    pub show_timestamp: bool,
}

impl Message {
    /// A line spoken by `speaker`. System speakers get no timestamp.
    pub fn spoken(speaker: Speaker, text: impl Into<String>, at: DateTime<Utc>) -> Self {
        if speaker.is_system() {
            return Self::system(text);
        }
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            speaker,
            timestamp: Some(at),
            is_player: false,
            show_timestamp: true,
        }
    }

    /// A system line without a timestamp.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            speaker: Speaker::System,
            timestamp: None,
            is_player: false,
            show_timestamp: false,
        }
    }

    /// A line written by the player.
    pub fn player(text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            speaker: Speaker::Player,
            timestamp: Some(at),
            is_player: true,
            show_timestamp: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speaker_string_round_trip() {
        assert_eq!(Speaker::from("system"), Speaker::System);
        assert_eq!(Speaker::from("player"), Speaker::Player);
        assert_eq!(Speaker::from("maya"), Speaker::Character("maya".into()));
        assert_eq!(String::from(Speaker::Character("maya".into())), "maya");
    }

    #[test]
    fn speaker_serializes_as_plain_string() {
        let json = serde_json::to_string(&Speaker::Character("maya".into())).unwrap();
        assert_eq!(json, "\"maya\"");
        let back: Speaker = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(back, Speaker::System);
    }

    #[test]
    fn system_lines_hide_timestamps() {
        let msg = Message::spoken(Speaker::System, "Two days before the typhoon...", Utc::now());
        assert!(msg.timestamp.is_none());
        assert!(!msg.show_timestamp);
        assert!(!msg.is_player);
    }

    #[test]
    fn character_and_player_lines() {
        let now = Utc::now();
        let line = Message::spoken("maya".into(), "Hello?", now);
        assert_eq!(line.timestamp, Some(now));
        assert!(line.show_timestamp);

        let reply = Message::player("I'm here.", now);
        assert!(reply.is_player);
        assert_eq!(reply.speaker, Speaker::Player);
        assert_ne!(line.id, reply.id);
    }
}
