//! Engine notifications and their per-engine broadcast.

use std::sync::{Mutex, PoisonError};

use murmur_core::{ActivityStatus, Ending, Message};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// A choice as presented to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferedChoice {
    /// Choice id, passed back to `make_choice`.
    pub id: String,
    /// Text shown to the player.
    pub text: String,
}

/// Something a presentation layer may want to render.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The full transcript after a change.
    MessagesUpdated(Vec<Message>),
    /// The currently selectable choices; empty clears the list.
    ChoicesAvailable(Vec<OfferedChoice>),
    /// The story reached an ending.
    GameOver(Ending),
    /// The character started typing.
    TypingStarted,
    /// The character stopped typing.
    TypingEnded,
    /// The status line changed.
    StatusChanged {
        /// New activity status.
        status: ActivityStatus,
        /// Text for the status line.
        text: String,
    },
}

/// Fan-out of [`EngineEvent`]s to every live subscriber.
///
/// Subscribers whose receiver has been dropped are pruned on the next emit.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<UnboundedSender<EngineEvent>>>,
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. It receives every event emitted from now on.
    pub fn subscribe(&self) -> UnboundedReceiver<EngineEvent> {
        let (tx, rx) = unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Deliver an event to every subscriber.
    pub fn emit(&self, event: EngineEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
