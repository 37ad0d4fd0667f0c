//! Pacing and chunking configuration for a playback session.

/// Configuration for a [`crate::StoryEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Longest chunk, in characters, emitted as a single message.
    pub max_message_length: usize,
    /// Simulated typing time per character.
    pub typing_ms_per_char: u64,
    /// Shortest typing pause for a chunk.
    pub min_typing_ms: u64,
    /// Longest typing pause for a chunk.
    pub max_typing_ms: u64,
    /// Fixed part of the pause between chunks of one line.
    pub chunk_pause_ms: u64,
    /// Upper bound of the random part of the pause between chunks.
    pub chunk_pause_jitter_ms: u64,
    /// Typing pause before the "no match" reply to free text.
    pub fallback_typing_ms: u64,
    /// Pause after a reset before the first node is displayed.
    pub reset_settle_ms: u64,
    /// RNG seed for pause jitter.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_message_length: 180,
            typing_ms_per_char: 35,
            min_typing_ms: 1000,
            max_typing_ms: 5000,
            chunk_pause_ms: 500,
            chunk_pause_jitter_ms: 500,
            fallback_typing_ms: 800,
            reset_settle_ms: 100,
            seed: 42,
        }
    }
}

impl EngineConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the chunk length cap (at least 1).
    pub fn with_max_message_length(mut self, len: usize) -> Self {
        self.max_message_length = len.max(1);
        self
    }

    /// Set the typing model. A `min_ms` above `max_ms` is lowered to `max_ms`.
    pub fn with_typing(mut self, per_char_ms: u64, min_ms: u64, max_ms: u64) -> Self {
        self.typing_ms_per_char = per_char_ms;
        self.max_typing_ms = max_ms;
        self.min_typing_ms = min_ms.min(max_ms);
        self
    }

    /// Set the inter-chunk pause and its jitter.
    pub fn with_chunk_pause(mut self, pause_ms: u64, jitter_ms: u64) -> Self {
        self.chunk_pause_ms = pause_ms;
        self.chunk_pause_jitter_ms = jitter_ms;
        self
    }

    /// Set the pause before the first node after a reset.
    pub fn with_reset_settle(mut self, ms: u64) -> Self {
        self.reset_settle_ms = ms;
        self
    }
}
