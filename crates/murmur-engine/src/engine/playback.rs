//! Node display, pacing, waits, and ending resolution.

use std::sync::{Arc, PoisonError};

use murmur_core::{ActivityStatus, Effect, Ending, Message, Speaker, StoryNode, WaitProgress};
use rand::Rng;
use tracing::{debug, error, info, warn};

use super::{Phase, Session, StoryEngine, offer_list};
use crate::chunk::{split_into_chunks, typing_delay};
use crate::error::{EngineError, EngineResult};
use crate::event::{EngineEvent, OfferedChoice};

/// How a node is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Entry {
    /// First arrival: entry effects apply and the visit is recorded.
    Enter,
    /// Replaying an interrupted node whose entry was already checkpointed.
    Replay,
}

/// Status line while the character is away for `ms`.
fn away_text(name: &str, ms: u64) -> String {
    match ms / 60_000 {
        0 => format!("{name} is away"),
        1 => format!("{name} is away (1 minute)"),
        minutes => format!("{name} is away ({minutes} minutes)"),
    }
}

impl StoryEngine {
    /// Show a node from its first line, then offer its choices, wait, or end.
    pub(super) async fn display_node(
        &self,
        node_id: &str,
        epoch: u64,
        entry: Entry,
    ) -> EngineResult<()> {
        let graph = Arc::clone(&self.graph);
        let Some(node) = graph.node(node_id) else {
            error!(node = %node_id, "story references a node that does not exist");
            self.live(epoch, |s| s.phase = Phase::Idle);
            return Err(EngineError::NodeNotFound(node_id.to_string()));
        };
        debug!(node = %node.id, ?entry, "displaying node");

        let Some(state) = self.live(epoch, |s| {
            s.state.current_node_id = node.id.clone();
            s.state.messages_complete = false;
            s.state.pending_node_id = None;
            s.state.wait_progress = WaitProgress::NotStarted;
            if entry == Entry::Enter {
                Effect::apply_all(&node.on_enter, &mut s.state);
                s.state.visit(&node.id);
            }
            s.offered.clear();
            s.phase = Phase::EmittingPrimary;
            self.persist(s);
            self.events
                .emit(EngineEvent::ChoicesAvailable(Vec::new()));
            s.state.clone()
        }) else {
            return Ok(());
        };

        let name = graph.protagonist();
        let mut busy = false;
        if let Some(delay) = node.entry_delay() {
            busy = true;
            self.set_status(epoch, ActivityStatus::Busy, format!("{name} is typing..."));
            self.time.delay(delay).await;
            if self.is_stale(epoch) {
                return Ok(());
            }
        }

        let text = match (&self.resolver, &node.generation_hint) {
            (Some(resolver), Some(hint)) => resolver.substitute(hint, &node.text, &state).await,
            _ => node.text.clone(),
        };
        if !self.emit_line(&node.speaker, &text, epoch).await {
            return Ok(());
        }

        if !node.followups.is_empty()
            && self
                .live(epoch, |s| s.phase = Phase::EmittingFollowups)
                .is_none()
        {
            return Ok(());
        }
        for followup in &node.followups {
            if followup.delay_ms > 0 {
                self.time.delay(followup.delay_ms).await;
            }
            let speaker = followup.speaker.as_ref().unwrap_or(&node.speaker);
            if !self.emit_line(speaker, &followup.text, epoch).await {
                return Ok(());
            }
        }

        let finished = self.live(epoch, |s| {
            s.state.messages_complete = true;
            s.state.activity_status = ActivityStatus::Active;
            self.persist(s);
        });
        if finished.is_none() {
            return Ok(());
        }
        if busy {
            self.set_status(epoch, ActivityStatus::Active, format!("{name} is active"));
        }

        self.settle_node(node, epoch, false).await;
        Ok(())
    }

    /// Finish leaving `from` for `to`: run the exit wait, then show `to`.
    pub(super) async fn finish_transition(
        &self,
        from: &str,
        to: &str,
        epoch: u64,
    ) -> EngineResult<()> {
        let graph = Arc::clone(&self.graph);
        let exit_wait = graph
            .node(from)
            .and_then(|left| left.wait_time().map(|wait| (left, wait)));
        if let Some((left, wait)) = exit_wait {
            if !self.run_wait(left, wait, epoch).await {
                return Ok(());
            }
        }
        self.display_node(to, epoch, Entry::Enter).await
    }

    /// Offer the node's available choices; otherwise wait and/or end.
    ///
    /// On resume the node's text was already emitted; a wait that already
    /// finished is not repeated, and one cut short picks up where it was.
    pub(super) async fn settle_node(&self, node: &StoryNode, epoch: u64, resuming: bool) {
        let Some((offered, progress)) =
            self.live(epoch, |s| (offer_list(node, &s.state), s.state.wait_progress))
        else {
            return;
        };
        if !offered.is_empty() {
            self.offer(epoch, offered);
            return;
        }
        let wait = if resuming && progress == WaitProgress::Done {
            None
        } else {
            node.wait_time()
        };
        if let Some(wait) = wait {
            if !self.run_wait(node, wait, epoch).await {
                return;
            }
        }
        self.check_for_ending(epoch);
    }

    /// Present choices and wait for the player.
    pub(super) fn offer(&self, epoch: u64, offered: Vec<OfferedChoice>) {
        self.live(epoch, |s| {
            s.offered = offered.clone();
            s.phase = Phase::AwaitingChoice;
            self.events.emit(EngineEvent::ChoicesAvailable(offered));
        });
    }

    /// Emit one authored line as one or more paced messages.
    ///
    /// Returns `false` if a reset interrupted the line.
    async fn emit_line(&self, speaker: &Speaker, text: &str, epoch: u64) -> bool {
        let chunks = split_into_chunks(text, self.config.max_message_length);
        let last = chunks.len().saturating_sub(1);

        for (idx, chunk) in chunks.into_iter().enumerate() {
            if self
                .live(epoch, |_| self.events.emit(EngineEvent::TypingStarted))
                .is_none()
            {
                return false;
            }
            self.time.delay(typing_delay(&chunk, &self.config)).await;

            let now = self.time.now();
            let sent = self.live(epoch, |s| {
                self.events.emit(EngineEvent::TypingEnded);
                s.messages.push(Message::spoken(speaker.clone(), chunk, now));
                self.notify_messages(s);
                self.persist(s);
            });
            if sent.is_none() {
                return false;
            }

            if idx < last {
                self.time.delay(self.chunk_pause()).await;
            }
        }
        !self.is_stale(epoch)
    }

    /// Simulate the character being offline for `wait` ms.
    ///
    /// If at least `wait` ms already passed since the last player action the
    /// offline period is reported as over with no further delay. A wait that
    /// was already announced before a restart only sleeps for what is left.
    /// Returns `false` if a reset interrupted the wait.
    async fn run_wait(&self, node: &StoryNode, wait: u64, epoch: u64) -> bool {
        let name = self.graph.protagonist();
        let Some((elapsed, announced)) = self.live(epoch, |s| {
            s.phase = Phase::Waiting;
            (
                self.time.elapsed_since(s.state.last_action_at),
                s.state.wait_progress == WaitProgress::Away,
            )
        }) else {
            return false;
        };

        if elapsed >= wait {
            debug!(node = %node.id, elapsed, wait, announced, "wait already elapsed");
            return self
                .live(epoch, |s| {
                    if !announced {
                        s.messages.push(Message::system(format!("{name} was offline.")));
                    }
                    self.back_online(s, name, announced);
                })
                .is_some();
        }

        let remaining = wait - elapsed;
        debug!(node = %node.id, remaining, announced, "character going offline");
        let away = self.live(epoch, |s| {
            s.state.activity_status = ActivityStatus::Away;
            self.events.emit(EngineEvent::StatusChanged {
                status: ActivityStatus::Away,
                text: away_text(name, remaining),
            });
            if !announced {
                s.messages.push(Message::system(format!("{name} is offline.")));
                if let Some(activity) = &node.activity_message {
                    s.messages.push(Message::system(activity.as_str()));
                }
                s.state.wait_progress = WaitProgress::Away;
                self.notify_messages(s);
            }
            self.persist(s);
        });
        if away.is_none() {
            return false;
        }

        self.time.delay(remaining).await;

        self.live(epoch, |s| self.back_online(s, name, true)).is_some()
    }

    /// Close a wait with the "online" line.
    fn back_online(&self, s: &mut Session, name: &str, was_away: bool) {
        s.messages.push(Message::system(format!("{name} is online.")));
        s.state.activity_status = ActivityStatus::Active;
        s.state.wait_progress = WaitProgress::Done;
        self.notify_messages(s);
        self.persist(s);
        if was_away {
            self.events.emit(EngineEvent::StatusChanged {
                status: ActivityStatus::Active,
                text: format!("{name} is active"),
            });
        }
    }

    /// Select the first ending whose condition holds, if any.
    fn check_for_ending(&self, epoch: u64) {
        self.live(epoch, |s| {
            let Some(ending) = Ending::first_match(self.graph.endings(), &s.state) else {
                warn!(node = %s.state.current_node_id, "no choices and no ending matches; playback stalled");
                s.phase = Phase::Idle;
                return;
            };
            info!(ending = %ending.id, category = %ending.category, "ending reached");
            s.offered.clear();
            self.events
                .emit(EngineEvent::ChoicesAvailable(Vec::new()));
            s.messages.push(Message::system(ending.marker()));
            s.state.ending_id = Some(ending.id.clone());
            s.phase = Phase::Ended;
            self.notify_messages(s);
            self.persist(s);
            self.events.emit(EngineEvent::GameOver(ending.clone()));
        });
    }

    fn set_status(&self, epoch: u64, status: ActivityStatus, text: String) {
        self.live(epoch, |s| {
            s.state.activity_status = status;
            self.events.emit(EngineEvent::StatusChanged { status, text });
        });
    }

    fn chunk_pause(&self) -> u64 {
        let jitter = self.config.chunk_pause_jitter_ms;
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.config.chunk_pause_ms + rng.random_range(0..=jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn away_text_counts_whole_minutes() {
        assert_eq!(away_text("Maya", 30_000), "Maya is away");
        assert_eq!(away_text("Maya", 90_000), "Maya is away (1 minute)");
        assert_eq!(away_text("Maya", 600_000), "Maya is away (10 minutes)");
    }
}
