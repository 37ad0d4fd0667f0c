//! The playback engine handle and its player-facing operations.

mod playback;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use murmur_core::{Effect, Message, PlayState, StoryGraph, WaitProgress};
use murmur_store::SaveManager;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::event::{EngineEvent, EventBus, OfferedChoice};
use crate::resolver::ResponseResolver;
use crate::time::TimeProvider;

use playback::Entry;

/// Shown when free text arrives and no resolver is configured.
pub(crate) const NO_RESOLVER_TEXT: &str = "To process custom responses, please enable AI integration in the settings and configure an API key.";
/// In-character reply when free text matches no offered choice.
pub(crate) const NO_MATCH_TEXT: &str =
    "I'm not sure how to respond to that. Could you try another approach?";
/// In-character reply when the resolver fails.
pub(crate) const RESOLVER_FAILED_TEXT: &str =
    "I'm having trouble understanding. Please choose from the available options.";

/// Where the playback state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing in progress.
    Idle,
    /// Emitting the node's primary text.
    EmittingPrimary,
    /// Emitting the node's followup lines.
    EmittingFollowups,
    /// Choices are on offer.
    AwaitingChoice,
    /// The narrative character is away.
    Waiting,
    /// An ending was reached.
    Ended,
}

/// Everything mutable about one session, behind a single lock.
#[derive(Debug)]
struct Session {
    state: PlayState,
    messages: Vec<Message>,
    offered: Vec<OfferedChoice>,
    phase: Phase,
}

/// Plays a story graph as a paced chat.
///
/// Every operation is cooperative: suspension only happens inside the
/// [`TimeProvider`], and a reset invalidates any operation still in flight
/// so it can never write stale messages.
pub struct StoryEngine {
    graph: Arc<StoryGraph>,
    config: EngineConfig,
    saves: SaveManager,
    time: Arc<dyn TimeProvider>,
    resolver: Option<ResponseResolver>,
    events: EventBus,
    session: Mutex<Session>,
    resetting: AtomicBool,
    epoch: AtomicU64,
    rng: Mutex<StdRng>,
}

impl StoryEngine {
    /// Create an engine positioned at the story's start node.
    ///
    /// Nothing is loaded or emitted until [`StoryEngine::start`].
    pub fn new(
        graph: Arc<StoryGraph>,
        saves: SaveManager,
        time: Arc<dyn TimeProvider>,
        config: EngineConfig,
    ) -> Self {
        let state = PlayState::new(graph.start_id(), time.now());
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            graph,
            config,
            saves,
            time,
            resolver: None,
            events: EventBus::new(),
            session: Mutex::new(Session {
                state,
                messages: Vec::new(),
                offered: Vec::new(),
                phase: Phase::Idle,
            }),
            resetting: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            rng: Mutex::new(rng),
        }
    }

    /// Resolve free text and substitute generated lines through `resolver`.
    pub fn with_resolver(mut self, resolver: ResponseResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> tokio::sync::mpsc::UnboundedReceiver<EngineEvent> {
        self.events.subscribe()
    }

    /// The story being played.
    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    /// Id of the node currently being played or just completed.
    pub fn current_node_id(&self) -> String {
        self.lock().state.current_node_id.clone()
    }

    /// Current state-machine phase.
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Snapshot of the play state.
    pub fn state(&self) -> PlayState {
        self.lock().state.clone()
    }

    /// Snapshot of the transcript.
    pub fn transcript(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    /// Choices currently on offer.
    pub fn offered_choices(&self) -> Vec<OfferedChoice> {
        self.lock().offered.clone()
    }

    /// Whether a reset is in progress.
    pub fn is_resetting(&self) -> bool {
        self.resetting.load(Ordering::SeqCst)
    }

    /// Resume the saved game, or begin a new one.
    ///
    /// A save whose node was fully emitted is trusted as is: choices or the
    /// ending are re-presented without new messages, and an unfinished wait
    /// continues for whatever time is left. A save interrupted
    /// mid-node is truncated to the last player message and the node is
    /// played again from its first line.
    pub async fn start(&self) -> EngineResult<()> {
        if self.is_resetting() {
            debug!("start ignored while resetting");
            return Ok(());
        }
        let epoch = self.epoch.load(Ordering::SeqCst);

        let saved = self.saves.load_state().unwrap_or_else(|e| {
            warn!(error = %e, "could not read saved state, starting fresh");
            None
        });

        let Some(mut state) = saved else {
            info!(story = %self.graph.title(), "starting new game");
            let start = self.graph.start_id().to_string();
            let now = self.time.now();
            self.live(epoch, |s| {
                s.state = PlayState::new(start.as_str(), now);
                s.messages.clear();
                s.offered.clear();
                s.phase = Phase::Idle;
            });
            return self.display_node(&start, epoch, Entry::Enter).await;
        };

        let mut messages = self
            .saves
            .load_messages()
            .unwrap_or_else(|e| {
                warn!(error = %e, "could not read saved transcript");
                None
            })
            .unwrap_or_default();
        let complete = state.messages_complete;
        if !complete {
            truncate_to_last_player(&mut messages);
            state.wait_progress = WaitProgress::NotStarted;
        }
        info!(
            node = %state.current_node_id,
            complete,
            messages = messages.len(),
            "resuming saved game"
        );

        let Some(state) = self.live(epoch, |s| {
            s.state = state;
            s.messages = messages;
            s.offered.clear();
            s.phase = Phase::Idle;
            self.notify_messages(s);
            s.state.clone()
        }) else {
            return Ok(());
        };

        let graph = Arc::clone(&self.graph);
        if !complete {
            return match state.pending_node_id {
                Some(target) => {
                    self.finish_transition(&state.current_node_id, &target, epoch)
                        .await
                }
                None => {
                    self.display_node(&state.current_node_id, epoch, Entry::Replay)
                        .await
                }
            };
        }

        if let Some(ending) = state.ending_id.as_deref().and_then(|id| graph.ending(id)) {
            self.live(epoch, |s| {
                s.phase = Phase::Ended;
                self.events.emit(EngineEvent::GameOver(ending.clone()));
            });
            return Ok(());
        }

        let Some(node) = graph.node(&state.current_node_id) else {
            error!(node = %state.current_node_id, "saved state names a node that does not exist");
            return Err(EngineError::NodeNotFound(state.current_node_id));
        };
        self.settle_node(node, epoch, true).await;
        Ok(())
    }

    /// Take one of the offered choices.
    ///
    /// Unknown or unavailable ids, and calls while no choices are on offer,
    /// are ignored.
    pub async fn make_choice(&self, choice_id: &str) -> EngineResult<()> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let taken = self.live(epoch, |s| self.take_choice(s, choice_id));
        match taken {
            Some(Ok(Some((from, to)))) => self.finish_transition(&from, &to, epoch).await,
            Some(Err(e)) => Err(e),
            _ => Ok(()),
        }
    }

    /// Answer with free text instead of a listed choice.
    pub async fn submit_custom_response(&self, text: &str) -> EngineResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        let epoch = self.epoch.load(Ordering::SeqCst);
        let graph = Arc::clone(&self.graph);

        let context = self.live(epoch, |s| {
            if s.phase != Phase::AwaitingChoice {
                debug!(phase = ?s.phase, "ignoring free text outside a choice");
                return None;
            }
            let node = graph.node(&s.state.current_node_id)?;
            let offered = offer_list(node, &s.state);
            s.offered.clear();
            self.events.emit(EngineEvent::ChoicesAvailable(Vec::new()));
            s.messages.push(Message::player(text, self.time.now()));
            s.phase = Phase::Idle;
            self.notify_messages(s);
            self.persist(s);
            Some((offered, s.state.clone(), node.speaker.clone()))
        });
        let Some((offered, state, speaker)) = context.flatten() else {
            return Ok(());
        };

        let Some(resolver) = &self.resolver else {
            self.live(epoch, |s| {
                s.messages.push(Message::system(NO_RESOLVER_TEXT));
                self.notify_messages(s);
                self.persist(s);
            });
            self.offer(epoch, offered);
            return Ok(());
        };

        match resolver.resolve(text, &offered, &state).await {
            Ok(Some(choice_id)) => {
                let taken = self.live(epoch, |s| {
                    s.phase = Phase::AwaitingChoice;
                    self.take_choice(s, &choice_id)
                });
                match taken {
                    Some(Ok(Some((from, to)))) => self.finish_transition(&from, &to, epoch).await,
                    Some(Err(e)) => Err(e),
                    _ => Ok(()),
                }
            }
            Ok(None) => {
                if self.live(epoch, |_| self.events.emit(EngineEvent::TypingStarted)).is_none() {
                    return Ok(());
                }
                self.time.delay(self.config.fallback_typing_ms).await;
                let now = self.time.now();
                self.live(epoch, |s| {
                    self.events.emit(EngineEvent::TypingEnded);
                    s.messages.push(Message::spoken(speaker, NO_MATCH_TEXT, now));
                    self.notify_messages(s);
                    self.persist(s);
                });
                self.offer(epoch, offered);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "response resolution failed");
                let now = self.time.now();
                self.live(epoch, |s| {
                    s.messages.push(Message::spoken(speaker, RESOLVER_FAILED_TEXT, now));
                    self.notify_messages(s);
                    self.persist(s);
                });
                self.offer(epoch, offered);
                Ok(())
            }
        }
    }

    /// Wipe the save and play the story again from its first node.
    ///
    /// Operations still in flight observe the reset and stop emitting.
    pub async fn reset_game(&self) -> EngineResult<()> {
        let epoch = {
            let mut s = self.lock();
            self.resetting.store(true, Ordering::SeqCst);
            let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

            s.offered.clear();
            self.events.emit(EngineEvent::ChoicesAvailable(Vec::new()));
            if let Err(e) = self.saves.clear() {
                warn!(error = %e, "could not clear save");
            }
            s.state = PlayState::new(self.graph.start_id(), self.time.now());
            s.messages.clear();
            s.phase = Phase::Idle;
            self.notify_messages(&s);
            epoch
        };
        info!(story = %self.graph.title(), "game reset");

        tokio::time::sleep(Duration::from_millis(self.config.reset_settle_ms)).await;

        if self.epoch.load(Ordering::SeqCst) != epoch {
            return Ok(());
        }
        self.resetting.store(false, Ordering::SeqCst);
        let start = self.graph.start_id().to_string();
        self.display_node(&start, epoch, Entry::Enter).await
    }

    /// Validate and record a choice. Returns the node left and the target.
    fn take_choice(
        &self,
        s: &mut Session,
        choice_id: &str,
    ) -> EngineResult<Option<(String, String)>> {
        if s.phase != Phase::AwaitingChoice {
            debug!(choice = %choice_id, phase = ?s.phase, "ignoring choice outside a choice point");
            return Ok(None);
        }
        let Some(node) = self.graph.node(&s.state.current_node_id) else {
            error!(node = %s.state.current_node_id, "current node does not exist");
            return Err(EngineError::NodeNotFound(s.state.current_node_id.clone()));
        };
        let Some(choice) = node
            .choice(choice_id)
            .filter(|c| c.is_available(&s.state))
        else {
            debug!(choice = %choice_id, node = %node.id, "ignoring unknown choice");
            return Ok(None);
        };
        if !self.graph.contains(&choice.target) {
            error!(choice = %choice.id, target = %choice.target, "choice targets a node that does not exist");
            return Err(EngineError::NodeNotFound(choice.target.clone()));
        }

        let now = self.time.now();
        s.offered.clear();
        self.events.emit(EngineEvent::ChoicesAvailable(Vec::new()));
        s.messages.push(Message::player(choice.text.as_str(), now));
        self.notify_messages(s);

        Effect::apply_all(&choice.effects, &mut s.state);
        s.state.last_action_at = now;
        s.state.messages_complete = false;
        s.state.pending_node_id = Some(choice.target.clone());
        s.phase = Phase::Idle;
        self.persist(s);

        debug!(choice = %choice.id, from = %node.id, to = %choice.target, "choice taken");
        Ok(Some((node.id.clone(), choice.target.clone())))
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.resetting.load(Ordering::SeqCst) || self.epoch.load(Ordering::SeqCst) != epoch
    }

    /// Run `f` on the session unless a reset happened since `epoch`.
    fn live<R>(&self, epoch: u64, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let mut session = self.lock();
        if self.is_stale(epoch) {
            return None;
        }
        Some(f(&mut session))
    }

    /// Flush state and transcript. Failures are logged and play continues.
    fn persist(&self, s: &Session) {
        if let Err(e) = self.saves.save_state(&s.state) {
            warn!(error = %e, "could not save state");
        }
        if let Err(e) = self.saves.save_messages(&s.messages) {
            warn!(error = %e, "could not save transcript");
        }
    }

    fn notify_messages(&self, s: &Session) {
        self.events
            .emit(EngineEvent::MessagesUpdated(s.messages.clone()));
    }
}

impl std::fmt::Debug for StoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryEngine")
            .field("story", &self.graph.title())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Guard-filtered choices of a node, as offered to the player.
fn offer_list(node: &murmur_core::StoryNode, state: &PlayState) -> Vec<OfferedChoice> {
    node.available_choices(state)
        .into_iter()
        .map(|c| OfferedChoice {
            id: c.id.clone(),
            text: c.text.clone(),
        })
        .collect()
}

/// Drop everything after the last player-authored message.
fn truncate_to_last_player(messages: &mut Vec<Message>) {
    let keep = messages
        .iter()
        .rposition(|m| m.is_player)
        .map_or(0, |idx| idx + 1);
    messages.truncate(keep);
}
