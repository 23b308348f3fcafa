//! Session driver
//!
//! Wires one level together: pointer events flow through the interaction
//! machine, resolved intents are validated by the game state, and core
//! events are dispatched to the injected collaborators. The core never
//! renders, plays audio, or persists anything itself.

use arrayvec::ArrayVec;

use marbleway_core::{GameEvent, GameState};
use marbleway_input::{Intent, InteractionHandler, PointerEvent, PointerPicker};
use marbleway_types::{CollectorId, NodeId, PieceId};

/// Render/audio/feedback collaborator. All methods default to no-ops so a
/// sink implements only what it cares about.
pub trait FeedbackSink {
    fn on_blocked(&mut self, _piece: Option<PieceId>) {}
    fn on_piece_moved(&mut self, _piece: PieceId, _from: NodeId, _to: NodeId) {}
    fn on_piece_collected(&mut self, _piece: PieceId, _collector: CollectorId) {}
    fn on_game_over(&mut self) {}
    fn on_level_complete(&mut self) {}
}

/// Persistence collaborator notified when a level is completed.
pub trait ProgressStore {
    fn level_complete(&mut self, level_id: u32);
}

impl FeedbackSink for () {}

impl ProgressStore for () {
    fn level_complete(&mut self, _level_id: u32) {}
}

/// One level in play: game state, interaction machine, and collaborators.
#[derive(Debug)]
pub struct Session<S, P> {
    level_id: u32,
    game: GameState,
    interaction: InteractionHandler,
    sink: S,
    store: P,
}

impl<S: FeedbackSink, P: ProgressStore> Session<S, P> {
    pub fn new(level_id: u32, game: GameState, sink: S, store: P) -> Self {
        Self {
            level_id,
            game,
            interaction: InteractionHandler::new(),
            sink,
            store,
        }
    }

    pub fn level_id(&self) -> u32 {
        self.level_id
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn interaction(&self) -> &InteractionHandler {
        &self.interaction
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Feed one raw pointer event through the interaction machine and apply
    /// whatever intents fall out.
    pub fn handle_pointer(&mut self, event: PointerEvent, picker: &impl PointerPicker) {
        let intents: ArrayVec<Intent, 4> = match event {
            PointerEvent::Press(pos) => self.interaction.handle_press(pos, picker, &self.game),
            PointerEvent::Move(pos) => {
                self.interaction.handle_move(pos, picker, &self.game);
                ArrayVec::new()
            }
            PointerEvent::Release(pos) => self.interaction.handle_release(pos, picker, &self.game),
        };
        for intent in intents {
            self.apply(intent);
        }
        self.dispatch();
    }

    /// Advance one update slice: in-flight pieces first, then the
    /// interaction poll against the fresh occupancy.
    pub fn tick(&mut self, elapsed_ms: u32, picker: &impl PointerPicker) {
        self.game.tick(elapsed_ms);
        self.interaction.update(elapsed_ms, picker, &self.game);
        self.dispatch();
    }

    fn apply(&mut self, intent: Intent) {
        let result = match intent {
            Intent::MoveTo { piece, node } => self.game.try_move(piece, node),
            Intent::MoveToCollector { piece, collector } => {
                self.game.move_to_collector(piece, collector)
            }
            Intent::DropNearest { collector } => self.game.drop_nearest_matching(collector),
            Intent::Rejected { piece } => {
                // Released over nothing usable; no core state was touched.
                self.sink.on_blocked(Some(piece));
                Ok(())
            }
        };
        if let Err(err) = result {
            tracing::debug!(%err, "intent not applied");
        }
    }

    fn dispatch(&mut self) {
        for event in self.game.take_events() {
            match event {
                GameEvent::Blocked { piece } => self.sink.on_blocked(piece),
                GameEvent::PieceMoved { piece, from, to } => {
                    self.sink.on_piece_moved(piece, from, to);
                }
                GameEvent::PieceCollected { piece, collector } => {
                    self.sink.on_piece_collected(piece, collector);
                }
                GameEvent::GameOver { .. } => self.sink.on_game_over(),
                GameEvent::LevelComplete => {
                    self.sink.on_level_complete();
                    self.store.level_complete(self.level_id);
                }
            }
        }
    }
}
