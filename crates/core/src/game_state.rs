//! Game state module - manages the complete level state
//!
//! This module ties together the graph model, pathfinder, occupancy guard,
//! piece movement state machine, collectors, and match progress. It owns the
//! occupancy transition timing: the single definitive rule is claim-on-entry
//! (a piece vacates its current node and claims the next one in the same
//! operation, at the instant the step begins), so stale clearance observed
//! at proposal time can never let two pieces claim one node within a tick.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use marbleway_types::{Color, CollectorId, NodeId, PieceId, FALL_MS, STEP_MS};

use crate::collector::Collector;
use crate::graph::LevelGraph;
use crate::path::{bfs_find, find_path};
use crate::piece::{MoveState, Piece};
use crate::progress::MatchState;

/// Why a move request was not carried out.
///
/// Nothing here is fatal: blocked/disconnected requests surface as a
/// [`GameEvent::Blocked`] feedback event, the rest are silent no-ops with a
/// warn-level diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("path is occupied or destination unreachable")]
    BlockedPath,
    #[error("no path exists between the nodes")]
    DisconnectedGraph,
    #[error("request contradicts the current movement state")]
    InvalidTransition,
    #[error("piece or level is in a terminal state")]
    TerminalStateViolation,
}

/// Outbound event consumed by the session layer and forwarded to the
/// injected feedback sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A requested move could not start or was cut short. `piece` is `None`
    /// when a collector press found no matching piece to route.
    Blocked { piece: Option<PieceId> },
    PieceMoved {
        piece: PieceId,
        from: NodeId,
        to: NodeId,
    },
    PieceCollected {
        piece: PieceId,
        collector: CollectorId,
    },
    GameOver {
        piece: PieceId,
        collector: CollectorId,
    },
    LevelComplete,
}

/// Complete level state: graph, pieces, collectors, match progress, and the
/// pending outbound events.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    graph: LevelGraph,
    pieces: BTreeMap<PieceId, Piece>,
    collectors: BTreeMap<CollectorId, Collector>,
    /// Entry node -> collector fed by it
    entries: HashMap<NodeId, CollectorId>,
    progress: MatchState,
    events: Vec<GameEvent>,
    next_piece_id: u32,
    next_collector_id: u32,
}

impl GameState {
    pub fn new(graph: LevelGraph) -> Self {
        Self {
            graph,
            ..Self::default()
        }
    }

    /// Place a new idle piece on an empty node.
    /// Returns `None` when the node is unknown or already occupied.
    pub fn spawn_piece(&mut self, color: Color, at: NodeId) -> Option<PieceId> {
        if !self.graph.contains(at) || !self.graph.can_enter(at) {
            return None;
        }
        let id = PieceId(self.next_piece_id);
        self.next_piece_id += 1;
        self.graph.set_occupant(at, Some(id));
        self.pieces.insert(id, Piece::new(id, color, at));
        self.progress.register_piece();
        Some(id)
    }

    /// Attach a collector fed by an existing node.
    /// Returns `None` when the entry is unknown or already feeds a collector.
    pub fn add_collector(
        &mut self,
        entry: NodeId,
        accepted: Color,
        cycle: Vec<Color>,
    ) -> Option<CollectorId> {
        if !self.graph.contains(entry) || self.entries.contains_key(&entry) {
            return None;
        }
        let id = CollectorId(self.next_collector_id);
        self.next_collector_id += 1;
        self.entries.insert(entry, id);
        self.collectors
            .insert(id, Collector::new(id, entry, accepted).with_cycle(cycle));
        Some(id)
    }

    pub fn graph(&self) -> &LevelGraph {
        &self.graph
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    pub fn collector(&self, id: CollectorId) -> Option<&Collector> {
        self.collectors.get(&id)
    }

    pub fn collectors(&self) -> impl Iterator<Item = &Collector> {
        self.collectors.values()
    }

    /// Collector fed by this node, if it is a collector entry
    pub fn collector_at_entry(&self, node: NodeId) -> Option<CollectorId> {
        self.entries.get(&node).copied()
    }

    pub fn progress(&self) -> &MatchState {
        &self.progress
    }

    pub fn game_over(&self) -> bool {
        self.progress.game_over()
    }

    pub fn level_complete(&self) -> bool {
        self.progress.level_complete()
    }

    /// Take and clear the pending outbound events.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Request a move of an idle piece to a destination node.
    ///
    /// Pathfinding ignores occupancy; clearance is checked here, at commit
    /// time, and again at every step begin while the move plays out. On
    /// success the first step begins immediately: the piece vacates its
    /// origin and claims the first path node in the same operation.
    pub fn try_move(&mut self, piece: PieceId, dest: NodeId) -> Result<(), MoveError> {
        if self.progress.is_terminal() {
            tracing::warn!(%piece, "move ignored: level already decided");
            return Err(MoveError::TerminalStateViolation);
        }
        let Some(p) = self.pieces.get_mut(&piece) else {
            tracing::warn!(%piece, "move ignored: unknown piece");
            return Err(MoveError::InvalidTransition);
        };
        if p.is_terminal() {
            tracing::warn!(%piece, state = p.state().as_str(), "move ignored: piece retired");
            return Err(MoveError::TerminalStateViolation);
        }
        if p.is_in_flight() {
            // Idempotent no-op: an in-flight piece keeps its current path.
            tracing::warn!(%piece, state = p.state().as_str(), "move ignored: piece in flight");
            return Err(MoveError::InvalidTransition);
        }
        let Some(origin) = p.location else {
            tracing::warn!(%piece, "move ignored: idle piece without a location");
            return Err(MoveError::InvalidTransition);
        };

        let Some(path) = find_path(&self.graph, origin, dest) else {
            self.events.push(GameEvent::Blocked {
                piece: Some(piece),
            });
            return Err(MoveError::DisconnectedGraph);
        };
        if path.is_empty() {
            // Already at the destination: immediate no-op success.
            return Ok(());
        }
        if !self.graph.is_clear(&path, piece) {
            self.events.push(GameEvent::Blocked {
                piece: Some(piece),
            });
            return Err(MoveError::BlockedPath);
        }

        // Commit: claim-on-entry for the first step, synchronously.
        let first = path.nodes()[0];
        self.graph.set_occupant(origin, None);
        self.graph.set_occupant(first, Some(piece));
        p.location = Some(first);
        p.state = MoveState::Moving {
            path,
            next: 0,
            elapsed_ms: 0,
            origin,
        };
        Ok(())
    }

    /// Request a move of an idle piece to a collector's entry node.
    pub fn move_to_collector(
        &mut self,
        piece: PieceId,
        collector: CollectorId,
    ) -> Result<(), MoveError> {
        let Some(col) = self.collectors.get(&collector) else {
            tracing::warn!(%collector, "move ignored: unknown collector");
            return Err(MoveError::InvalidTransition);
        };
        let entry = col.entry();
        self.try_move(piece, entry)
    }

    /// Route the nearest idle piece of the collector's accepted color toward
    /// it (triggered by pressing the collector). Nearest means fewest hops
    /// from the entry node, ties broken by discovery order.
    pub fn drop_nearest_matching(&mut self, collector: CollectorId) -> Result<(), MoveError> {
        if self.progress.is_terminal() {
            tracing::warn!(%collector, "drop ignored: level already decided");
            return Err(MoveError::TerminalStateViolation);
        }
        let Some(col) = self.collectors.get(&collector) else {
            tracing::warn!(%collector, "drop ignored: unknown collector");
            return Err(MoveError::InvalidTransition);
        };
        let accepted = col.accepted();
        let entry = col.entry();

        let found = bfs_find(&self.graph, entry, |node| {
            self.graph.occupant(node).is_some_and(|pid| {
                self.pieces
                    .get(&pid)
                    .is_some_and(|p| p.is_idle() && p.color() == accepted)
            })
        });
        let Some(node) = found else {
            self.events.push(GameEvent::Blocked { piece: None });
            return Err(MoveError::BlockedPath);
        };
        let Some(piece) = self.graph.occupant(node) else {
            return Err(MoveError::InvalidTransition);
        };
        self.try_move(piece, entry)
    }

    /// Advance every in-flight piece by one update slice.
    ///
    /// All occupancy mutation happens inside this single-threaded loop, so a
    /// node can never be observed clear and then claimed twice in one tick.
    pub fn tick(&mut self, elapsed_ms: u32) {
        if self.progress.is_terminal() {
            self.cancel_moves();
            return;
        }
        let ids: Vec<PieceId> = self.pieces.keys().copied().collect();
        for id in ids {
            self.advance_piece(id, elapsed_ms);
            if self.progress.is_terminal() {
                // A mismatch resolution ends the level mid-tick; remaining
                // moves are interrupted, not finished.
                self.cancel_moves();
                return;
            }
        }
    }

    /// Settle every `Moving` piece to `Idle` on the node it has already
    /// claimed. Used when a terminal flag interrupts play.
    fn cancel_moves(&mut self) {
        for piece in self.pieces.values_mut() {
            if matches!(piece.state, MoveState::Moving { .. }) {
                piece.state = MoveState::Idle;
            }
        }
    }

    fn advance_piece(&mut self, id: PieceId, dt: u32) {
        let Some(piece) = self.pieces.get_mut(&id) else {
            return;
        };
        let state = std::mem::take(&mut piece.state);
        piece.state = match state {
            MoveState::Moving {
                path,
                mut next,
                mut elapsed_ms,
                origin,
            } => {
                elapsed_ms += dt;
                let mut outcome = StepOutcome::InFlight;
                while elapsed_ms >= STEP_MS {
                    elapsed_ms -= STEP_MS;
                    if next + 1 == path.len() {
                        outcome = StepOutcome::Arrived;
                        break;
                    }
                    // Next step begins: re-check clearance at this instant,
                    // then vacate and claim in the same operation.
                    let target = path.nodes()[next + 1];
                    if self.graph.can_enter(target) {
                        self.graph.set_occupant(path.nodes()[next], None);
                        self.graph.set_occupant(target, Some(id));
                        piece.location = Some(target);
                        next += 1;
                    } else {
                        outcome = StepOutcome::Blocked;
                        break;
                    }
                }
                match outcome {
                    StepOutcome::InFlight => MoveState::Moving {
                        path,
                        next,
                        elapsed_ms,
                        origin,
                    },
                    StepOutcome::Blocked => {
                        // The piece settles where it stands; its claim on
                        // that node is already in place.
                        self.events.push(GameEvent::Blocked { piece: Some(id) });
                        MoveState::Idle
                    }
                    StepOutcome::Arrived => {
                        let dest = path.nodes()[next];
                        self.events.push(GameEvent::PieceMoved {
                            piece: id,
                            from: origin,
                            to: dest,
                        });
                        match self.entries.get(&dest).copied() {
                            Some(collector) => {
                                // The terminal waypoint feeds a collector:
                                // the piece leaves the graph and falls in.
                                self.graph.set_occupant(dest, None);
                                piece.location = None;
                                MoveState::Falling {
                                    collector,
                                    elapsed_ms: 0,
                                }
                            }
                            None => MoveState::Idle,
                        }
                    }
                }
            }
            MoveState::Falling {
                collector,
                mut elapsed_ms,
            } => {
                elapsed_ms += dt;
                if elapsed_ms < FALL_MS {
                    MoveState::Falling {
                        collector,
                        elapsed_ms,
                    }
                } else if let Some(col) = self.collectors.get_mut(&collector) {
                    if col.accepted() == piece.color() {
                        col.record_collection(piece.color());
                        self.events.push(GameEvent::PieceCollected {
                            piece: id,
                            collector,
                        });
                        if self.progress.record_collected() {
                            self.events.push(GameEvent::LevelComplete);
                        }
                        MoveState::Collected
                    } else {
                        if self.progress.set_game_over() {
                            self.events.push(GameEvent::GameOver {
                                piece: id,
                                collector,
                            });
                        }
                        MoveState::Removed
                    }
                } else {
                    tracing::warn!(%id, %collector, "fall resolved against unknown collector");
                    MoveState::Removed
                }
            }
            settled => settled,
        };
    }
}

enum StepOutcome {
    InFlight,
    Blocked,
    Arrived,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u32) -> NodeId {
        NodeId(id)
    }

    /// Line graph n0 - n1 - ... - n(count-1)
    fn line(count: u32) -> LevelGraph {
        let mut g = LevelGraph::new();
        for i in 0..count {
            g.add_node(n(i));
        }
        for i in 1..count {
            g.add_edge(n(i - 1), n(i));
        }
        g
    }

    fn tick_steps(state: &mut GameState, steps: u32) {
        for _ in 0..steps {
            state.tick(STEP_MS);
        }
    }

    #[test]
    fn test_move_along_clear_line() {
        let mut state = GameState::new(line(3));
        let piece = state.spawn_piece(Color::Red, n(0)).unwrap();

        assert_eq!(state.try_move(piece, n(2)), Ok(()));
        // Claim-on-entry: the origin is vacated and the first path node
        // claimed at commit time.
        assert_eq!(state.graph().occupant(n(0)), None);
        assert_eq!(state.graph().occupant(n(1)), Some(piece));

        tick_steps(&mut state, 2);

        assert_eq!(state.graph().occupant(n(2)), Some(piece));
        assert_eq!(state.graph().occupant(n(0)), None);
        assert_eq!(state.graph().occupant(n(1)), None);
        let p = state.piece(piece).unwrap();
        assert!(p.is_idle());
        assert_eq!(p.location(), Some(n(2)));
        assert!(state.take_events().contains(&GameEvent::PieceMoved {
            piece,
            from: n(0),
            to: n(2),
        }));
    }

    #[test]
    fn test_occupied_path_is_blocked() {
        let mut state = GameState::new(line(3));
        let mover = state.spawn_piece(Color::Red, n(0)).unwrap();
        let blocker = state.spawn_piece(Color::Blue, n(1)).unwrap();

        assert_eq!(state.try_move(mover, n(2)), Err(MoveError::BlockedPath));
        assert_eq!(
            state.take_events(),
            vec![GameEvent::Blocked {
                piece: Some(mover)
            }]
        );
        // No occupancy change.
        assert_eq!(state.graph().occupant(n(0)), Some(mover));
        assert_eq!(state.graph().occupant(n(1)), Some(blocker));
        assert!(state.piece(mover).unwrap().is_idle());
    }

    #[test]
    fn test_move_request_on_in_flight_piece_is_idempotent_no_op() {
        let mut state = GameState::new(line(4));
        let piece = state.spawn_piece(Color::Red, n(0)).unwrap();
        assert_eq!(state.try_move(piece, n(3)), Ok(()));

        let before = state.piece(piece).unwrap().clone();
        assert_eq!(state.try_move(piece, n(2)), Err(MoveError::InvalidTransition));
        assert_eq!(state.piece(piece).unwrap(), &before);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_zero_length_path_is_no_op_success() {
        let mut state = GameState::new(line(2));
        let piece = state.spawn_piece(Color::Red, n(0)).unwrap();

        assert_eq!(state.try_move(piece, n(0)), Ok(()));
        assert!(state.piece(piece).unwrap().is_idle());
        assert_eq!(state.graph().occupant(n(0)), Some(piece));
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_disconnected_goal_is_blocked_feedback() {
        let mut g = line(2);
        g.add_node(n(9));
        let mut state = GameState::new(g);
        let piece = state.spawn_piece(Color::Red, n(0)).unwrap();

        assert_eq!(state.try_move(piece, n(9)), Err(MoveError::DisconnectedGraph));
        assert_eq!(
            state.take_events(),
            vec![GameEvent::Blocked {
                piece: Some(piece)
            }]
        );
    }

    #[test]
    fn test_same_cycle_contention_second_claim_is_rejected() {
        // n0 - n1 - n2: both end pieces want the middle node.
        let mut state = GameState::new(line(3));
        let first = state.spawn_piece(Color::Red, n(0)).unwrap();
        let second = state.spawn_piece(Color::Blue, n(2)).unwrap();

        assert_eq!(state.try_move(first, n(1)), Ok(()));
        // Same input cycle: the first piece's claim is already visible.
        assert_eq!(state.try_move(second, n(1)), Err(MoveError::BlockedPath));
        assert_eq!(state.graph().occupant(n(1)), Some(first));
        assert_eq!(state.graph().occupant(n(2)), Some(second));
    }

    #[test]
    fn test_mid_path_occupation_aborts_the_move() {
        // n0 - n1 - n2 plus n3 - n2: the second piece takes n2 first.
        let mut g = line(3);
        g.add_node(n(3));
        g.add_edge(n(3), n(2));
        let mut state = GameState::new(g);
        let slow = state.spawn_piece(Color::Red, n(0)).unwrap();
        let fast = state.spawn_piece(Color::Blue, n(3)).unwrap();

        assert_eq!(state.try_move(slow, n(2)), Ok(()));
        assert_eq!(state.try_move(fast, n(2)), Ok(()));
        // `fast` claimed n2 at commit; `slow` discovers that when its second
        // step begins and settles where it stands.
        tick_steps(&mut state, 1);

        let events = state.take_events();
        assert!(events.contains(&GameEvent::Blocked { piece: Some(slow) }));
        let p = state.piece(slow).unwrap();
        assert!(p.is_idle());
        assert_eq!(p.location(), Some(n(1)));
        assert_eq!(state.graph().occupant(n(1)), Some(slow));
        assert_eq!(state.graph().occupant(n(2)), Some(fast));
    }

    #[test]
    fn test_correct_collection_completes_single_piece_level() {
        let mut state = GameState::new(line(2));
        let piece = state.spawn_piece(Color::Red, n(0)).unwrap();
        let collector = state.add_collector(n(1), Color::Red, Vec::new()).unwrap();

        assert_eq!(state.move_to_collector(piece, collector), Ok(()));
        tick_steps(&mut state, 1);
        // Arrived at the entry and started falling: the entry is vacated.
        assert_eq!(state.graph().occupant(n(1)), None);
        assert_eq!(state.piece(piece).unwrap().location(), None);

        state.tick(FALL_MS);

        let p = state.piece(piece).unwrap();
        assert_eq!(p.state(), &MoveState::Collected);
        assert!(state.level_complete());
        assert!(!state.game_over());
        assert_eq!(state.progress().collected(), 1);
        let events = state.take_events();
        assert!(events.contains(&GameEvent::PieceCollected { piece, collector }));
        assert!(events.contains(&GameEvent::LevelComplete));
    }

    #[test]
    fn test_mismatch_sets_game_over_and_freezes_moves() {
        let mut state = GameState::new(line(3));
        let red = state.spawn_piece(Color::Red, n(0)).unwrap();
        let idle = state.spawn_piece(Color::Blue, n(2)).unwrap();
        let collector = state.add_collector(n(1), Color::Blue, Vec::new()).unwrap();

        assert_eq!(state.move_to_collector(red, collector), Ok(()));
        tick_steps(&mut state, 1);
        state.tick(FALL_MS);

        assert!(state.game_over());
        assert!(!state.level_complete());
        assert_eq!(state.piece(red).unwrap().state(), &MoveState::Removed);
        assert!(state
            .take_events()
            .contains(&GameEvent::GameOver { piece: red, collector }));

        // Any further move request is a no-op.
        assert_eq!(
            state.try_move(idle, n(1)),
            Err(MoveError::TerminalStateViolation)
        );
        assert!(state.piece(idle).unwrap().is_idle());
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_two_pieces_complete_exactly_once() {
        let mut state = GameState::new(line(3));
        let a = state.spawn_piece(Color::Red, n(0)).unwrap();
        let b = state.spawn_piece(Color::Red, n(2)).unwrap();
        let collector = state
            .add_collector(n(1), Color::Red, vec![Color::Red])
            .unwrap();

        assert_eq!(state.move_to_collector(a, collector), Ok(()));
        tick_steps(&mut state, 1);
        state.tick(FALL_MS);
        assert!(!state.level_complete());

        assert_eq!(state.move_to_collector(b, collector), Ok(()));
        tick_steps(&mut state, 1);
        state.tick(FALL_MS);

        assert!(state.level_complete());
        assert_eq!(state.progress().collected(), 2);
        assert_eq!(state.progress().total(), 2);
        let completions = state
            .take_events()
            .iter()
            .filter(|e| **e == GameEvent::LevelComplete)
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_drop_nearest_matching_routes_closest_piece_of_accepted_color() {
        // entry n0; blue at n1 (1 hop), red at n2 (2 hops), red at n3 (3 hops).
        let mut state = GameState::new(line(4));
        let collector = state.add_collector(n(0), Color::Red, Vec::new()).unwrap();
        state.spawn_piece(Color::Blue, n(1)).unwrap();
        let near_red = state.spawn_piece(Color::Red, n(2)).unwrap();
        state.spawn_piece(Color::Red, n(3)).unwrap();

        // The blue piece sits on the route, so the red piece is blocked; the
        // request still picks the nearest red, then reports blocked.
        assert_eq!(
            state.drop_nearest_matching(collector),
            Err(MoveError::BlockedPath)
        );
        assert_eq!(
            state.take_events(),
            vec![GameEvent::Blocked {
                piece: Some(near_red)
            }]
        );
    }

    #[test]
    fn test_drop_nearest_matching_without_candidate_reports_blocked() {
        let mut state = GameState::new(line(2));
        let collector = state.add_collector(n(0), Color::Red, Vec::new()).unwrap();
        state.spawn_piece(Color::Blue, n(1)).unwrap();

        assert_eq!(
            state.drop_nearest_matching(collector),
            Err(MoveError::BlockedPath)
        );
        assert_eq!(state.take_events(), vec![GameEvent::Blocked { piece: None }]);
    }

    #[test]
    fn test_drop_nearest_matching_moves_the_piece() {
        let mut state = GameState::new(line(3));
        let collector = state.add_collector(n(0), Color::Red, Vec::new()).unwrap();
        let red = state.spawn_piece(Color::Red, n(2)).unwrap();

        assert_eq!(state.drop_nearest_matching(collector), Ok(()));
        assert!(state.piece(red).unwrap().is_in_flight());
        tick_steps(&mut state, 2);
        state.tick(FALL_MS);
        assert_eq!(state.piece(red).unwrap().state(), &MoveState::Collected);
    }

    #[test]
    fn test_spawn_rejects_occupied_or_unknown_node() {
        let mut state = GameState::new(line(2));
        assert!(state.spawn_piece(Color::Red, n(0)).is_some());
        assert!(state.spawn_piece(Color::Blue, n(0)).is_none());
        assert!(state.spawn_piece(Color::Blue, n(9)).is_none());
        assert_eq!(state.progress().total(), 1);
    }

    #[test]
    fn test_occupancy_and_location_agree_at_quiescent_instants() {
        let mut state = GameState::new(line(4));
        let a = state.spawn_piece(Color::Red, n(0)).unwrap();
        let b = state.spawn_piece(Color::Blue, n(3)).unwrap();
        state.try_move(a, n(2)).unwrap();
        // Let everything settle.
        tick_steps(&mut state, 4);
        let _ = b;

        for node in state.graph().nodes().collect::<Vec<_>>() {
            match state.graph().occupant(node) {
                None => {}
                Some(pid) => {
                    assert_eq!(state.piece(pid).unwrap().location(), Some(node));
                }
            }
        }
        for piece in state.pieces() {
            if let Some(node) = piece.location() {
                assert_eq!(state.graph().occupant(node), Some(piece.id()));
            }
        }
    }
}
