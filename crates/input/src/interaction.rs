//! Press/hold/drag interaction state machine
//!
//! Converts raw pointer events into move intents. A press on a piece arms
//! the machine; it promotes to a drag once the hold time or the pointer
//! displacement crosses its threshold, so a quick tap never moves anything.
//! While dragging, the hovered target is re-resolved every update for
//! highlighting, but no move is issued until release.

use arrayvec::ArrayVec;

use marbleway_core::GameState;
use marbleway_types::{CollectorId, NodeId, PieceId, Point, DRAG_THRESHOLD, HOLD_THRESHOLD_MS};

use crate::pointer::{PickTarget, PointerPicker};

/// A resolved (piece, target) action for the game state to validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    MoveTo { piece: PieceId, node: NodeId },
    MoveToCollector {
        piece: PieceId,
        collector: CollectorId,
    },
    /// Pressing a collector routes the nearest matching piece to it.
    DropNearest { collector: CollectorId },
    /// Released over nothing usable; drives blocked feedback.
    Rejected { piece: PieceId },
}

/// How the hovered node relates to the dragged piece's current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    NeighborClear,
    NeighborOccupied,
    NotNeighbor,
}

/// Transient highlight shown while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub node: NodeId,
    pub reach: Reachability,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Pressed {
        piece: PieceId,
        origin: Point,
        pointer: Point,
        held_ms: u32,
    },
    Dragging {
        piece: PieceId,
        pointer: Point,
        highlight: Option<Highlight>,
    },
}

/// Tracks one pointer's interaction with the level.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionHandler {
    state: State,
    hold_threshold_ms: u32,
    drag_threshold: f32,
}

impl InteractionHandler {
    pub fn new() -> Self {
        Self::with_thresholds(HOLD_THRESHOLD_MS, DRAG_THRESHOLD)
    }

    pub fn with_thresholds(hold_threshold_ms: u32, drag_threshold: f32) -> Self {
        Self {
            state: State::Idle,
            hold_threshold_ms,
            drag_threshold,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// Piece currently being dragged, if any
    pub fn dragging(&self) -> Option<PieceId> {
        match self.state {
            State::Dragging { piece, .. } => Some(piece),
            _ => None,
        }
    }

    /// Current drag highlight, if any
    pub fn highlight(&self) -> Option<Highlight> {
        match self.state {
            State::Dragging { highlight, .. } => highlight,
            _ => None,
        }
    }

    /// Drop any armed press or drag and its transient highlight.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    pub fn handle_press(
        &mut self,
        pos: Point,
        picker: &impl PointerPicker,
        game: &GameState,
    ) -> ArrayVec<Intent, 4> {
        let mut intents = ArrayVec::new();
        if game.progress().is_terminal() {
            // The level is decided; no new interaction cycle starts.
            self.reset();
            return intents;
        }
        if self.state != State::Idle {
            tracing::warn!("press ignored: interaction already in progress");
            return intents;
        }
        match picker.pick(pos) {
            PickTarget::Piece(piece) => {
                if game.piece(piece).is_some_and(|p| p.is_idle()) {
                    self.state = State::Pressed {
                        piece,
                        origin: pos,
                        pointer: pos,
                        held_ms: 0,
                    };
                }
            }
            PickTarget::Collector(collector) => {
                // Immediate action; the press never arms a drag.
                let _ = intents.try_push(Intent::DropNearest { collector });
            }
            PickTarget::Node(_) | PickTarget::Nothing => {}
        }
        intents
    }

    pub fn handle_move(&mut self, pos: Point, picker: &impl PointerPicker, game: &GameState) {
        match self.state {
            State::Idle => {}
            State::Pressed { piece, origin, held_ms, .. } => {
                if origin.distance(pos) >= self.drag_threshold {
                    self.state = State::Dragging {
                        piece,
                        pointer: pos,
                        highlight: resolve_highlight(piece, pos, picker, game),
                    };
                } else {
                    self.state = State::Pressed {
                        piece,
                        origin,
                        pointer: pos,
                        held_ms,
                    };
                }
            }
            State::Dragging { piece, .. } => {
                self.state = State::Dragging {
                    piece,
                    pointer: pos,
                    highlight: resolve_highlight(piece, pos, picker, game),
                };
            }
        }
    }

    /// Per-tick poll: advances the hold timer and re-resolves the drag
    /// highlight against the current occupancy.
    pub fn update(&mut self, elapsed_ms: u32, picker: &impl PointerPicker, game: &GameState) {
        if game.progress().is_terminal() {
            self.reset();
            return;
        }
        match self.state {
            State::Idle => {}
            State::Pressed {
                piece,
                origin,
                pointer,
                held_ms,
            } => {
                let held_ms = held_ms + elapsed_ms;
                if held_ms >= self.hold_threshold_ms {
                    self.state = State::Dragging {
                        piece,
                        pointer,
                        highlight: resolve_highlight(piece, pointer, picker, game),
                    };
                } else {
                    self.state = State::Pressed {
                        piece,
                        origin,
                        pointer,
                        held_ms,
                    };
                }
            }
            State::Dragging { piece, pointer, .. } => {
                self.state = State::Dragging {
                    piece,
                    pointer,
                    highlight: resolve_highlight(piece, pointer, picker, game),
                };
            }
        }
    }

    pub fn handle_release(
        &mut self,
        pos: Point,
        picker: &impl PointerPicker,
        game: &GameState,
    ) -> ArrayVec<Intent, 4> {
        let mut intents = ArrayVec::new();
        let state = std::mem::replace(&mut self.state, State::Idle);
        match state {
            State::Idle => {}
            State::Pressed { .. } => {
                // Tap: below both thresholds, no move effect.
            }
            State::Dragging { piece, .. } => {
                let intent = match picker.pick(pos) {
                    PickTarget::Node(node) => Intent::MoveTo { piece, node },
                    PickTarget::Collector(collector) => Intent::MoveToCollector {
                        piece,
                        collector,
                    },
                    PickTarget::Piece(other) => match game.piece(other).and_then(|p| p.location())
                    {
                        // Release over a piece aims at the node beneath it;
                        // the occupancy guard has the final word.
                        Some(node) => Intent::MoveTo { piece, node },
                        None => Intent::Rejected { piece },
                    },
                    PickTarget::Nothing => Intent::Rejected { piece },
                };
                let _ = intents.try_push(intent);
            }
        }
        intents
    }
}

impl Default for InteractionHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_highlight(
    piece: PieceId,
    pos: Point,
    picker: &impl PointerPicker,
    game: &GameState,
) -> Option<Highlight> {
    let node = match picker.pick(pos) {
        PickTarget::Node(n) => n,
        PickTarget::Collector(c) => game.collector(c)?.entry(),
        PickTarget::Piece(p) => game.piece(p)?.location()?,
        PickTarget::Nothing => return None,
    };
    let from = game.piece(piece)?.location()?;
    let reach = if game.graph().is_neighbor(from, node) {
        if game.graph().can_enter(node) {
            Reachability::NeighborClear
        } else {
            Reachability::NeighborOccupied
        }
    } else {
        Reachability::NotNeighbor
    };
    Some(Highlight { node, reach })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use marbleway_core::LevelGraph;
    use marbleway_types::Color;

    /// Picker backed by integer cell coordinates.
    struct TestPicker(HashMap<(i32, i32), PickTarget>);

    impl TestPicker {
        fn new(entries: &[((i32, i32), PickTarget)]) -> Self {
            Self(entries.iter().copied().collect())
        }
    }

    impl PointerPicker for TestPicker {
        fn pick(&self, position: Point) -> PickTarget {
            let key = (position.x.round() as i32, position.y.round() as i32);
            self.0.get(&key).copied().unwrap_or(PickTarget::Nothing)
        }
    }

    fn n(id: u32) -> NodeId {
        NodeId(id)
    }

    fn at(x: i32, y: i32) -> Point {
        Point::new(x as f32, y as f32)
    }

    /// Line n0 - n1 - n2 with a red piece on n0; picker maps x=i to node i
    /// and (0, 1) to the piece.
    fn setup() -> (GameState, TestPicker, PieceId) {
        let mut g = LevelGraph::new();
        for i in 0..3 {
            g.add_node(n(i));
        }
        g.add_edge(n(0), n(1));
        g.add_edge(n(1), n(2));
        let mut game = GameState::new(g);
        let piece = game.spawn_piece(Color::Red, n(0)).unwrap();
        let picker = TestPicker::new(&[
            ((0, 0), PickTarget::Node(n(0))),
            ((1, 0), PickTarget::Node(n(1))),
            ((2, 0), PickTarget::Node(n(2))),
            ((0, 1), PickTarget::Piece(piece)),
        ]);
        (game, picker, piece)
    }

    #[test]
    fn test_tap_below_thresholds_has_no_effect() {
        let (game, picker, _) = setup();
        let mut ih = InteractionHandler::with_thresholds(250, 2.0);

        assert!(ih.handle_press(at(0, 1), &picker, &game).is_empty());
        assert!(!ih.is_idle());
        ih.update(100, &picker, &game);
        let intents = ih.handle_release(at(0, 1), &picker, &game);
        assert!(intents.is_empty());
        assert!(ih.is_idle());
    }

    #[test]
    fn test_displacement_promotes_to_drag_and_release_commits() {
        let (game, picker, piece) = setup();
        let mut ih = InteractionHandler::with_thresholds(10_000, 1.5);

        ih.handle_press(at(0, 1), &picker, &game);
        ih.handle_move(at(2, 0), &picker, &game);
        assert_eq!(ih.dragging(), Some(piece));

        let intents = ih.handle_release(at(2, 0), &picker, &game);
        assert_eq!(
            intents.as_slice(),
            &[Intent::MoveTo {
                piece,
                node: n(2)
            }]
        );
        assert!(ih.is_idle());
        assert_eq!(ih.highlight(), None);
    }

    #[test]
    fn test_hold_time_promotes_to_drag() {
        let (game, picker, piece) = setup();
        let mut ih = InteractionHandler::with_thresholds(250, 100.0);

        ih.handle_press(at(0, 1), &picker, &game);
        ih.update(249, &picker, &game);
        assert_eq!(ih.dragging(), None);
        ih.update(1, &picker, &game);
        assert_eq!(ih.dragging(), Some(piece));
    }

    #[test]
    fn test_release_over_nothing_is_rejected() {
        let (game, picker, piece) = setup();
        let mut ih = InteractionHandler::with_thresholds(10_000, 1.0);

        ih.handle_press(at(0, 1), &picker, &game);
        ih.handle_move(at(2, 0), &picker, &game);
        let intents = ih.handle_release(Point::new(50.0, 50.0), &picker, &game);
        assert_eq!(intents.as_slice(), &[Intent::Rejected { piece }]);
        assert!(ih.is_idle());
    }

    #[test]
    fn test_press_on_collector_drops_nearest_without_arming() {
        let (mut game, _, _) = setup();
        let collector = game.add_collector(n(2), Color::Red, Vec::new()).unwrap();
        let picker = TestPicker::new(&[((5, 5), PickTarget::Collector(collector))]);
        let mut ih = InteractionHandler::new();

        let intents = ih.handle_press(at(5, 5), &picker, &game);
        assert_eq!(intents.as_slice(), &[Intent::DropNearest { collector }]);
        assert!(ih.is_idle());
    }

    #[test]
    fn test_highlight_classifies_reachability() {
        let (mut game, picker, piece) = setup();
        let mut ih = InteractionHandler::with_thresholds(10_000, 0.5);

        ih.handle_press(at(0, 1), &picker, &game);
        ih.handle_move(at(1, 0), &picker, &game);
        assert_eq!(
            ih.highlight(),
            Some(Highlight {
                node: n(1),
                reach: Reachability::NeighborClear
            })
        );

        // Not adjacent to the piece's node.
        ih.handle_move(at(2, 0), &picker, &game);
        assert_eq!(
            ih.highlight(),
            Some(Highlight {
                node: n(2),
                reach: Reachability::NotNeighbor
            })
        );

        // Occupy the neighbor: the per-tick poll re-resolves it.
        ih.handle_move(at(1, 0), &picker, &game);
        game.spawn_piece(Color::Blue, n(1)).unwrap();
        ih.update(16, &picker, &game);
        assert_eq!(
            ih.highlight(),
            Some(Highlight {
                node: n(1),
                reach: Reachability::NeighborOccupied
            })
        );
        let _ = piece;
    }

    #[test]
    fn test_press_ignored_once_level_is_decided() {
        let (mut game, picker, piece) = setup();
        let collector = game.add_collector(n(1), Color::Blue, Vec::new()).unwrap();
        // Red into a blue collector: game over.
        game.move_to_collector(piece, collector).unwrap();
        game.tick(marbleway_types::STEP_MS);
        game.tick(marbleway_types::FALL_MS);
        assert!(game.game_over());

        let mut ih = InteractionHandler::new();
        let intents = ih.handle_press(at(0, 0), &picker, &game);
        assert!(intents.is_empty());
        assert!(ih.is_idle());
    }

    #[test]
    fn test_press_on_moving_piece_does_not_arm() {
        let (mut game, picker, piece) = setup();
        game.try_move(piece, n(2)).unwrap();
        let mut ih = InteractionHandler::new();

        let intents = ih.handle_press(at(0, 1), &picker, &game);
        assert!(intents.is_empty());
        assert!(ih.is_idle());
    }
}
