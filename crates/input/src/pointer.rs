//! Pointer boundary contract
//!
//! A front-end produces discrete press/move/release events with a 2D
//! position and answers the raycast-style "what is under this position"
//! query. The core never sees device specifics.

use marbleway_types::{CollectorId, NodeId, PieceId, Point};

/// Raw pointer event from the input source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(Point),
    Move(Point),
    Release(Point),
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Press(p) | PointerEvent::Move(p) | PointerEvent::Release(p) => *p,
        }
    }
}

/// What sits under a pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickTarget {
    Piece(PieceId),
    Collector(CollectorId),
    Node(NodeId),
    Nothing,
}

/// Resolves a pointer position to whatever is under it.
pub trait PointerPicker {
    fn pick(&self, position: Point) -> PickTarget;
}
