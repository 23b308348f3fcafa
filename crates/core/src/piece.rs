//! Piece movement state machine data
//!
//! A piece is Idle on a node, Moving along a validated path, Falling into a
//! collector, or terminally Collected/Removed. The per-tick advance logic
//! lives in [`crate::game_state`], which owns occupancy transition timing.

use marbleway_types::{Color, CollectorId, NodeId, PieceId};

use crate::path::Path;

/// Movement status of a piece.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MoveState {
    #[default]
    Idle,
    Moving {
        /// Validated path; `next` indexes the node the piece has most
        /// recently claimed (it travels into `next + 1` on step completion).
        path: Path,
        next: usize,
        elapsed_ms: u32,
        /// Where the move started, reported in the arrival event.
        origin: NodeId,
    },
    Falling {
        collector: CollectorId,
        elapsed_ms: u32,
    },
    Collected,
    Removed,
}

impl MoveState {
    /// Short status name for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveState::Idle => "idle",
            MoveState::Moving { .. } => "moving",
            MoveState::Falling { .. } => "falling",
            MoveState::Collected => "collected",
            MoveState::Removed => "removed",
        }
    }
}

/// A colored movable piece occupying at most one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    id: PieceId,
    color: Color,
    /// Current node, or `None` while falling or after a terminal transition.
    pub(crate) location: Option<NodeId>,
    pub(crate) state: MoveState,
}

impl Piece {
    pub fn new(id: PieceId, color: Color, at: NodeId) -> Self {
        Self {
            id,
            color,
            location: Some(at),
            state: MoveState::Idle,
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn location(&self) -> Option<NodeId> {
        self.location
    }

    pub fn state(&self) -> &MoveState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == MoveState::Idle
    }

    /// Moving or falling
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self.state,
            MoveState::Moving { .. } | MoveState::Falling { .. }
        )
    }

    /// Collected or removed; no further transitions are accepted.
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, MoveState::Collected | MoveState::Removed)
    }

    /// Fraction of the current step or fall already travelled, for
    /// interpolated display. Idle and terminal pieces report 0.
    pub fn progress(&self) -> f32 {
        match &self.state {
            MoveState::Moving { elapsed_ms, .. } => {
                (*elapsed_ms as f32 / marbleway_types::STEP_MS as f32).min(1.0)
            }
            MoveState::Falling { elapsed_ms, .. } => {
                (*elapsed_ms as f32 / marbleway_types::FALL_MS as f32).min(1.0)
            }
            _ => 0.0,
        }
    }
}
