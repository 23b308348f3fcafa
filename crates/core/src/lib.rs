//! Core module - pure game rules with no UI or I/O dependencies
//!
//! This module contains the level graph, pathfinding, the piece movement
//! state machine, collector color cycling, and the match/progress engine.

pub mod collector;
pub mod game_state;
pub mod graph;
pub mod path;
pub mod piece;
pub mod progress;

// Re-export commonly used types
pub use collector::Collector;
pub use game_state::{GameEvent, GameState, MoveError};
pub use graph::LevelGraph;
pub use path::{find_path, Path};
pub use piece::{MoveState, Piece};
pub use progress::MatchState;
