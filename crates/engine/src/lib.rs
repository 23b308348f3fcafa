//! Engine module - level loading and the session driver
//!
//! The level loader turns a JSON topology document into a validated game
//! state; the session wires pointer input, the core tick loop, and the
//! injected feedback/progress collaborators together.

pub mod level;
pub mod session;

// Re-export commonly used types
pub use level::{load_level, LevelDoc, LevelLayout};
pub use session::{FeedbackSink, ProgressStore, Session};
