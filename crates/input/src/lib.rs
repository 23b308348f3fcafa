//! Input module - turns raw pointer events into move intents
//!
//! The interaction state machine disambiguates taps from drags and defers
//! all graph actions to release time; the pointer types define the boundary
//! contract a front-end implements.

pub mod interaction;
pub mod pointer;

// Re-export commonly used types
pub use interaction::{Highlight, Intent, InteractionHandler, Reachability};
pub use pointer::{PickTarget, PointerEvent, PointerPicker};
