//! Marbleway (workspace facade crate).
//!
//! This package keeps a single `marbleway::{core,engine,input,term,types}`
//! public API while the implementation lives in dedicated crates under
//! `crates/`.

pub use marbleway_core as core;
pub use marbleway_engine as engine;
pub use marbleway_input as input;
pub use marbleway_term as term;
pub use marbleway_types as types;
