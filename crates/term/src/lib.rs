//! Terminal front-end glue: a small renderer and a grid view that maps the
//! level onto character cells and answers pointer picking queries.

pub mod renderer;
pub mod view;

pub use renderer::TerminalRenderer;
pub use view::{GridView, ScenePicker};
