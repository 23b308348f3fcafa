//! Terminal Marbleway runner (default binary).
//!
//! Drag colored pieces along the graph with the mouse and drop them on the
//! collector; press a collector to pull the nearest matching piece in.
//! Uses crossterm mouse capture for input and a plain full-frame renderer.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};

use marbleway::engine::{load_level, FeedbackSink, ProgressStore, Session};
use marbleway::input::PointerEvent;
use marbleway::term::{GridView, TerminalRenderer};
use marbleway::types::{CollectorId, PieceId, Point, TICK_MS};

const INTRO_LEVEL: &str = include_str!("../demos/levels/intro.json");

/// Feedback sink that keeps a one-line status message for the view.
#[derive(Debug, Default)]
struct StatusLine {
    message: Option<String>,
}

impl FeedbackSink for StatusLine {
    fn on_blocked(&mut self, _piece: Option<PieceId>) {
        self.message = Some("blocked".to_string());
    }

    fn on_piece_moved(&mut self, _piece: PieceId, _from: marbleway::types::NodeId, _to: marbleway::types::NodeId) {
        self.message = None;
    }

    fn on_piece_collected(&mut self, _piece: PieceId, _collector: CollectorId) {
        self.message = Some("collected!".to_string());
    }
}

/// Stand-in for the real persistence layer.
#[derive(Debug, Default)]
struct LogStore;

impl ProgressStore for LogStore {
    fn level_complete(&mut self, level_id: u32) {
        tracing::info!(level_id, "level complete");
    }
}

type DemoSession = Session<StatusLine, LogStore>;

fn new_session() -> Result<(DemoSession, GridView)> {
    let (game, layout) = load_level(INTRO_LEVEL)?;
    let level_id = layout.id();
    let view = GridView::new(layout);
    let session = Session::new(level_id, game, StatusLine::default(), LogStore);
    Ok((session, view))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer) -> Result<()> {
    let (mut session, mut view) = new_session()?;

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);

    loop {
        let picker = view.picker(session.game());

        // Render.
        let lines = view.render(
            session.game(),
            session.interaction().highlight(),
            session.sink().message.as_deref(),
        );
        term.draw(&lines)?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('r') => {
                        (session, view) = new_session()?;
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => {
                    let pos = Point::new(mouse.column as f32, mouse.row as f32);
                    let pointer_event = match mouse.kind {
                        MouseEventKind::Down(MouseButton::Left) => {
                            Some(PointerEvent::Press(pos))
                        }
                        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                            Some(PointerEvent::Move(pos))
                        }
                        MouseEventKind::Up(MouseButton::Left) => {
                            Some(PointerEvent::Release(pos))
                        }
                        _ => None,
                    };
                    if let Some(pointer_event) = pointer_event {
                        session.handle_pointer(pointer_event, &picker);
                    }
                }
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            session.tick(TICK_MS, &picker);
        }
    }
}
