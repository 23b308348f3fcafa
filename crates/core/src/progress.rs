//! Match & progress state
//!
//! Per-level counters and terminal flags. Mutated only by the game state's
//! collection resolution; reset by loading a fresh level. Game-over and
//! level-complete are mutually exclusive and, once set, terminal.

/// Per-level match state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchState {
    total: u32,
    collected: u32,
    game_over: bool,
    level_complete: bool,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a piece toward the level total.
    pub(crate) fn register_piece(&mut self) {
        self.total += 1;
    }

    /// Record a correct collection. Returns true when this collection
    /// completed the level (so the completion event fires exactly once).
    pub(crate) fn record_collected(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.collected += 1;
        if self.collected == self.total {
            self.level_complete = true;
            return true;
        }
        false
    }

    /// Set the game-over flag. Returns true only when newly set; a level
    /// already complete can no longer fail.
    pub(crate) fn set_game_over(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.game_over = true;
        true
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn collected(&self) -> u32 {
        self.collected
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn level_complete(&self) -> bool {
        self.level_complete
    }

    /// Either terminal flag set; no further moves are accepted.
    pub fn is_terminal(&self) -> bool {
        self.game_over || self.level_complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_fires_once_at_total() {
        let mut m = MatchState::new();
        m.register_piece();
        m.register_piece();

        assert!(!m.record_collected());
        assert!(!m.level_complete());
        assert!(m.record_collected());
        assert!(m.level_complete());
        assert_eq!(m.collected(), 2);
        assert_eq!(m.total(), 2);

        // Further collections are ignored once terminal.
        assert!(!m.record_collected());
        assert_eq!(m.collected(), 2);
    }

    #[test]
    fn test_flags_are_mutually_exclusive() {
        let mut m = MatchState::new();
        m.register_piece();
        assert!(m.record_collected());
        assert!(!m.set_game_over());
        assert!(!m.game_over());

        let mut m = MatchState::new();
        m.register_piece();
        assert!(m.set_game_over());
        assert!(!m.set_game_over());
        assert!(!m.record_collected());
        assert!(!m.level_complete());
    }
}
