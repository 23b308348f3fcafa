//! Collector color cycling
//!
//! A collector accepts one color at a time. After a correct collection its
//! accepted color may advance through an optional cycle list; the next color
//! is the first cycle entry that is not the just-collected color, so the
//! accepted color always changes except in a degenerate one-color cycle.

use marbleway_types::{Color, CollectorId, NodeId};

/// A graph-adjacent sink accepting pieces of one color at a time.
/// Collectors never fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collector {
    id: CollectorId,
    /// Graph node that feeds this collector
    entry: NodeId,
    accepted: Color,
    cycle: Vec<Color>,
    last_collected: Option<Color>,
}

impl Collector {
    pub fn new(id: CollectorId, entry: NodeId, accepted: Color) -> Self {
        Self {
            id,
            entry,
            accepted,
            cycle: Vec::new(),
            last_collected: None,
        }
    }

    /// Attach a color-cycle list
    pub fn with_cycle(mut self, cycle: Vec<Color>) -> Self {
        self.cycle = cycle;
        self
    }

    pub fn id(&self) -> CollectorId {
        self.id
    }

    pub fn entry(&self) -> NodeId {
        self.entry
    }

    pub fn accepted(&self) -> Color {
        self.accepted
    }

    pub fn last_collected(&self) -> Option<Color> {
        self.last_collected
    }

    /// Record a correct collection and rotate the accepted color.
    pub fn record_collection(&mut self, color: Color) {
        self.last_collected = Some(color);
        if self.cycle.is_empty() {
            return;
        }
        for &candidate in &self.cycle {
            if Some(candidate) != self.last_collected {
                self.accepted = candidate;
                return;
            }
        }
        // Every cycle entry equals the just-collected color.
        self.accepted = self.cycle[0];
    }
}
