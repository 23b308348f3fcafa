//! Grid view: renders a level onto character cells and resolves pointer
//! positions back to pieces, collectors, and nodes.
//!
//! Each grid node occupies a 3-character glyph; nodes are 6 columns and
//! 2 rows apart so edges can be drawn between them. Collector markers sit
//! one row below their entry node.

use std::collections::HashMap;

use marbleway_core::GameState;
use marbleway_engine::LevelLayout;
use marbleway_input::{Highlight, PickTarget, PointerPicker, Reachability};
use marbleway_types::{Color, NodeId, Point};

const CELL_W: i32 = 6;
const CELL_H: i32 = 2;
const ORIGIN_X: i32 = 2;
const ORIGIN_Y: i32 = 1;

fn color_char(color: Color) -> char {
    match color {
        Color::Red => 'R',
        Color::Blue => 'B',
        Color::Green => 'G',
        Color::Yellow => 'Y',
        Color::Purple => 'P',
    }
}

/// Maps level grid coordinates onto screen cells.
pub struct GridView {
    layout: LevelLayout,
}

impl GridView {
    pub fn new(layout: LevelLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    /// Screen column/row of a node glyph's left character
    fn glyph_origin(&self, node: NodeId) -> Option<(i32, i32)> {
        let (gx, gy) = self.layout.position(node)?;
        Some((ORIGIN_X + gx * CELL_W, ORIGIN_Y + gy * CELL_H))
    }

    /// Snapshot the pickable targets for the current occupancy.
    ///
    /// The snapshot is rebuilt every frame; the core re-validates whatever
    /// the picker resolves, so a frame of staleness is harmless.
    pub fn picker(&self, game: &GameState) -> ScenePicker {
        let mut targets = HashMap::new();
        for (node, _) in self.layout.positions() {
            let Some((col, row)) = self.glyph_origin(node) else {
                continue;
            };
            let target = match game.graph().occupant(node) {
                Some(piece) => PickTarget::Piece(piece),
                None => PickTarget::Node(node),
            };
            for dx in 0..3 {
                targets.insert((col + dx, row), target);
            }
            if let Some(collector) = game.collector_at_entry(node) {
                for dx in 0..3 {
                    targets.insert((col + dx, row + 1), PickTarget::Collector(collector));
                }
            }
        }
        ScenePicker { targets }
    }

    /// Render the level plus a status block into screen lines.
    pub fn render(
        &self,
        game: &GameState,
        highlight: Option<Highlight>,
        message: Option<&str>,
    ) -> Vec<String> {
        let mut max_col = 0;
        let mut max_row = 0;
        for (node, _) in self.layout.positions() {
            if let Some((col, row)) = self.glyph_origin(node) {
                max_col = max_col.max(col + 3);
                max_row = max_row.max(row + 2);
            }
        }
        let width = (max_col + 2) as usize;
        let height = (max_row + 1) as usize;
        let mut grid = vec![vec![' '; width]; height];

        // Edges first so glyphs and markers draw over them.
        let nodes: Vec<NodeId> = game.graph().nodes().collect();
        for &a in &nodes {
            for b in game.graph().neighbors(a) {
                if b <= a {
                    continue;
                }
                let (Some((ac, ar)), Some((bc, br))) =
                    (self.glyph_origin(a), self.glyph_origin(b))
                else {
                    continue;
                };
                if ar == br {
                    let (lo, hi) = (ac.min(bc), ac.max(bc));
                    for col in (lo + 3)..hi {
                        grid[ar as usize][col as usize] = '-';
                    }
                } else if ac == bc {
                    let (lo, hi) = (ar.min(br), ar.max(br));
                    for row in (lo + 1)..hi {
                        grid[row as usize][(ac + 1) as usize] = '|';
                    }
                }
            }
        }

        // Node glyphs.
        for &node in &nodes {
            let Some((col, row)) = self.glyph_origin(node) else {
                continue;
            };
            let inner = match game.graph().occupant(node).and_then(|p| game.piece(p)) {
                Some(piece) => color_char(piece.color()),
                None => '.',
            };
            let (open, close) = match highlight {
                Some(h) if h.node == node => match h.reach {
                    Reachability::NeighborClear => ('<', '>'),
                    Reachability::NeighborOccupied => ('{', '}'),
                    Reachability::NotNeighbor => ('(', ')'),
                },
                _ => ('(', ')'),
            };
            grid[row as usize][col as usize] = open;
            grid[row as usize][(col + 1) as usize] = inner;
            grid[row as usize][(col + 2) as usize] = close;
        }

        // Collector markers below their entries.
        for collector in game.collectors() {
            let Some((col, row)) = self.glyph_origin(collector.entry()) else {
                continue;
            };
            let row = (row + 1) as usize;
            grid[row][col as usize] = '[';
            grid[row][(col + 1) as usize] = color_char(collector.accepted());
            grid[row][(col + 2) as usize] = ']';
        }

        let mut lines: Vec<String> = grid
            .into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect();

        let progress = game.progress();
        lines.push(String::new());
        lines.push(format!(
            "collected {}/{}",
            progress.collected(),
            progress.total()
        ));
        if game.game_over() {
            lines.push("GAME OVER - press r to retry, q to quit".to_string());
        } else if game.level_complete() {
            lines.push("LEVEL COMPLETE - press q to quit".to_string());
        } else if let Some(msg) = message {
            lines.push(msg.to_string());
        }
        lines
    }
}

/// Owned per-frame pick snapshot.
pub struct ScenePicker {
    targets: HashMap<(i32, i32), PickTarget>,
}

impl PointerPicker for ScenePicker {
    fn pick(&self, position: Point) -> PickTarget {
        let key = (position.x.round() as i32, position.y.round() as i32);
        self.targets.get(&key).copied().unwrap_or(PickTarget::Nothing)
    }
}
