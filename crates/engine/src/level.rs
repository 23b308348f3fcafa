//! Level topology loader
//!
//! Levels arrive as JSON documents: nodes with grid positions, undirected
//! edges, initial piece placements, and collectors. The loader validates
//! everything the core assumes pre-validated: self-loops, dangling node
//! references, and double occupancy are rejected here. Node positions are
//! layout metadata for front-ends, never core state.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use marbleway_core::{GameState, LevelGraph};
use marbleway_types::{Color, NodeId};

/// On-disk level document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDoc {
    pub id: u32,
    pub nodes: Vec<NodeDoc>,
    #[serde(default)]
    pub edges: Vec<(u32, u32)>,
    #[serde(default)]
    pub pieces: Vec<PieceDoc>,
    #[serde(default)]
    pub collectors: Vec<CollectorDoc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDoc {
    pub id: u32,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceDoc {
    pub node: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorDoc {
    pub entry: u32,
    pub accepted: String,
    #[serde(default)]
    pub cycle: Vec<String>,
}

/// Node grid positions for rendering and pointer hit-testing.
#[derive(Debug, Clone, Default)]
pub struct LevelLayout {
    id: u32,
    positions: HashMap<NodeId, (i32, i32)>,
}

impl LevelLayout {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn position(&self, node: NodeId) -> Option<(i32, i32)> {
        self.positions.get(&node).copied()
    }

    pub fn positions(&self) -> impl Iterator<Item = (NodeId, (i32, i32))> + '_ {
        self.positions.iter().map(|(&n, &p)| (n, p))
    }
}

/// Parse and validate a JSON level document.
pub fn load_level(doc: &str) -> Result<(GameState, LevelLayout)> {
    let doc: LevelDoc = serde_json::from_str(doc).context("parse level document")?;
    build_level(&doc)
}

/// Build a validated game state from an already-parsed document.
pub fn build_level(doc: &LevelDoc) -> Result<(GameState, LevelLayout)> {
    let mut graph = LevelGraph::new();
    let mut positions = HashMap::new();
    for node in &doc.nodes {
        let id = NodeId(node.id);
        if positions.insert(id, (node.x, node.y)).is_some() {
            bail!("level {}: duplicate node id {}", doc.id, node.id);
        }
        graph.add_node(id);
    }
    for &(a, b) in &doc.edges {
        if !graph.add_edge(NodeId(a), NodeId(b)) {
            bail!(
                "level {}: invalid edge {}-{} (self-loop or unknown node)",
                doc.id,
                a,
                b
            );
        }
    }

    let mut game = GameState::new(graph);
    for collector in &doc.collectors {
        let accepted = parse_color(&collector.accepted)?;
        let cycle = collector
            .cycle
            .iter()
            .map(|c| parse_color(c))
            .collect::<Result<Vec<_>>>()?;
        game.add_collector(NodeId(collector.entry), accepted, cycle)
            .ok_or_else(|| {
                anyhow!(
                    "level {}: collector entry {} unknown or already used",
                    doc.id,
                    collector.entry
                )
            })?;
    }
    for piece in &doc.pieces {
        let color = parse_color(&piece.color)?;
        game.spawn_piece(color, NodeId(piece.node)).ok_or_else(|| {
            anyhow!(
                "level {}: piece placement at node {} unknown or occupied",
                doc.id,
                piece.node
            )
        })?;
    }

    Ok((
        game,
        LevelLayout {
            id: doc.id,
            positions,
        },
    ))
}

fn parse_color(s: &str) -> Result<Color> {
    Color::from_str(s).ok_or_else(|| anyhow!("unknown color {s:?}"))
}
