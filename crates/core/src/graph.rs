//! Graph model - the level's connectivity graph and its occupancy slots
//!
//! Adjacency is undirected and fixed after level load. Occupancy is a
//! back-reference (which piece currently sits on a node), not ownership of
//! the piece. `set_occupant` is the single point of truth for occupancy:
//! every component that changes which node a piece sits on goes through it.

use std::collections::HashMap;

use petgraph::graphmap::UnGraphMap;

use marbleway_types::{NodeId, PieceId};

use crate::path::Path;

/// The level's connectivity graph plus per-node occupancy slots.
#[derive(Debug, Clone, Default)]
pub struct LevelGraph {
    adjacency: UnGraphMap<NodeId, ()>,
    occupants: HashMap<NodeId, PieceId>,
}

impl LevelGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            adjacency: UnGraphMap::new(),
            occupants: HashMap::new(),
        }
    }

    /// Add a node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, node: NodeId) {
        self.adjacency.add_node(node);
    }

    /// Add an undirected edge between two existing nodes.
    /// Returns false for self-loops or unknown endpoints.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) {
            return false;
        }
        self.adjacency.add_edge(a, b, ());
        true
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.adjacency.contains_node(node)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.node_count()
    }

    /// Iterate all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.nodes()
    }

    /// Neighbors of a node in insertion order
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.neighbors(node)
    }

    pub fn is_neighbor(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency.contains_edge(a, b)
    }

    /// Piece currently occupying a node, if any
    pub fn occupant(&self, node: NodeId) -> Option<PieceId> {
        self.occupants.get(&node).copied()
    }

    /// Set or clear a node's occupant.
    ///
    /// No validation happens here; callers preserve the one-occupant
    /// invariant by checking clearance immediately before mutating.
    pub fn set_occupant(&mut self, node: NodeId, piece: Option<PieceId>) {
        match piece {
            Some(p) => {
                self.occupants.insert(node, p);
            }
            None => {
                self.occupants.remove(&node);
            }
        }
    }

    // --- occupancy guard ---

    /// True iff the node has no occupant
    pub fn can_enter(&self, node: NodeId) -> bool {
        self.occupant(node).is_none()
    }

    /// True iff every node on the path is free for `mover`.
    ///
    /// The mover's own current node never appears in a path (paths exclude
    /// their source), but a node occupied by the mover itself still counts
    /// as clear.
    pub fn is_clear(&self, path: &Path, mover: PieceId) -> bool {
        path.nodes()
            .iter()
            .all(|&n| match self.occupant(n) {
                None => true,
                Some(p) => p == mover,
            })
    }
}
