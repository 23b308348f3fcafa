//! Pathfinder - unweighted shortest-path search over the level graph
//!
//! Breadth-first search over the adjacency relation, deliberately ignoring
//! occupancy: "nearest graph path" and "is it currently walkable" are
//! independent questions, and the occupancy guard answers the second one.

use std::collections::{HashMap, HashSet, VecDeque};

use marbleway_types::NodeId;

use crate::graph::LevelGraph;

/// Ordered node sequence from a source (exclusive) to a destination
/// (inclusive). An empty path means "already at the destination".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    nodes: Vec<NodeId>,
}

impl Path {
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    pub fn empty() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of hops
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Final node of the path, if non-empty
    pub fn destination(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

/// Shortest-hop path from `start` to `goal`, ignoring occupancy.
///
/// Returns `None` when either endpoint is unknown or the endpoints are
/// disconnected; `start == goal` yields the empty path. Among equal-length
/// paths the one discovered first under neighbor-iteration order wins
/// (implementation-defined insertion order, not a lexicographic guarantee).
pub fn find_path(graph: &LevelGraph, start: NodeId, goal: NodeId) -> Option<Path> {
    if !graph.contains(start) || !graph.contains(goal) {
        return None;
    }
    if start == goal {
        return Some(Path::empty());
    }

    // Iterative BFS; `came_from` doubles as the visited set.
    let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
    let mut frontier: VecDeque<NodeId> = VecDeque::new();
    frontier.push_back(start);
    came_from.insert(start, start);

    while let Some(current) = frontier.pop_front() {
        for next in graph.neighbors(current) {
            if came_from.contains_key(&next) {
                continue;
            }
            came_from.insert(next, current);
            if next == goal {
                // Walk predecessors back to (but excluding) the start.
                let mut nodes = vec![goal];
                let mut at = current;
                while at != start {
                    nodes.push(at);
                    at = came_from[&at];
                }
                nodes.reverse();
                return Some(Path::new(nodes));
            }
            frontier.push_back(next);
        }
    }

    None
}

/// Breadth-first scan outward from `start` (inclusive), returning the first
/// node in discovery order for which `visit` returns true.
///
/// Used for automatic piece-to-collector routing: the nearest matching
/// piece is the first one discovered expanding from the collector's entry.
pub fn bfs_find(
    graph: &LevelGraph,
    start: NodeId,
    mut visit: impl FnMut(NodeId) -> bool,
) -> Option<NodeId> {
    if !graph.contains(start) {
        return None;
    }

    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut frontier: VecDeque<NodeId> = VecDeque::new();
    frontier.push_back(start);
    seen.insert(start);

    while let Some(current) = frontier.pop_front() {
        if visit(current) {
            return Some(current);
        }
        for next in graph.neighbors(current) {
            if seen.insert(next) {
                frontier.push_back(next);
            }
        }
    }

    None
}
