//! Core types module - shared identifiers, colors, and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making
//! them usable in any context (core rules, input handling, rendering).
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Fixed timestep interval (~60 FPS) |
//! | `STEP_MS` | 120 | Travel time for one graph edge |
//! | `FALL_MS` | 240 | Fall time from an entry node into a collector |
//! | `HOLD_THRESHOLD_MS` | 250 | Hold time that promotes a press to a drag |
//!
//! `DRAG_THRESHOLD` (0.75) is the companion spatial threshold, in front-end
//! units: pointer displacement past it also promotes a press to a drag.
//!
//! # Examples
//!
//! ```
//! use marbleway_types::{Color, NodeId, PieceId, Point};
//!
//! // Identifiers are cheap copyable newtypes with compact display forms.
//! let node = NodeId(4);
//! let piece = PieceId(0);
//! assert_eq!(format!("{node} holds {piece}"), "n4 holds p0");
//!
//! // Colors round-trip through their lowercase names.
//! let color = Color::from_str("red").unwrap();
//! assert_eq!(color.as_str(), "red");
//!
//! // Pointer positions are plain 2D points.
//! let dist = Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0));
//! assert_eq!(dist, 5.0);
//! ```

/// Fixed tick length for the cooperative update loop (milliseconds)
pub const TICK_MS: u32 = 16;

/// Time a piece takes to travel one graph edge (milliseconds)
pub const STEP_MS: u32 = 120;

/// Time a piece takes to fall from a collector's entry node into the
/// collector (milliseconds)
pub const FALL_MS: u32 = 240;

/// Holding a press this long promotes it to a drag
pub const HOLD_THRESHOLD_MS: u32 = 250;

/// Moving the pointer this far from the press origin promotes it to a drag
/// (world units; the front-end decides what a unit is)
pub const DRAG_THRESHOLD: f32 = 0.75;

/// Graph vertex identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// Movable piece identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId(pub u32);

/// Collector identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectorId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl std::fmt::Display for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl std::fmt::Display for CollectorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Piece / collector color palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
}

impl Color {
    /// Parse color from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(Color::Red),
            "blue" => Some(Color::Blue),
            "green" => Some(Color::Green),
            "yellow" => Some(Color::Yellow),
            "purple" => Some(Color::Purple),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Purple => "purple",
        }
    }
}

/// 2D pointer position in front-end units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}
