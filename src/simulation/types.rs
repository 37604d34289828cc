//! Core types for the subway simulation
//!
//! These are plain data types shared by every component of the engine.

use serde::{Deserialize, Serialize};

/// Identifier of a station, a dense index into the network topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StationId(pub usize);

/// Identifier of a train, its position in the fleet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TrainId(pub usize);

/// The line a segment belongs to and a train runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Line {
    Red,
    Blue,
    /// Drawn dashed on the map
    Yellow,
}

impl Line {
    pub fn name(&self) -> &'static str {
        match self {
            Line::Red => "red",
            Line::Blue => "blue",
            Line::Yellow => "yellow",
        }
    }

    /// Share of capacity a freshly created train on this line starts with
    pub fn default_load_factor(&self) -> f64 {
        match self {
            Line::Red => 0.6,
            Line::Blue => 0.4,
            Line::Yellow => 0.5,
        }
    }

    pub fn is_dashed(&self) -> bool {
        matches!(self, Line::Yellow)
    }

    /// Character used for this line's segments in the terminal map
    pub fn map_glyph(&self) -> char {
        match self {
            Line::Red => '=',
            Line::Blue => '~',
            Line::Yellow => ':',
        }
    }
}

/// Direction of travel along a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// A 2D layout position in map units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Move `step` units along the straight line towards `target`.
    /// Returns the target itself when it is closer than `step`.
    pub fn step_towards(&self, target: &Position, step: f64) -> Position {
        let distance = self.distance(target);
        if distance <= step || distance == 0.0 {
            return *target;
        }
        Position {
            x: self.x + (target.x - self.x) / distance * step,
            y: self.y + (target.y - self.y) / distance * step,
        }
    }

    /// Whether `other` lies strictly inside the axis-aligned box of half-width
    /// `radius` centred on this position
    pub fn within_box(&self, other: &Position, radius: f64) -> bool {
        (self.x - other.x).abs() < radius && (self.y - other.y).abs() < radius
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One tick represents one simulated second
pub const SECONDS_PER_TICK: f64 = 1.0;
