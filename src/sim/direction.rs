//! Headings and mirror reflection
//!
//! Grid vectors use glam's `IVec2` with `x` = column and `y` = row, so
//! `Up` (row -1) is `(0, -1)`.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Pulse heading, in clockwise order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All headings in clockwise order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// One grid step in this heading
    #[inline]
    pub fn vector(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Right => IVec2::new(1, 0),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
        }
    }

    /// Heading pointing the other way
    pub fn reverse(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Heading after striking a mirror
    pub fn reflect(self, mirror: Mirror) -> Self {
        match (mirror, self) {
            (Mirror::UpRight, Direction::Up) => Direction::Right,
            (Mirror::UpRight, Direction::Right) => Direction::Up,
            (Mirror::UpRight, Direction::Down) => Direction::Left,
            (Mirror::UpRight, Direction::Left) => Direction::Down,
            (Mirror::UpLeft, Direction::Up) => Direction::Left,
            (Mirror::UpLeft, Direction::Right) => Direction::Down,
            (Mirror::UpLeft, Direction::Down) => Direction::Right,
            (Mirror::UpLeft, Direction::Left) => Direction::Up,
        }
    }

    /// Heading after leaving a cell that may hold a mirror
    #[inline]
    pub fn through(self, mirror: Option<Mirror>) -> Self {
        mirror.map_or(self, |m| self.reflect(m))
    }
}

/// Mirror orientation
///
/// `UpRight` is the `/` diagonal, `UpLeft` is `\`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mirror {
    UpRight,
    UpLeft,
}

impl Mirror {
    /// The perpendicular orientation
    pub fn flipped(self) -> Self {
        match self {
            Mirror::UpRight => Mirror::UpLeft,
            Mirror::UpLeft => Mirror::UpRight,
        }
    }
}
