use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer tile coordinate. `x` grows to the right, `y` grows downwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self { x: self.x + dx, y: self.y + dy }
    }

    pub fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four tile sides, in the fixed order up, right, down, left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    /// Panics when `index > 3`; side indices come from code, not input.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index]
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

/// Point on the simulator floor plane (`x` across, `z` along the grid's `y`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub z: f64,
}

impl WorldPoint {
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.z - other.z)
    }
}

/// Axis-aligned rectangle on the floor plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: WorldPoint,
    pub max: WorldPoint,
}

impl Rect {
    pub const fn new(min: WorldPoint, max: WorldPoint) -> Self {
        Self { min, max }
    }

    pub fn centered(center: WorldPoint, half_width: f64, half_depth: f64) -> Self {
        Self {
            min: WorldPoint::new(center.x - half_width, center.z - half_depth),
            max: WorldPoint::new(center.x + half_width, center.z + half_depth),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn depth(&self) -> f64 {
        self.max.z - self.min.z
    }

    pub fn center(&self) -> WorldPoint {
        WorldPoint::new((self.min.x + self.max.x) / 2.0, (self.min.z + self.max.z) / 2.0)
    }

    pub fn contains(&self, point: WorldPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Shrinks every edge by `margin`; `None` when nothing is left.
    pub fn inset(&self, margin: f64) -> Option<Self> {
        let inset = Self {
            min: WorldPoint::new(self.min.x + margin, self.min.z + margin),
            max: WorldPoint::new(self.max.x - margin, self.max.z - margin),
        };
        (inset.min.x <= inset.max.x && inset.min.z <= inset.max.z).then_some(inset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_directions_cancel_offsets() {
        for direction in Direction::ALL {
            let pos = Pos::new(3, 4);
            assert_eq!(pos.step(direction).step(direction.opposite()), pos);
            assert_eq!(Direction::from_index(direction.index()), direction);
        }
    }

    #[test]
    #[should_panic]
    fn side_index_out_of_range_panics() {
        let _ = Direction::from_index(4);
    }

    #[test]
    fn inset_collapses_small_rectangles() {
        let rect = Rect::centered(WorldPoint::new(0.0, 0.0), 0.1, 0.1);
        assert!(rect.inset(0.05).is_some());
        assert!(rect.inset(0.2).is_none());
    }

    #[test]
    fn touching_rectangles_do_not_overlap() {
        let left = Rect::new(WorldPoint::new(0.0, 0.0), WorldPoint::new(1.0, 1.0));
        let right = Rect::new(WorldPoint::new(1.0, 0.0), WorldPoint::new(2.0, 1.0));
        assert!(!left.overlaps(&right));
        assert!(left.overlaps(&Rect::centered(WorldPoint::new(1.0, 0.5), 0.1, 0.1)));
    }
}
