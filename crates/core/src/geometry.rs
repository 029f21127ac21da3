//! Mapping from tile coordinates to simulator floor coordinates.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::types::{Direction, Pos, Rect, WorldPoint};

pub const CELL_SIZE: f64 = 0.3;
pub const HALF_CELL: f64 = CELL_SIZE / 2.0;
pub const TILE_SCALE: f64 = 0.3;
pub const WALL_HALF_THICKNESS: f64 = 0.006;
pub const HUMAN_RADIUS: f64 = 0.05;
/// Distance from a tile centre to a victim standing against one of its walls.
pub const HUMAN_WALL_OFFSET: f64 = 0.135;
pub const ROBOT_SPACING: f64 = 0.075;

/// Yaw of an object looking towards `direction`; looking up the grid is 0.
pub fn facing_angle(direction: Direction) -> f64 {
    match direction {
        Direction::Up => 0.0,
        Direction::Right => -FRAC_PI_2,
        Direction::Down => PI,
        Direction::Left => FRAC_PI_2,
    }
}

/// World placement of a `width x height` grid, centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldFrame {
    pub width: usize,
    pub height: usize,
}

impl WorldFrame {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Works for positions just outside the grid as well, such as the start bay.
    pub fn tile_center(&self, pos: Pos) -> WorldPoint {
        let origin_x = (self.width as f64 - 1.0) * CELL_SIZE / 2.0;
        let origin_z = (self.height as f64 - 1.0) * CELL_SIZE / 2.0;
        WorldPoint::new(
            f64::from(pos.x) * CELL_SIZE - origin_x,
            f64::from(pos.y) * CELL_SIZE - origin_z,
        )
    }

    pub fn tile_rect(&self, pos: Pos) -> Rect {
        Rect::centered(self.tile_center(pos), HALF_CELL, HALF_CELL)
    }

    pub fn floor_rect(&self) -> Rect {
        let last = Pos::new(self.width as i32 - 1, self.height as i32 - 1);
        Rect::new(self.tile_rect(Pos::new(0, 0)).min, self.tile_rect(last).max)
    }

    /// Thin rectangle covering the wall on `side` of the tile at `pos`.
    pub fn wall_rect(&self, pos: Pos, side: Direction) -> Rect {
        let center = self.tile_center(pos);
        let (dx, dz) = side.offset();
        let wall_center = WorldPoint::new(
            center.x + f64::from(dx) * HALF_CELL,
            center.z + f64::from(dz) * HALF_CELL,
        );
        if side.is_vertical() {
            Rect::centered(wall_center, HALF_CELL, WALL_HALF_THICKNESS)
        } else {
            Rect::centered(wall_center, WALL_HALF_THICKNESS, HALF_CELL)
        }
    }

    pub fn human_position(&self, pos: Pos, side: Direction) -> WorldPoint {
        let center = self.tile_center(pos);
        let (dx, dz) = side.offset();
        WorldPoint::new(
            center.x + f64::from(dx) * HUMAN_WALL_OFFSET,
            center.z + f64::from(dz) * HUMAN_WALL_OFFSET,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_centred_on_the_origin() {
        let frame = WorldFrame::new(3, 5);
        assert_eq!(frame.tile_center(Pos::new(1, 2)), WorldPoint::new(0.0, 0.0));
        let floor = frame.floor_rect();
        assert!((floor.min.x + floor.max.x).abs() < 1e-9);
        assert!((floor.width() - 0.9).abs() < 1e-9);
        assert!((floor.depth() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn bay_outside_the_grid_still_maps_to_a_cell() {
        let frame = WorldFrame::new(4, 4);
        let bay = frame.tile_center(Pos::new(-1, 0));
        let first = frame.tile_center(Pos::new(0, 0));
        assert!((first.x - bay.x - CELL_SIZE).abs() < 1e-9);
    }

    #[test]
    fn humans_stand_in_front_of_their_wall() {
        let frame = WorldFrame::new(2, 2);
        let pos = Pos::new(0, 0);
        let human = frame.human_position(pos, Direction::Left);
        let wall = frame.wall_rect(pos, Direction::Left);
        assert!(human.x > wall.max.x);
        assert!(frame.tile_rect(pos).contains(human));
    }

    #[test]
    fn facing_angles_follow_right_hand_rotation() {
        assert_eq!(facing_angle(Direction::Up), 0.0);
        assert_eq!(facing_angle(Direction::Right), -FRAC_PI_2);
        assert_eq!(facing_angle(Direction::Down), PI);
    }
}
