//! Fixed-size tile grid with paired wall bookkeeping and reachability queries.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{Direction, Pos};

use super::tile::{SpecialKind, Tile};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, tiles: vec![Tile::default(); width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y as usize) * self.width + (pos.x as usize))
    }

    pub fn tile(&self, pos: Pos) -> Option<&Tile> {
        self.index(pos).map(|index| &self.tiles[index])
    }

    pub fn tile_mut(&mut self, pos: Pos) -> Option<&mut Tile> {
        self.index(pos).map(|index| &mut self.tiles[index])
    }

    /// Row-major positions, top row first.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let (width, height) = (self.width as i32, self.height as i32);
        (0..height).flat_map(move |y| (0..width).map(move |x| Pos::new(x, y)))
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Pos, &Tile)> {
        self.positions().zip(self.tiles.iter())
    }

    pub fn neighbours(&self, pos: Pos) -> impl Iterator<Item = (Direction, Pos)> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |direction| (direction, pos.step(direction)))
            .filter(|&(_, next)| self.in_bounds(next))
    }

    /// Clears the wall on both sides of the shared edge. A side facing out of
    /// the grid is only cleared on `pos`.
    pub fn open_wall(&mut self, pos: Pos, direction: Direction) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.remove_walls(&[direction]);
        }
        if let Some(tile) = self.tile_mut(pos.step(direction)) {
            tile.remove_walls(&[direction.opposite()]);
        }
    }

    pub fn close_wall(&mut self, pos: Pos, direction: Direction) {
        if let Some(tile) = self.tile_mut(pos) {
            tile.add_walls(&[direction]);
        }
        if let Some(tile) = self.tile_mut(pos.step(direction)) {
            tile.add_walls(&[direction.opposite()]);
        }
    }

    pub fn is_open(&self, pos: Pos, direction: Direction) -> bool {
        self.tile(pos).is_some_and(|tile| !tile.has_wall(direction))
    }

    fn open_neighbours(&self, pos: Pos) -> impl Iterator<Item = Pos> + '_ {
        self.neighbours(pos)
            .filter(move |&(direction, _)| self.is_open(pos, direction))
            .map(|(_, next)| next)
    }

    pub fn is_trap(&self, pos: Pos) -> bool {
        self.tile(pos).is_some_and(|tile| tile.special_kind() == SpecialKind::Trap)
    }

    /// Every tile reachable from `start` through open walls without entering a
    /// tile for which `blocked` holds.
    pub fn reachable_from(&self, start: Pos, blocked: impl Fn(Pos) -> bool) -> BTreeSet<Pos> {
        let mut seen = BTreeSet::new();
        if !self.in_bounds(start) || blocked(start) {
            return seen;
        }
        let mut stack = vec![start];
        seen.insert(start);
        while let Some(current) = stack.pop() {
            for next in self.open_neighbours(current) {
                if !blocked(next) && seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen
    }

    /// Whether `target` can be reached from `start` through open walls while
    /// never stepping on `avoid` or on a trap.
    pub fn check_connect(&self, start: Pos, target: Pos, avoid: Pos) -> bool {
        if !self.in_bounds(start) || !self.in_bounds(target) || start == avoid || target == avoid {
            return false;
        }
        let mut visited = vec![false; self.tiles.len()];
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            let Some(index) = self.index(current) else { continue };
            if visited[index] {
                continue;
            }
            visited[index] = true;
            for next in self.open_neighbours(current) {
                if next != avoid && !self.is_trap(next) {
                    stack.push(next);
                }
            }
        }
        false
    }

    /// Number of open walls between pairs of in-grid tiles.
    pub fn open_edge_count(&self) -> usize {
        self.positions()
            .flat_map(|pos| [(pos, Direction::Right), (pos, Direction::Down)])
            .filter(|&(pos, direction)| {
                self.in_bounds(pos.step(direction)) && self.is_open(pos, direction)
            })
            .count()
    }

    pub fn count_special(&self, kind: SpecialKind) -> usize {
        self.tiles.iter().filter(|tile| tile.special_kind() == kind).count()
    }
}
