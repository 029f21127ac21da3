//! Start bay selection, depth-first maze carving and the braiding pass.

use log::debug;

use crate::types::{Direction, Pos};

use super::grid::Grid;
use super::model::StartPosition;
use super::seed::GenRng;

/// Distance from the bay that makes a border tile a good end tile, capped at 10.
fn end_tile_min_distance(width: usize, height: usize) -> u32 {
    ((width + height) / 2 + 1).min(10) as u32
}

pub fn braid_iterations(width: usize, height: usize) -> usize {
    let half_perimeter = (width + height) / 2;
    half_perimeter * half_perimeter
}

/// Chooses a random grid edge, puts the bay just outside it and opens the
/// passage between the bay and its entry tile.
pub(super) fn choose_start(grid: &mut Grid, rng: &mut GenRng) -> StartPosition {
    let width = grid.width() as i32;
    let height = grid.height() as i32;
    let edge = Direction::from_index(rng.below(4));
    let (bay, entry) = match edge {
        Direction::Up => {
            let x = rng.below(grid.width()) as i32;
            (Pos::new(x, -1), Pos::new(x, 0))
        }
        Direction::Right => {
            let y = rng.below(grid.height()) as i32;
            (Pos::new(width, y), Pos::new(width - 1, y))
        }
        Direction::Down => {
            let x = rng.below(grid.width()) as i32;
            (Pos::new(x, height), Pos::new(x, height - 1))
        }
        Direction::Left => {
            let y = rng.below(grid.height()) as i32;
            (Pos::new(-1, y), Pos::new(0, y))
        }
    };
    let facing = edge.opposite();
    grid.open_wall(entry, edge);
    debug!("start bay at {bay}, entry {entry}, facing {facing:?}");
    StartPosition { bay, entry, facing }
}

/// Cells just outside the grid, each paired with the border tile it touches.
/// Corner tiles appear once per outer side.
fn border_exits(grid: &Grid) -> Vec<(Pos, Pos)> {
    grid.positions()
        .flat_map(|pos| Direction::ALL.into_iter().map(move |side| (pos.step(side), pos)))
        .filter(|&(outside, _)| !grid.in_bounds(outside))
        .collect()
}

/// Picks a border tile whose outside cell is far enough from the bay, or the
/// tile with the farthest outside cell when none is.
pub(super) fn choose_end_tile(grid: &Grid, start: &StartPosition, rng: &mut GenRng) -> Pos {
    let min_distance = end_tile_min_distance(grid.width(), grid.height());
    let exits = border_exits(grid);
    let far_enough: Vec<Pos> = exits
        .iter()
        .filter(|(outside, _)| outside.manhattan(start.bay).saturating_sub(1) >= min_distance)
        .map(|&(_, tile)| tile)
        .collect();
    if let Some(&pos) = rng.pick(&far_enough) {
        return pos;
    }

    let mut best = start.entry;
    let mut best_distance = 0_u32;
    for (outside, tile) in exits {
        let distance = outside.manhattan(start.bay);
        if distance > best_distance {
            best = tile;
            best_distance = distance;
        }
    }
    best
}

/// Iterative randomized depth-first carve from `start`, leaving a spanning tree.
pub fn carve_perfect_maze(grid: &mut Grid, start: Pos, rng: &mut GenRng) {
    if !grid.in_bounds(start) {
        return;
    }
    let width = grid.width();
    let mut visited = vec![false; width * grid.height()];
    let index = move |pos: Pos| (pos.y as usize) * width + (pos.x as usize);
    visited[index(start)] = true;
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let unvisited: Vec<(Direction, Pos)> =
            grid.neighbours(current).filter(|&(_, next)| !visited[index(next)]).collect();
        match rng.pick(&unvisited) {
            Some(&(direction, next)) => {
                grid.open_wall(current, direction);
                visited[index(next)] = true;
                stack.push(next);
            }
            None => {
                stack.pop();
            }
        }
    }
}

/// Opens `iterations` random walls between in-grid neighbours. Already open
/// walls are left as they are.
pub fn braid(grid: &mut Grid, iterations: usize, rng: &mut GenRng) {
    for _ in 0..iterations {
        let pos = Pos::new(rng.below(grid.width()) as i32, rng.below(grid.height()) as i32);
        let directions: Vec<Direction> =
            grid.neighbours(pos).map(|(direction, _)| direction).collect();
        if let Some(&direction) = rng.pick(&directions) {
            grid.open_wall(pos, direction);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;

    fn carved(width: usize, height: usize, seed: u64) -> Grid {
        let mut grid = Grid::new(width, height);
        let mut rng = GenRng::seed_from_u64(seed);
        carve_perfect_maze(&mut grid, Pos::new(0, 0), &mut rng);
        grid
    }

    #[test]
    fn braid_iteration_count_uses_floor_of_half_perimeter() {
        assert_eq!(braid_iterations(5, 5), 25);
        assert_eq!(braid_iterations(10, 7), 64);
        assert_eq!(braid_iterations(2, 3), 4);
    }

    #[test]
    fn start_bay_sits_outside_and_faces_the_entry() {
        for seed in 0..40 {
            let mut grid = Grid::new(6, 4);
            let mut rng = GenRng::seed_from_u64(seed);
            let start = choose_start(&mut grid, &mut rng);
            assert!(!grid.in_bounds(start.bay));
            assert!(grid.in_bounds(start.entry));
            assert_eq!(start.bay.step(start.facing), start.entry);
            assert!(grid.is_open(start.entry, start.facing.opposite()));
        }
    }

    #[test]
    fn end_tile_is_on_the_border_and_away_from_the_bay() {
        for seed in 0..40 {
            let mut grid = Grid::new(9, 7);
            let mut rng = GenRng::seed_from_u64(seed);
            let start = choose_start(&mut grid, &mut rng);
            let end = choose_end_tile(&grid, &start, &mut rng);
            let min_distance = end_tile_min_distance(9, 7);
            let far_exit = Direction::ALL.into_iter().map(|side| end.step(side)).any(|outside| {
                !grid.in_bounds(outside)
                    && outside.manhattan(start.bay).saturating_sub(1) >= min_distance
            });
            assert!(far_exit, "seed {seed}: {end}");
        }
    }

    #[test]
    fn distance_is_measured_to_the_cell_outside_the_end_tile() {
        let grid = Grid::new(4, 4);
        let start = StartPosition {
            bay: Pos::new(-1, 0),
            entry: Pos::new(0, 0),
            facing: Direction::Right,
        };
        let mut chosen = BTreeSet::new();
        for seed in 0..200 {
            let mut rng = GenRng::seed_from_u64(seed);
            chosen.insert(choose_end_tile(&grid, &start, &mut rng));
        }
        // (3, 1) is only 4 steps past the bay, but its right-hand outside cell is 5.
        let expected: BTreeSet<Pos> =
            [(3, 1), (3, 2), (3, 3), (2, 3), (1, 3)].map(|(x, y)| Pos::new(x, y)).into();
        assert_eq!(chosen, expected);
    }

    #[test]
    fn tiny_grids_still_reach_the_opposite_corner() {
        let mut grid = Grid::new(2, 2);
        let start = StartPosition {
            bay: Pos::new(-1, 0),
            entry: Pos::new(0, 0),
            facing: Direction::Right,
        };
        grid.open_wall(start.entry, Direction::Left);
        let mut rng = GenRng::seed_from_u64(3);
        assert_eq!(choose_end_tile(&grid, &start, &mut rng), Pos::new(1, 1));
    }

    #[test]
    fn braiding_only_adds_openings() {
        let mut grid = carved(6, 6, 77);
        let before = grid.open_edge_count();
        let mut rng = GenRng::seed_from_u64(78);
        braid(&mut grid, braid_iterations(6, 6), &mut rng);
        assert!(grid.open_edge_count() >= before);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn carving_yields_a_spanning_tree(
            seed in any::<u64>(),
            width in 2_usize..12,
            height in 2_usize..12,
        ) {
            let grid = carved(width, height, seed);
            prop_assert_eq!(grid.open_edge_count(), width * height - 1);
            prop_assert_eq!(grid.reachable_from(Pos::new(0, 0), |_| false).len(), width * height);
        }
    }
}
