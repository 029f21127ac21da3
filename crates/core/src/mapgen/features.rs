//! Checkpoint, trap, swamp and victim placement onto the carved maze.

use std::collections::BTreeSet;
use std::iter;
use std::mem;
use std::ops::RangeInclusive;

use log::{debug, info, warn};

use crate::config::RetryLimit;
use crate::error::{Feature, GenerationError};
use crate::geometry::{HUMAN_RADIUS, facing_angle};
use crate::types::{Direction, Pos};

use super::generator::GenerationContext;
use super::grid::Grid;
use super::model::PlacedHuman;
use super::seed::GenRng;
use super::tile::{HumanKind, SpecialKind};

/// One quarter of the grid. Odd sizes make neighbouring quadrants share the
/// middle column or row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Quadrant {
    columns: RangeInclusive<i32>,
    rows: RangeInclusive<i32>,
}

impl Quadrant {
    fn random_tile(&self, rng: &mut GenRng) -> Pos {
        let x = rng.range_inclusive(*self.columns.start() as usize, *self.columns.end() as usize);
        let y = rng.range_inclusive(*self.rows.start() as usize, *self.rows.end() as usize);
        Pos::new(x as i32, y as i32)
    }
}

/// Top-left, top-right, bottom-left, bottom-right.
pub(super) fn quadrants(width: usize, height: usize) -> [Quadrant; 4] {
    let (width, height) = (width as i32, height as i32);
    let left = 0..=(width - 1) / 2;
    let right = width / 2..=width - 1;
    let top = 0..=(height - 1) / 2;
    let bottom = height / 2..=height - 1;
    [
        Quadrant { columns: left.clone(), rows: top.clone() },
        Quadrant { columns: right.clone(), rows: top },
        Quadrant { columns: left, rows: bottom.clone() },
        Quadrant { columns: right, rows: bottom },
    ]
}

/// Draws quadrants without replacement, refilling once all four are used.
#[derive(Default)]
struct QuadrantCycle {
    remaining: Vec<usize>,
}

impl QuadrantCycle {
    fn next(&mut self, rng: &mut GenRng) -> usize {
        if self.remaining.is_empty() {
            self.remaining = (0..4).collect();
        }
        let slot = rng.below(self.remaining.len());
        self.remaining.swap_remove(slot)
    }
}

/// Keeps the entry, the end tile and the tiles open to the entry free of specials.
pub(super) fn reserve_start_area(context: &mut GenerationContext<'_>) {
    let entry = context.start.entry;
    context.disallowed.insert(entry);
    context.disallowed.insert(context.end_tile);
    let open: Vec<Pos> = context
        .grid
        .neighbours(entry)
        .filter(|&(direction, _)| context.grid.is_open(entry, direction))
        .map(|(_, next)| next)
        .collect();
    context.disallowed.extend(open);
}

/// Retries random tiles of `quadrant` until `accept` holds. On failure returns
/// the number of attempts made.
fn retry_in_quadrant(
    quadrant: &Quadrant,
    limit: RetryLimit,
    rng: &mut GenRng,
    mut accept: impl FnMut(Pos) -> bool,
) -> Result<Pos, u32> {
    let mut attempts = 0_u32;
    while limit.allows(attempts) {
        attempts = attempts.saturating_add(1);
        let candidate = quadrant.random_tile(rng);
        if accept(candidate) {
            return Ok(candidate);
        }
    }
    Err(attempts)
}

pub(super) fn place_checkpoints(
    context: &mut GenerationContext<'_>,
) -> Result<(), GenerationError> {
    let quadrants = quadrants(context.config.width, context.config.height);
    let limit = context.config.limits.checkpoint_attempts;
    let mut cycle = QuadrantCycle::default();

    for index in 0..context.config.checkpoints {
        let quadrant = &quadrants[cycle.next(&mut context.feature_rng)];
        let pos = retry_in_quadrant(quadrant, limit, &mut context.feature_rng, |candidate| {
            !context.disallowed.contains(&candidate)
                && context.grid.tile(candidate).is_some_and(|tile| !tile.has_special())
        })
        .map_err(|attempts| GenerationError::PlacementInfeasible {
            feature: Feature::Checkpoint,
            index,
            attempts,
        })?;

        if let Some(tile) = context.grid.tile_mut(pos) {
            tile.set_special(SpecialKind::Checkpoint);
        }
        context.disallowed.insert(pos);
        context.disallowed.extend(Direction::ALL.map(|direction| pos.step(direction)));
        context.report.checkpoints.placed += 1;
        debug!("checkpoint {index} at {pos}");
    }
    info!("placed {} checkpoints", context.report.checkpoints.placed);
    Ok(())
}

/// A trap may not cut any of its open, non-trap neighbours off from the entry.
pub(super) fn trap_keeps_maze_connected(grid: &Grid, entry: Pos, candidate: Pos) -> bool {
    grid.neighbours(candidate)
        .filter(|&(direction, next)| grid.is_open(candidate, direction) && !grid.is_trap(next))
        .all(|(_, next)| grid.check_connect(entry, next, candidate))
}

/// Traps only stay off the entry and end tiles; checkpoint neighbours are fair game.
pub(super) fn place_traps(context: &mut GenerationContext<'_>) -> Result<(), GenerationError> {
    let quadrants = quadrants(context.config.width, context.config.height);
    let limit = context.config.limits.trap_attempts;
    let (entry, end_tile) = (context.start.entry, context.end_tile);
    let mut cycle = QuadrantCycle::default();

    for index in 0..context.config.traps {
        let quadrant = &quadrants[cycle.next(&mut context.feature_rng)];
        let pos = retry_in_quadrant(quadrant, limit, &mut context.feature_rng, |candidate| {
            candidate != entry
                && candidate != end_tile
                && context.grid.tile(candidate).is_some_and(|tile| !tile.has_special())
                && trap_keeps_maze_connected(&context.grid, entry, candidate)
        })
        .map_err(|attempts| GenerationError::PlacementInfeasible {
            feature: Feature::Trap,
            index,
            attempts,
        })?;

        if let Some(tile) = context.grid.tile_mut(pos) {
            tile.set_special(SpecialKind::Trap);
        }
        context.report.traps.placed += 1;
        debug!("trap {index} at {pos}");
    }
    info!("placed {} traps", context.report.traps.placed);
    Ok(())
}

pub(super) fn place_swamps(context: &mut GenerationContext<'_>) {
    let attempts = context.config.limits.swamp_attempts;
    for index in 0..context.config.swamps {
        let mut placed = false;
        for _ in 0..attempts {
            let candidate = Pos::new(
                context.feature_rng.below(context.config.width) as i32,
                context.feature_rng.below(context.config.height) as i32,
            );
            if !context.is_free(candidate) {
                continue;
            }
            if let Some(tile) = context.grid.tile_mut(candidate) {
                tile.set_special(SpecialKind::Swamp);
                placed = true;
            }
            break;
        }
        if placed {
            context.report.swamps.placed += 1;
        } else {
            warn!("skipping swamp {index}: no free tile after {attempts} attempts");
        }
    }
    info!("placed {} of {} swamps", context.report.swamps.placed, context.config.swamps);
}

/// Maximal run of consecutive special-free tiles sharing a wall on `side`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct WallGroup {
    pub(super) side: Direction,
    pub(super) tiles: Vec<Pos>,
}

fn scan_line(
    grid: &Grid,
    side: Direction,
    line: impl Iterator<Item = Pos>,
    groups: &mut Vec<WallGroup>,
) {
    let mut run = Vec::new();
    for pos in line {
        let usable = grid.tile(pos).is_some_and(|tile| tile.has_wall(side) && !tile.has_special());
        if usable {
            run.push(pos);
        } else if !run.is_empty() {
            groups.push(WallGroup { side, tiles: mem::take(&mut run) });
        }
    }
    if !run.is_empty() {
        groups.push(WallGroup { side, tiles: run });
    }
}

/// Up and down walls are scanned row by row, left and right walls column by column.
pub(super) fn wall_groups(grid: &Grid) -> Vec<WallGroup> {
    let (width, height) = (grid.width() as i32, grid.height() as i32);
    let mut groups = Vec::new();
    for side in [Direction::Up, Direction::Down] {
        for y in 0..height {
            scan_line(grid, side, (0..width).map(|x| Pos::new(x, y)), &mut groups);
        }
    }
    for side in [Direction::Left, Direction::Right] {
        for x in 0..width {
            scan_line(grid, side, (0..height).map(|y| Pos::new(x, y)), &mut groups);
        }
    }
    groups
}

fn requested_humans(context: &mut GenerationContext<'_>) -> Vec<HumanKind> {
    let mut kinds: Vec<HumanKind> = (0..context.config.visual_humans)
        .map(|_| HumanKind::VISUAL[context.human_rng.below(HumanKind::VISUAL.len())])
        .collect();
    kinds.extend(iter::repeat_n(HumanKind::Thermal, context.config.thermal_humans));
    kinds
}

fn free_tiles(grid: &Grid, group: &WallGroup) -> Vec<Pos> {
    group
        .tiles
        .iter()
        .copied()
        .filter(|&pos| grid.tile(pos).is_some_and(|tile| tile.human_info().is_none()))
        .collect()
}

/// Spreads victims over distinct wall groups before reusing any group.
///
/// Every try marks its group as tried, successful or not, and the tried set
/// resets once each group that still has a free tile has been tried.
pub(super) fn place_humans(context: &mut GenerationContext<'_>) {
    let groups = wall_groups(&context.grid);
    let kinds = requested_humans(context);
    let attempts = context.config.limits.human_attempts;
    let mut tried = BTreeSet::new();
    debug!("found {} wall groups for victims", groups.len());

    for kind in kinds {
        let mut placed = false;
        for _ in 0..attempts {
            let open: Vec<usize> = (0..groups.len())
                .filter(|&index| !free_tiles(&context.grid, &groups[index]).is_empty())
                .collect();
            if open.is_empty() {
                break;
            }
            if open.iter().all(|index| tried.contains(index)) {
                tried.clear();
            }
            let untried: Vec<usize> =
                open.into_iter().filter(|index| !tried.contains(index)).collect();
            let group_index = untried[context.human_rng.below(untried.len())];
            tried.insert(group_index);

            let group = &groups[group_index];
            let free = free_tiles(&context.grid, group);
            let pos = free[context.human_rng.below(free.len())];
            let position = context.frame.human_position(pos, group.side);
            let crowded = context
                .humans
                .iter()
                .any(|other| other.position.distance(position) < 2.0 * HUMAN_RADIUS);
            if crowded {
                continue;
            }
            let attached = context
                .grid
                .tile_mut(pos)
                .is_some_and(|tile| tile.attach_human(kind, group.side));
            if attached {
                context.humans.push(PlacedHuman {
                    tile: pos,
                    side: group.side,
                    kind,
                    position,
                    rotation: facing_angle(group.side.opposite()),
                });
                placed = true;
                break;
            }
        }

        match (placed, kind.is_visual()) {
            (true, true) => context.report.visual_humans.placed += 1,
            (true, false) => context.report.thermal_humans.placed += 1,
            (false, _) => warn!("dropping {} victim after {attempts} attempts", kind.type_name()),
        }
    }
    info!(
        "placed {} visual and {} thermal victims",
        context.report.visual_humans.placed, context.report.thermal_humans.placed
    );
}
