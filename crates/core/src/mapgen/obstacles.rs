//! Sizing and floor placement of static obstacles and debris.

use log::{info, warn};

use crate::config::RetryLimit;
use crate::geometry::{CELL_SIZE, HUMAN_RADIUS, WorldFrame};
use crate::types::{Direction, Rect};

use super::generator::GenerationContext;
use super::grid::Grid;
use super::model::{Obstacle, ObstacleKind, Placement};
use super::sampler::{ExclusionZone, ObjectKind, PlacedObject, PositionSampler};
use super::seed::GenRng;

const STATIC_HEIGHT: f64 = 0.15;
const DEBRIS_HEIGHT: f64 = 0.01;

/// Footprint sides in centimetres, upper bound exclusive.
fn size_range_cm(kind: ObstacleKind) -> (usize, usize) {
    match kind {
        ObstacleKind::Static => (5, 20),
        ObstacleKind::Debris => (2, 5),
    }
}

/// Random dimensions; placement is filled in by the sampler.
pub fn random_obstacle(kind: ObstacleKind, rng: &mut GenRng) -> Obstacle {
    let (min_cm, max_cm) = size_range_cm(kind);
    let width = rng.range_inclusive(min_cm, max_cm - 1) as f64 / 100.0;
    let depth = rng.range_inclusive(min_cm, max_cm - 1) as f64 / 100.0;
    let height = match kind {
        ObstacleKind::Static => STATIC_HEIGHT,
        ObstacleKind::Debris => DEBRIS_HEIGHT,
    };
    Obstacle { kind, width, height, depth, placement: Placement::OffMap }
}

/// Every wall side present on a grid tile, as a thin floor rectangle.
pub(super) fn wall_rects(grid: &Grid, frame: &WorldFrame) -> Vec<Rect> {
    grid.tiles()
        .flat_map(|(pos, tile)| {
            Direction::ALL
                .into_iter()
                .filter(move |&side| tile.has_wall(side))
                .map(move |side| frame.wall_rect(pos, side))
        })
        .collect()
}

fn maze_sampler(context: &GenerationContext<'_>) -> PositionSampler {
    let frame = &context.frame;
    let limit = RetryLimit::Attempts(context.config.limits.obstacle_attempts);
    let mut sampler = PositionSampler::new(frame.floor_rect(), limit)
        .with_walls(wall_rects(&context.grid, frame));
    for pos in [context.start.bay, context.start.entry] {
        sampler.exclude(ExclusionZone { center: frame.tile_center(pos), clearance: CELL_SIZE });
    }
    for human in &context.humans {
        sampler.register(PlacedObject {
            center: human.position,
            radius: HUMAN_RADIUS,
            kind: ObjectKind::Human,
        });
    }
    sampler
}

/// Static obstacles first, then debris; whatever does not fit goes off the map.
pub(super) fn place_obstacles(context: &mut GenerationContext<'_>) {
    let mut sampler = maze_sampler(context);
    let batches = [
        (ObstacleKind::Static, ObjectKind::Obstacle, context.config.static_obstacles),
        (ObstacleKind::Debris, ObjectKind::Debris, context.config.debris),
    ];

    for (kind, object_kind, count) in batches {
        let mut placed = 0;
        for _ in 0..count {
            let mut obstacle = random_obstacle(kind, &mut context.obstacle_rng);
            if let Some(point) =
                sampler.sample(obstacle.radius(), object_kind, &mut context.obstacle_rng)
            {
                obstacle.placement = Placement::Placed(point);
                placed += 1;
            }
            context.obstacles.push(obstacle);
        }
        if placed < count {
            warn!("{} of {count} {kind:?} obstacles placed off the map", count - placed);
        }
        match kind {
            ObstacleKind::Static => context.report.static_obstacles.placed = placed,
            ObstacleKind::Debris => context.report.debris.placed = placed,
        }
    }
    info!(
        "placed {} static obstacles and {} debris",
        context.report.static_obstacles.placed, context.report.debris.placed
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;

    #[test]
    fn obstacle_sizes_follow_their_kind() {
        let mut rng = GenRng::seed_from_u64(6);
        for _ in 0..200 {
            let block = random_obstacle(ObstacleKind::Static, &mut rng);
            assert!((0.05..0.20).contains(&block.width) && (0.05..0.20).contains(&block.depth));
            assert_eq!(block.height, STATIC_HEIGHT);

            let debris = random_obstacle(ObstacleKind::Debris, &mut rng);
            assert!((0.02..0.05).contains(&debris.width) && (0.02..0.05).contains(&debris.depth));
            assert_eq!(debris.height, DEBRIS_HEIGHT);
        }
    }

    #[test]
    fn closed_grid_exposes_four_walls_per_tile() {
        let grid = Grid::new(3, 2);
        let frame = WorldFrame::new(3, 2);
        assert_eq!(wall_rects(&grid, &frame).len(), 24);
    }

    #[test]
    fn obstacles_avoid_walls_and_the_start() {
        let mut config = GenerationConfig::empty(6, 6);
        config.static_obstacles = 4;
        config.debris = 10;
        let mut context = GenerationContext::new(&config, 41);
        for pos in context.grid.positions() {
            for direction in [Direction::Right, Direction::Down] {
                if context.grid.in_bounds(pos.step(direction)) {
                    context.grid.open_wall(pos, direction);
                }
            }
        }
        place_obstacles(&mut context);

        assert_eq!(context.obstacles.len(), 14);
        let walls = wall_rects(&context.grid, &context.frame);
        let entry = context.frame.tile_center(context.start.entry);
        let placed: Vec<_> = context
            .obstacles
            .iter()
            .filter_map(|obstacle| match obstacle.placement {
                Placement::Placed(point) => Some((point, obstacle.radius())),
                Placement::OffMap => None,
            })
            .collect();
        assert_eq!(
            placed.len(),
            context.report.static_obstacles.placed + context.report.debris.placed
        );
        for &(point, radius) in &placed {
            let footprint = Rect::centered(point, radius, radius);
            assert!(walls.iter().all(|wall| !footprint.overlaps(wall)));
            assert!(point.distance(entry) >= CELL_SIZE);
        }
    }

    #[test]
    fn zero_attempts_put_everything_off_map() {
        let mut config = GenerationConfig::empty(4, 4);
        config.debris = 3;
        config.limits.obstacle_attempts = 0;
        let mut context = GenerationContext::new(&config, 2);
        place_obstacles(&mut context);
        assert!(context.obstacles.iter().all(|obstacle| obstacle.placement == Placement::OffMap));
        assert_eq!(context.report.debris.placed, 0);
    }
}
