//! Open-floor arena layout: the floor is partitioned into rooms, bases go into
//! some of them, and obstacles then victims are sampled in the others.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::RetryLimit;
use crate::error::{Feature, GenerationError};
use crate::types::{Rect, WorldPoint};

use super::model::{Obstacle, ObstacleKind, Placement};
use super::rooms::{RoomId, RoomTree};
use super::sampler::{ObjectKind, PlacedObject, PositionSampler};
use super::seed::{GenRng, Stage};

/// Victims in the arena are much larger than the wall-mounted maze victims.
pub const ARENA_HUMAN_RADIUS: f64 = 0.35;
const OBSTACLE_HEIGHT: f64 = 0.5;
const OBSTACLE_SIDE: (f64, f64) = (0.4, 1.2);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f64,
    pub depth: f64,
    /// Smallest side a room may be split down to.
    pub min_room: f64,
    pub max_depth: u32,
    pub wall_thickness: f64,
    pub bases: usize,
    pub obstacles: usize,
    pub humans: usize,
    pub attempts: RetryLimit,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 25.0,
            depth: 20.0,
            min_room: 5.0,
            max_depth: 3,
            wall_thickness: 0.1,
            bases: 3,
            obstacles: 6,
            humans: 8,
            attempts: RetryLimit::Attempts(10_000),
        }
    }
}

impl ArenaConfig {
    pub fn validate(&self) -> Result<(), GenerationError> {
        let sizes = [
            ("width", self.width),
            ("depth", self.depth),
            ("min_room", self.min_room),
        ];
        let invalid = sizes.into_iter().find(|&(_, value)| !value.is_finite() || value <= 0.0);
        if let Some((label, value)) = invalid {
            return Err(GenerationError::InvalidConfig(format!(
                "arena {label} must be positive, got {value}"
            )));
        }
        if !(0.0..self.min_room).contains(&self.wall_thickness) {
            return Err(GenerationError::InvalidConfig(format!(
                "wall thickness {} must be below the minimum room size {}",
                self.wall_thickness, self.min_room
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaLayout {
    pub seed: u64,
    pub floor: Rect,
    /// Leaf room interiors, bases included.
    pub rooms: Vec<Rect>,
    pub walls: Vec<Rect>,
    pub bases: Vec<WorldPoint>,
    pub obstacles: Vec<Obstacle>,
    pub humans: Vec<PlacedObject>,
}

fn random_arena_obstacle(rng: &mut GenRng) -> Obstacle {
    let (min_side, max_side) = OBSTACLE_SIDE;
    Obstacle {
        kind: ObstacleKind::Static,
        width: rng.range_f64(min_side, max_side),
        height: OBSTACLE_HEIGHT,
        depth: rng.range_f64(min_side, max_side),
        placement: Placement::OffMap,
    }
}

/// Rooms without a base; every room when the bases took them all.
fn open_rooms(tree: &RoomTree, bases: &[(RoomId, WorldPoint)]) -> Vec<RoomId> {
    let leaves = tree.leaves();
    let open: Vec<RoomId> =
        leaves.iter().copied().filter(|id| bases.iter().all(|(base, _)| base != id)).collect();
    if open.is_empty() { leaves } else { open }
}

fn infeasible(feature: Feature, index: usize, limit: RetryLimit) -> GenerationError {
    let attempts = match limit {
        RetryLimit::Attempts(attempts) => attempts,
        RetryLimit::Unbounded => 0,
    };
    GenerationError::PlacementInfeasible { feature, index, attempts }
}

fn place_objects(
    config: &ArenaConfig,
    sampler: &mut PositionSampler,
    seed: u64,
) -> Result<(Vec<Obstacle>, Vec<PlacedObject>), GenerationError> {
    let mut obstacle_rng = GenRng::for_stage(seed, Stage::Obstacles);
    let mut obstacles = Vec::with_capacity(config.obstacles);
    for index in 0..config.obstacles {
        let mut obstacle = random_arena_obstacle(&mut obstacle_rng);
        let point = sampler
            .sample(obstacle.radius(), ObjectKind::Obstacle, &mut obstacle_rng)
            .ok_or_else(|| infeasible(Feature::Obstacle, index, config.attempts))?;
        obstacle.placement = Placement::Placed(point);
        obstacles.push(obstacle);
    }

    let mut human_rng = GenRng::for_stage(seed, Stage::Humans);
    let mut humans = Vec::with_capacity(config.humans);
    for index in 0..config.humans {
        let center = sampler
            .sample(ARENA_HUMAN_RADIUS, ObjectKind::Human, &mut human_rng)
            .ok_or_else(|| infeasible(Feature::Victim, index, config.attempts))?;
        humans.push(PlacedObject { center, radius: ARENA_HUMAN_RADIUS, kind: ObjectKind::Human });
    }
    Ok((obstacles, humans))
}

/// Obstacles are placed before victims, so victims treat them as taken space.
pub fn generate_arena(config: &ArenaConfig, seed: u64) -> Result<ArenaLayout, GenerationError> {
    config.validate()?;
    let floor = Rect::centered(WorldPoint::new(0.0, 0.0), config.width / 2.0, config.depth / 2.0);
    let mut layout_rng = GenRng::for_stage(seed, Stage::Layout);
    let mut tree = RoomTree::split(floor, config.min_room, config.max_depth, &mut layout_rng);
    tree.shrink_for_walls(config.wall_thickness);

    let bases = tree.place_bases(config.bases, &mut layout_rng);
    let allowed = open_rooms(&tree, &bases);
    debug!("arena split into {} rooms, {} open for objects", tree.leaves().len(), allowed.len());

    let base_points: Vec<WorldPoint> = bases.iter().map(|&(_, center)| center).collect();
    let mut sampler = tree
        .sampler(&allowed, &base_points, config.wall_thickness)
        .with_limit(config.attempts);
    let (obstacles, humans) = place_objects(config, &mut sampler, seed)?;

    let rooms = tree.leaves().into_iter().filter_map(|id| tree.node(id)).map(|node| node.interior);
    let layout = ArenaLayout {
        seed,
        floor,
        rooms: rooms.collect(),
        walls: tree.interior_walls(config.wall_thickness),
        bases: base_points,
        obstacles,
        humans,
    };
    info!(
        "arena with {} rooms, {} bases, {} obstacles and {} victims",
        layout.rooms.len(),
        layout.bases.len(),
        layout.obstacles.len(),
        layout.humans.len()
    );
    Ok(layout)
}
