//! Maze world generation split into carving, feature placement and object sampling.

pub mod arena;
pub mod model;
pub mod rooms;
pub mod sampler;

mod carve;
mod features;
mod generator;
mod grid;
mod obstacles;
mod seed;
mod tile;

pub use arena::{ArenaConfig, ArenaLayout, generate_arena};
pub use carve::{braid, braid_iterations, carve_perfect_maze};
pub use generator::WorldGenerator;
pub use grid::Grid;
pub use model::{
    GeneratedWorld, Obstacle, ObstacleKind, Placed, PlacedHuman, Placement, PlacementReport,
    StartPosition,
};
pub use obstacles::random_obstacle;
pub use rooms::{RoomId, RoomTree};
pub use sampler::{CandidateSource, ExclusionZone, ObjectKind, PlacedObject, PositionSampler};
pub use seed::GenRng;
pub use tile::{HumanAttachment, HumanKind, SpecialKind, Tile};

use crate::config::GenerationConfig;
use crate::error::GenerationError;

pub fn generate_world(
    config: GenerationConfig,
    seed: u64,
) -> Result<GeneratedWorld, GenerationError> {
    WorldGenerator::new(config, seed).generate()
}
