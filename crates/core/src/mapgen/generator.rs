//! High-level world generation orchestration over an explicit generation context.

use std::collections::BTreeSet;

use log::{debug, info};

use crate::config::{GenerationConfig, MazeStyle};
use crate::error::GenerationError;
use crate::geometry::WorldFrame;
use crate::types::Pos;

use super::carve::{braid, braid_iterations, carve_perfect_maze, choose_end_tile, choose_start};
use super::features::{
    place_checkpoints, place_humans, place_swamps, place_traps, reserve_start_area,
};
use super::grid::Grid;
use super::model::{GeneratedWorld, Obstacle, PlacedHuman, PlacementReport, StartPosition};
use super::obstacles::place_obstacles;
use super::seed::{GenRng, Stage};
use super::tile::{SpecialKind, Tile};

/// Everything the pipeline stages read and mutate during one run.
pub struct GenerationContext<'a> {
    pub(super) config: &'a GenerationConfig,
    pub(super) frame: WorldFrame,
    pub(super) grid: Grid,
    pub(super) bay_tile: Tile,
    pub(super) start: StartPosition,
    pub(super) end_tile: Pos,
    /// Tiles no special may be placed on.
    pub(super) disallowed: BTreeSet<Pos>,
    pub(super) humans: Vec<PlacedHuman>,
    pub(super) obstacles: Vec<Obstacle>,
    pub(super) report: PlacementReport,
    pub(super) carve_rng: GenRng,
    pub(super) feature_rng: GenRng,
    pub(super) human_rng: GenRng,
    pub(super) obstacle_rng: GenRng,
}

impl<'a> GenerationContext<'a> {
    /// Fresh all-walls grid with the start bay and end tile already chosen.
    pub(super) fn new(config: &'a GenerationConfig, seed: u64) -> Self {
        let mut grid = Grid::new(config.width, config.height);
        let mut layout_rng = GenRng::for_stage(seed, Stage::Layout);
        let start = choose_start(&mut grid, &mut layout_rng);
        let end_tile = choose_end_tile(&grid, &start, &mut layout_rng);

        let mut bay_tile = Tile::default();
        bay_tile.remove_walls(&[start.facing]);
        bay_tile.set_special(SpecialKind::Goal);

        Self {
            config,
            frame: WorldFrame::new(config.width, config.height),
            grid,
            bay_tile,
            start,
            end_tile,
            disallowed: BTreeSet::new(),
            humans: Vec::new(),
            obstacles: Vec::new(),
            report: PlacementReport::requested(config),
            carve_rng: GenRng::for_stage(seed, Stage::Carve),
            feature_rng: GenRng::for_stage(seed, Stage::Features),
            human_rng: GenRng::for_stage(seed, Stage::Humans),
            obstacle_rng: GenRng::for_stage(seed, Stage::Obstacles),
        }
    }

    /// In-grid tile with no special that is not reserved.
    pub(super) fn is_free(&self, pos: Pos) -> bool {
        !self.disallowed.contains(&pos)
            && self.grid.tile(pos).is_some_and(|tile| !tile.has_special())
    }

    fn into_world(self, seed: u64) -> GeneratedWorld {
        GeneratedWorld {
            config: self.config.clone(),
            seed,
            grid: self.grid,
            bay_tile: self.bay_tile,
            start: self.start,
            end_tile: self.end_tile,
            humans: self.humans,
            obstacles: self.obstacles,
            report: self.report,
        }
    }
}

fn carve_maze(context: &mut GenerationContext<'_>) {
    carve_perfect_maze(&mut context.grid, context.start.entry, &mut context.carve_rng);
    if context.config.maze == MazeStyle::Braided {
        let iterations = braid_iterations(context.config.width, context.config.height);
        braid(&mut context.grid, iterations, &mut context.carve_rng);
        debug!("braided maze with {iterations} random openings");
    }
    info!(
        "carved {}x{} maze with {} open edges",
        context.config.width,
        context.config.height,
        context.grid.open_edge_count()
    );
}

pub struct WorldGenerator {
    config: GenerationConfig,
    seed: u64,
}

impl WorldGenerator {
    pub fn new(config: GenerationConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    pub fn generate(&self) -> Result<GeneratedWorld, GenerationError> {
        self.config.validate()?;
        let mut context = GenerationContext::new(&self.config, self.seed);

        carve_maze(&mut context);
        reserve_start_area(&mut context);
        place_checkpoints(&mut context)?;
        place_traps(&mut context)?;
        place_swamps(&mut context);
        place_humans(&mut context);
        place_obstacles(&mut context);

        let world = context.into_world(self.seed);
        info!("generated world {:016x} from seed {}", world.fingerprint(), self.seed);
        Ok(world)
    }
}
