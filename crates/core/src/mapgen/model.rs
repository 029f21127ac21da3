//! Public data models for generated worlds, victims, obstacles and placement counts.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::config::GenerationConfig;
use crate::types::{Direction, Pos, WorldPoint};

use super::grid::Grid;
use super::tile::{HumanKind, SpecialKind, Tile};

/// Robot spawn bay just outside the grid and the tile it opens onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPosition {
    pub bay: Pos,
    pub entry: Pos,
    /// Points from the bay into the maze.
    pub facing: Direction,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedHuman {
    pub tile: Pos,
    pub side: Direction,
    pub kind: HumanKind,
    pub position: WorldPoint,
    pub rotation: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Static,
    Debris,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Placed(WorldPoint),
    OffMap,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub placement: Placement,
}

impl Obstacle {
    pub fn radius(&self) -> f64 {
        (self.width / 2.0).hypot(self.depth / 2.0)
    }

    pub fn is_static(&self) -> bool {
        self.kind == ObstacleKind::Static
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placed {
    pub requested: usize,
    pub placed: usize,
}

impl Placed {
    pub fn new(requested: usize) -> Self {
        Self { requested, placed: 0 }
    }

    pub fn is_complete(&self) -> bool {
        self.placed == self.requested
    }
}

/// Requested versus actually placed counts per feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementReport {
    pub checkpoints: Placed,
    pub traps: Placed,
    pub swamps: Placed,
    pub visual_humans: Placed,
    pub thermal_humans: Placed,
    pub static_obstacles: Placed,
    pub debris: Placed,
}

impl PlacementReport {
    pub fn requested(config: &GenerationConfig) -> Self {
        Self {
            checkpoints: Placed::new(config.checkpoints),
            traps: Placed::new(config.traps),
            swamps: Placed::new(config.swamps),
            visual_humans: Placed::new(config.visual_humans),
            thermal_humans: Placed::new(config.thermal_humans),
            static_obstacles: Placed::new(config.static_obstacles),
            debris: Placed::new(config.debris),
        }
    }

    pub fn entries(&self) -> [(&'static str, Placed); 7] {
        [
            ("checkpoints", self.checkpoints),
            ("traps", self.traps),
            ("swamps", self.swamps),
            ("visual humans", self.visual_humans),
            ("thermal humans", self.thermal_humans),
            ("static obstacles", self.static_obstacles),
            ("debris", self.debris),
        ]
    }

    pub fn is_complete(&self) -> bool {
        self.entries().iter().all(|(_, placed)| placed.is_complete())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedWorld {
    pub config: GenerationConfig,
    pub seed: u64,
    pub grid: Grid,
    /// The bay doubles as the goal tile.
    pub bay_tile: Tile,
    pub start: StartPosition,
    pub end_tile: Pos,
    pub humans: Vec<PlacedHuman>,
    pub obstacles: Vec<Obstacle>,
    pub report: PlacementReport,
}

impl GeneratedWorld {
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Grid tiles plus the bay at its position outside the grid.
    pub fn tile(&self, pos: Pos) -> Option<&Tile> {
        if pos == self.start.bay { Some(&self.bay_tile) } else { self.grid.tile(pos) }
    }

    pub fn special_tiles(&self, kind: SpecialKind) -> Vec<Pos> {
        let mut found: Vec<Pos> = self
            .grid
            .tiles()
            .filter(|(_, tile)| tile.special_kind() == kind)
            .map(|(pos, _)| pos)
            .collect();
        if self.bay_tile.special_kind() == kind {
            found.push(self.start.bay);
        }
        found
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.width() as u32).to_le_bytes());
        bytes.extend((self.height() as u32).to_le_bytes());
        bytes.extend(self.seed.to_le_bytes());
        for (_, tile) in self.grid.tiles() {
            push_tile(&mut bytes, tile);
        }
        push_tile(&mut bytes, &self.bay_tile);
        for pos in [self.start.bay, self.start.entry, self.end_tile] {
            bytes.extend(pos.x.to_le_bytes());
            bytes.extend(pos.y.to_le_bytes());
        }
        bytes.push(self.start.facing.index() as u8);

        bytes.extend((self.humans.len() as u32).to_le_bytes());
        for human in &self.humans {
            bytes.extend(human.tile.x.to_le_bytes());
            bytes.extend(human.tile.y.to_le_bytes());
            bytes.push(human.side.index() as u8);
            bytes.push(human_code(human.kind));
        }

        bytes.extend((self.obstacles.len() as u32).to_le_bytes());
        for obstacle in &self.obstacles {
            bytes.push(u8::from(obstacle.is_static()));
            for value in [obstacle.width, obstacle.height, obstacle.depth] {
                bytes.extend(value.to_bits().to_le_bytes());
            }
            match obstacle.placement {
                Placement::Placed(point) => {
                    bytes.push(1);
                    bytes.extend(point.x.to_bits().to_le_bytes());
                    bytes.extend(point.z.to_bits().to_le_bytes());
                }
                Placement::OffMap => bytes.push(0),
            }
        }

        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

fn human_code(kind: HumanKind) -> u8 {
    match kind {
        HumanKind::Harmed => 1,
        HumanKind::Unharmed => 2,
        HumanKind::Stable => 3,
        HumanKind::Thermal => 4,
    }
}

fn push_tile(bytes: &mut Vec<u8>, tile: &Tile) {
    let walls = tile.walls();
    let wall_bits = walls.iter().enumerate().fold(0_u8, |bits, (index, &wall)| {
        if wall { bits | (1 << index) } else { bits }
    });
    bytes.push(wall_bits);
    bytes.push(match tile.special_kind() {
        SpecialKind::None => 0,
        SpecialKind::Checkpoint => 1,
        SpecialKind::Trap => 2,
        SpecialKind::Goal => 3,
        SpecialKind::Swamp => 4,
    });
    match tile.human_info() {
        Some(human) => {
            bytes.push(human_code(human.kind));
            bytes.push(human.side.index() as u8);
        }
        None => bytes.extend([0, 0]),
    }
}
