//! Typed scene records built from a generated world, in emission order.

use std::iter;

use serde::Serialize;

use crate::geometry::{CELL_SIZE, HALF_CELL, ROBOT_SPACING, TILE_SCALE, WorldFrame, facing_angle};
use crate::mapgen::{GeneratedWorld, Placement, SpecialKind};
use crate::types::{Direction, Pos, Rect, WorldPoint};

use super::classify::{ExternalPiece, Rotation, TilePiece, classify, classify_external};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SceneHeader {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub fingerprint: u64,
    pub humans: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ExternalWallRecord {
    pub piece: ExternalPiece,
    pub translation: WorldPoint,
    pub rotation: Rotation,
    pub tile_id: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TileRecord {
    pub piece: TilePiece,
    pub translation: WorldPoint,
    pub rotation: Rotation,
    pub scale: f64,
    pub special: SpecialKind,
    pub tile_id: usize,
}

impl TileRecord {
    pub fn checkpoint(&self) -> bool {
        self.special == SpecialKind::Checkpoint
    }

    pub fn trap(&self) -> bool {
        self.special == SpecialKind::Trap
    }

    pub fn goal(&self) -> bool {
        self.special == SpecialKind::Goal
    }

    pub fn swamp(&self) -> bool {
        self.special == SpecialKind::Swamp
    }
}

/// Floor marker drawn over a special tile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OverlayRecord {
    pub special: SpecialKind,
    pub translation: WorldPoint,
    pub tile_id: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundsGroup {
    Checkpoint,
    Trap,
    Start,
    Swamp,
}

impl BoundsGroup {
    pub const ALL: [Self; 4] = [Self::Checkpoint, Self::Trap, Self::Start, Self::Swamp];

    pub fn name(self) -> &'static str {
        match self {
            Self::Checkpoint => "checkpoint",
            Self::Trap => "trap",
            Self::Start => "start",
            Self::Swamp => "swamp",
        }
    }

    fn special(self) -> SpecialKind {
        match self {
            Self::Checkpoint => SpecialKind::Checkpoint,
            Self::Trap => SpecialKind::Trap,
            Self::Start => SpecialKind::Goal,
            Self::Swamp => SpecialKind::Swamp,
        }
    }
}

/// Area the supervisor tests robot positions against.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoundsRecord {
    pub group: BoundsGroup,
    pub id: usize,
    pub area: Rect,
}

impl BoundsRecord {
    pub fn contains(&self, point: WorldPoint) -> bool {
        self.area.contains(point)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ObstacleRecord {
    pub id: usize,
    pub translation: WorldPoint,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub is_static: bool,
    pub on_map: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HumanRecord {
    pub id: usize,
    pub translation: WorldPoint,
    pub rotation: f64,
    pub type_name: &'static str,
    pub score: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RobotRecord {
    pub id: usize,
    pub translation: WorldPoint,
    pub rotation: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scene {
    pub header: SceneHeader,
    pub external_walls: Vec<ExternalWallRecord>,
    pub tiles: Vec<TileRecord>,
    pub overlays: Vec<OverlayRecord>,
    pub bounds: Vec<BoundsRecord>,
    pub obstacles: Vec<ObstacleRecord>,
    pub debris: Vec<ObstacleRecord>,
    pub humans: Vec<HumanRecord>,
    pub robots: [RobotRecord; 2],
}

/// Off-map objects are parked in a row beyond the right edge of the floor.
fn parking_spot(frame: &WorldFrame, index: usize) -> WorldPoint {
    let floor = frame.floor_rect();
    WorldPoint::new(floor.max.x + CELL_SIZE * (index as f64 + 2.0), floor.min.z - CELL_SIZE)
}

fn robot_spawns(world: &GeneratedWorld, frame: &WorldFrame) -> [RobotRecord; 2] {
    let center = frame.tile_center(world.start.bay);
    let facing = world.start.facing;
    let rotation = facing_angle(facing);
    // First robot sits to the left of the facing direction.
    let left = Direction::from_index((facing.index() + 3) % 4);
    let (dx, dz) = left.offset();
    let offset = |sign: f64| {
        WorldPoint::new(
            center.x + sign * f64::from(dx) * ROBOT_SPACING,
            center.z + sign * f64::from(dz) * ROBOT_SPACING,
        )
    };
    [
        RobotRecord { id: 0, translation: offset(1.0), rotation },
        RobotRecord { id: 1, translation: offset(-1.0), rotation },
    ]
}

impl Scene {
    pub fn build(world: &GeneratedWorld) -> Self {
        let frame = WorldFrame::new(world.width(), world.height());
        let positions: Vec<Pos> =
            world.grid.positions().chain(iter::once(world.start.bay)).collect();

        let mut external_walls = Vec::new();
        let mut tiles = Vec::new();
        let mut overlays = Vec::new();
        for (tile_id, &pos) in positions.iter().enumerate() {
            let (Some(tile), Some((piece, rotation))) = (world.tile(pos), classify(pos, world))
            else {
                continue;
            };
            let translation = frame.tile_center(pos);
            if let Some((piece, rotation)) = classify_external(pos, world) {
                external_walls.push(ExternalWallRecord { piece, translation, rotation, tile_id });
            }
            let special = tile.special_kind();
            tiles.push(TileRecord {
                piece,
                translation,
                rotation,
                scale: TILE_SCALE,
                special,
                tile_id,
            });
            if special != SpecialKind::None {
                overlays.push(OverlayRecord { special, translation, tile_id });
            }
        }

        let mut bounds = Vec::new();
        for group in BoundsGroup::ALL {
            let special = group.special();
            let tiles_in_group = positions
                .iter()
                .filter(|&&pos| world.tile(pos).is_some_and(|tile| tile.special_kind() == special));
            for (id, &pos) in tiles_in_group.enumerate() {
                let area = Rect::centered(frame.tile_center(pos), HALF_CELL, HALF_CELL);
                bounds.push(BoundsRecord { group, id, area });
            }
        }

        let mut obstacles = Vec::new();
        let mut debris = Vec::new();
        for (index, obstacle) in world.obstacles.iter().enumerate() {
            let (translation, on_map) = match obstacle.placement {
                Placement::Placed(point) => (point, true),
                Placement::OffMap => (parking_spot(&frame, index), false),
            };
            let list = if obstacle.is_static() { &mut obstacles } else { &mut debris };
            list.push(ObstacleRecord {
                id: list.len(),
                translation,
                width: obstacle.width,
                height: obstacle.height,
                depth: obstacle.depth,
                is_static: obstacle.is_static(),
                on_map,
            });
        }

        let humans = world
            .humans
            .iter()
            .enumerate()
            .map(|(id, human)| HumanRecord {
                id,
                translation: human.position,
                rotation: human.rotation,
                type_name: human.kind.type_name(),
                score: human.kind.score(),
            })
            .collect::<Vec<_>>();

        Self {
            header: SceneHeader {
                width: world.width(),
                height: world.height(),
                seed: world.seed,
                fingerprint: world.fingerprint(),
                humans: humans.len(),
            },
            external_walls,
            tiles,
            overlays,
            bounds,
            obstacles,
            debris,
            humans,
            robots: robot_spawns(world, &frame),
        }
    }

    pub fn bounds_in(&self, group: BoundsGroup) -> impl Iterator<Item = &BoundsRecord> {
        self.bounds.iter().filter(move |bounds| bounds.group == group)
    }
}
