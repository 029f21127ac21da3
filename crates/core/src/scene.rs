//! Tile classification and scene file output for the simulator.

pub mod classify;

mod emit;
mod writer;

pub use classify::{
    ExternalPiece, Rotation, TilePiece, TileSource, classify, classify_external, classify_flags,
    corner_flags,
};
pub use emit::{
    BoundsGroup, BoundsRecord, ExternalWallRecord, HumanRecord, ObstacleRecord, OverlayRecord,
    RobotRecord, Scene, SceneHeader, TileRecord,
};
pub use writer::{SCENE_EXTENSION, SceneWriter, scene_path, write_scene};
