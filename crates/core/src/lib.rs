pub mod config;
pub mod error;
pub mod geometry;
pub mod mapgen;
pub mod preview;
pub mod scene;
pub mod types;

pub use config::{Difficulty, GenerationConfig, MazeStyle, PlacementLimits, RetryLimit};
pub use error::{Feature, GenerationError};
pub use mapgen::{GeneratedWorld, PlacementReport, WorldGenerator, generate_world};
pub use preview::{render_ascii, render_map_image, write_map_image};
pub use scene::{Scene, write_scene};
pub use types::*;
