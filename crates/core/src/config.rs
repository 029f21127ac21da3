//! Generation parameters, attempt budgets and the built-in difficulty presets.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

pub const MIN_GRID_SIDE: usize = 2;
pub const MAX_GRID_SIDE: usize = 64;

/// Whether the carved spanning tree is braided with extra openings afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MazeStyle {
    #[default]
    Braided,
    Perfect,
}

/// Retry budget for placements that must eventually succeed.
///
/// In TOML: `"unbounded"` or `{ attempts = 500 }`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryLimit {
    Unbounded,
    Attempts(u32),
}

impl RetryLimit {
    /// True while `attempts_made` more attempts are still permitted.
    pub fn allows(self, attempts_made: u32) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Attempts(limit) => attempts_made < limit,
        }
    }
}

/// Attempt budgets for every retry loop in the generator.
///
/// Checkpoint and trap placement retry until they succeed when their limit is
/// [`RetryLimit::Unbounded`]; otherwise they fail with
/// [`GenerationError::PlacementInfeasible`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementLimits {
    pub checkpoint_attempts: RetryLimit,
    pub trap_attempts: RetryLimit,
    pub swamp_attempts: u32,
    pub human_attempts: u32,
    pub obstacle_attempts: u32,
}

impl Default for PlacementLimits {
    fn default() -> Self {
        Self {
            checkpoint_attempts: RetryLimit::Attempts(10_000),
            trap_attempts: RetryLimit::Attempts(10_000),
            swamp_attempts: 100,
            human_attempts: 200,
            obstacle_attempts: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub width: usize,
    pub height: usize,
    pub checkpoints: usize,
    pub traps: usize,
    pub swamps: usize,
    pub visual_humans: usize,
    pub thermal_humans: usize,
    pub static_obstacles: usize,
    pub debris: usize,
    pub maze: MazeStyle,
    pub limits: PlacementLimits,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Difficulty::DEFAULT.config()
    }
}

impl GenerationConfig {
    /// A `width x height` maze with no features at all.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            checkpoints: 0,
            traps: 0,
            swamps: 0,
            visual_humans: 0,
            thermal_humans: 0,
            static_obstacles: 0,
            debris: 0,
            maze: MazeStyle::Braided,
            limits: PlacementLimits::default(),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, GenerationError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, GenerationError> {
        let text = fs::read_to_string(path)
            .map_err(|source| GenerationError::ConfigRead { path: path.to_path_buf(), source })?;
        let config: Self = toml::from_str(&text)
            .map_err(|source| GenerationError::ConfigParse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        for (label, side) in [("width", self.width), ("height", self.height)] {
            if !(MIN_GRID_SIDE..=MAX_GRID_SIDE).contains(&side) {
                return Err(GenerationError::InvalidConfig(format!(
                    "{label} must be between {MIN_GRID_SIDE} and {MAX_GRID_SIDE}, got {side}"
                )));
            }
        }
        let zero = RetryLimit::Attempts(0);
        if self.limits.checkpoint_attempts == zero || self.limits.trap_attempts == zero {
            return Err(GenerationError::InvalidConfig(
                "checkpoint and trap attempt limits must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn total_humans(&self) -> usize {
        self.visual_humans + self.thermal_humans
    }
}

/// Preset parameter sets, easiest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Difficulty(u8);

// width, height, thermal, visual, static obstacles, debris, checkpoints, traps, swamps
const PRESETS: [[usize; 9]; 6] = [
    [5, 5, 4, 7, 0, 0, 2, 1, 1],
    [6, 5, 5, 8, 0, 0, 2, 1, 1],
    [7, 7, 7, 10, 0, 0, 2, 2, 2],
    [9, 7, 8, 12, 0, 0, 3, 2, 3],
    [11, 9, 8, 17, 0, 0, 3, 3, 3],
    [15, 15, 10, 20, 0, 0, 4, 3, 4],
];

impl Difficulty {
    pub const EASIEST: Self = Self(1);
    pub const HARDEST: Self = Self(PRESETS.len() as u8);
    pub const DEFAULT: Self = Self(3);

    pub fn new(level: u8) -> Option<Self> {
        (Self::EASIEST.0..=Self::HARDEST.0).contains(&level).then_some(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (Self::EASIEST.0..=Self::HARDEST.0).map(Self)
    }

    pub fn config(self) -> GenerationConfig {
        let [width, height, thermal, visual, static_obstacles, debris, checkpoints, traps, swamps] =
            PRESETS[usize::from(self.0 - 1)];
        GenerationConfig {
            width,
            height,
            checkpoints,
            traps,
            swamps,
            visual_humans: visual,
            thermal_humans: thermal,
            static_obstacles,
            debris,
            maze: MazeStyle::Braided,
            limits: PlacementLimits::default(),
        }
    }
}
