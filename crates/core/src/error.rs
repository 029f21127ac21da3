//! Error types surfaced by configuration loading, generation and scene output.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Feature categories whose placement can fail outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    Checkpoint,
    Trap,
    Obstacle,
    Victim,
}

impl Feature {
    pub fn name(self) -> &'static str {
        match self {
            Self::Checkpoint => "checkpoint",
            Self::Trap => "trap",
            Self::Obstacle => "obstacle",
            Self::Victim => "victim",
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not place {} {index} after {attempts} attempts", .feature.name())]
    PlacementInfeasible { feature: Feature, index: usize, attempts: u32 },

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config syntax: {0}")]
    ConfigSyntax(#[from] toml::de::Error),

    #[error("failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write scene {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write map image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infeasible_placement_names_the_feature() {
        let error =
            GenerationError::PlacementInfeasible { feature: Feature::Trap, index: 2, attempts: 50 };
        assert_eq!(error.to_string(), "could not place trap 2 after 50 attempts");
    }
}
