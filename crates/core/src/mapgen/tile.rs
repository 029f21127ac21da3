//! Per-cell maze state: wall flags, special kind and an optional victim marker.

use serde::{Deserialize, Serialize};

use crate::types::Direction;

/// Mutually exclusive tile categories. `None` is a plain floor tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
    #[default]
    None,
    Checkpoint,
    Trap,
    Goal,
    Swamp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumanKind {
    Harmed,
    Unharmed,
    Stable,
    Thermal,
}

impl HumanKind {
    pub const VISUAL: [HumanKind; 3] = [HumanKind::Harmed, HumanKind::Unharmed, HumanKind::Stable];

    pub fn is_visual(self) -> bool {
        !matches!(self, Self::Thermal)
    }

    /// Object type name understood by the simulator's supervisor.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Harmed => "victim_harmed",
            Self::Unharmed => "victim_unharmed",
            Self::Stable => "victim_stable",
            Self::Thermal => "victim_thermal",
        }
    }

    pub fn score(self) -> u32 {
        if self.is_visual() { 15 } else { 10 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HumanAttachment {
    pub kind: HumanKind,
    pub side: Direction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    walls: [bool; 4],
    special: SpecialKind,
    human: Option<HumanAttachment>,
}

impl Default for Tile {
    fn default() -> Self {
        Self { walls: [true; 4], special: SpecialKind::None, human: None }
    }
}

impl Tile {
    pub fn add_walls(&mut self, sides: &[Direction]) {
        for side in sides {
            self.walls[side.index()] = true;
        }
    }

    /// Removing the wall a human hangs on also removes the human.
    pub fn remove_walls(&mut self, sides: &[Direction]) {
        for &side in sides {
            self.walls[side.index()] = false;
            if self.human.is_some_and(|human| human.side == side) {
                self.human = None;
            }
        }
    }

    pub fn set_special(&mut self, kind: SpecialKind) {
        self.special = kind;
    }

    pub fn clear_special(&mut self) {
        self.special = SpecialKind::None;
    }

    /// Fails when `side` has no wall or a human is already attached.
    pub fn attach_human(&mut self, kind: HumanKind, side: Direction) -> bool {
        if !self.has_wall(side) || self.human.is_some() {
            return false;
        }
        self.human = Some(HumanAttachment { kind, side });
        true
    }

    pub fn walls(&self) -> [bool; 4] {
        self.walls
    }

    pub fn has_wall(&self, side: Direction) -> bool {
        self.walls[side.index()]
    }

    pub fn wall_count(&self) -> usize {
        self.walls.iter().filter(|&&wall| wall).count()
    }

    pub fn special_kind(&self) -> SpecialKind {
        self.special
    }

    pub fn has_special(&self) -> bool {
        self.special != SpecialKind::None
    }

    pub fn human_info(&self) -> Option<HumanAttachment> {
        self.human
    }
}
