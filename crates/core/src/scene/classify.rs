//! Maps each tile's walls and neighbouring corners to a prefabricated piece.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::Serialize;

use crate::mapgen::{GeneratedWorld, Grid, Tile};
use crate::types::{Direction, Pos};

/// Quarter turn applied to a piece around the vertical axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    None,
    Clockwise,
    Half,
    CounterClockwise,
}

impl Rotation {
    pub fn radians(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Clockwise => -FRAC_PI_2,
            Self::Half => PI,
            Self::CounterClockwise => FRAC_PI_2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TilePiece {
    FourWalls,
    ThreeWalls,
    TwoWallsRightAngle,
    TwoWallsTunnel,
    TwoWallsOnePillar,
    OneWall,
    OneWallOnePillarLeft,
    OneWallOnePillarRight,
    OneWallTwoPillars,
    ZeroWalls,
    FourPillars,
    ThreePillars,
    TwoPillarsHorizontal,
    TwoPillarsDiagonal,
    OnePillar,
}

impl TilePiece {
    pub const ALL: [Self; 15] = [
        Self::FourWalls,
        Self::ThreeWalls,
        Self::TwoWallsRightAngle,
        Self::TwoWallsTunnel,
        Self::TwoWallsOnePillar,
        Self::OneWall,
        Self::OneWallOnePillarLeft,
        Self::OneWallOnePillarRight,
        Self::OneWallTwoPillars,
        Self::ZeroWalls,
        Self::FourPillars,
        Self::ThreePillars,
        Self::TwoPillarsHorizontal,
        Self::TwoPillarsDiagonal,
        Self::OnePillar,
    ];

    /// Template name the simulator knows the piece by.
    pub fn name(self) -> &'static str {
        match self {
            Self::FourWalls => "fourWalls",
            Self::ThreeWalls => "threeWalls",
            Self::TwoWallsRightAngle => "twoWallsRightAngle",
            Self::TwoWallsTunnel => "twoWallsTunnel",
            Self::TwoWallsOnePillar => "twoWallsOnePillar",
            Self::OneWall => "oneWall",
            Self::OneWallOnePillarLeft => "oneWallOnePillarLeft",
            Self::OneWallOnePillarRight => "oneWallOnePillarRight",
            Self::OneWallTwoPillars => "oneWallTwoPillars",
            Self::ZeroWalls => "zeroWalls",
            Self::FourPillars => "fourPillars",
            Self::ThreePillars => "threePillars",
            Self::TwoPillarsHorizontal => "twoPillarsHorizontal",
            Self::TwoPillarsDiagonal => "twoPillarsDiagonal",
            Self::OnePillar => "onePillar",
        }
    }
}

/// Boundary pieces drawn around tiles on the edge of the occupied area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ExternalPiece {
    Single,
    Corner,
    Hoop,
}

impl ExternalPiece {
    pub fn name(self) -> &'static str {
        match self {
            Self::Single => "externalWallSingle",
            Self::Corner => "externalWallCorner",
            Self::Hoop => "externalWallHoop",
        }
    }
}

/// Tile lookup for the classifier; `None` means nothing is built there.
pub trait TileSource {
    fn tile_at(&self, pos: Pos) -> Option<&Tile>;
}

impl TileSource for Grid {
    fn tile_at(&self, pos: Pos) -> Option<&Tile> {
        self.tile(pos)
    }
}

impl TileSource for GeneratedWorld {
    fn tile_at(&self, pos: Pos) -> Option<&Tile> {
        self.tile(pos)
    }
}

fn neighbour_walls(source: &impl TileSource, pos: Pos, direction: Direction) -> [bool; 4] {
    source.tile_at(pos.step(direction)).map_or([false; 4], Tile::walls)
}

/// Pillars needed at the tile corners because both walls meeting there
/// belong to neighbours: top-right, bottom-right, bottom-left, top-left.
pub fn corner_flags(source: &impl TileSource, pos: Pos) -> [bool; 4] {
    let [up, right, down, left] =
        Direction::ALL.map(|direction| neighbour_walls(source, pos, direction));
    let side = |walls: [bool; 4], direction: Direction| walls[direction.index()];
    [
        side(up, Direction::Right) && side(right, Direction::Up),
        side(right, Direction::Down) && side(down, Direction::Right),
        side(down, Direction::Left) && side(left, Direction::Down),
        side(up, Direction::Left) && side(left, Direction::Up),
    ]
}

/// The full decision table over wall flags `[up, right, down, left]` and
/// corner flags `[top-right, bottom-right, bottom-left, top-left]`.
pub fn classify_flags(walls: [bool; 4], corners: [bool; 4]) -> (TilePiece, Rotation) {
    use Rotation::{Clockwise, CounterClockwise, Half, None};
    use TilePiece::*;

    let [up, right, down, left] = walls;
    let [c0, c1, c2, c3] = corners;

    match (up, right, down, left) {
        (true, true, true, true) => (FourWalls, None),

        (false, true, true, true) => (ThreeWalls, None),
        (true, false, true, true) => (ThreeWalls, Clockwise),
        (true, true, false, true) => (ThreeWalls, Half),
        (true, true, true, false) => (ThreeWalls, CounterClockwise),

        (false, false, true, true) => (right_angle(c0), None),
        (true, false, false, true) => (right_angle(c1), Clockwise),
        (true, true, false, false) => (right_angle(c2), Half),
        (false, true, true, false) => (right_angle(c3), CounterClockwise),

        (true, false, true, false) => (TwoWallsTunnel, None),
        (false, true, false, true) => (TwoWallsTunnel, CounterClockwise),

        (true, false, false, false) => (one_wall(c1, c2), None),
        (false, true, false, false) => (one_wall(c2, c3), Clockwise),
        (false, false, true, false) => (one_wall(c3, c0), Half),
        (false, false, false, true) => (one_wall(c0, c1), CounterClockwise),

        (false, false, false, false) => pillars_only(corners),
    }
}

fn right_angle(opposite_corner: bool) -> TilePiece {
    if opposite_corner { TilePiece::TwoWallsOnePillar } else { TilePiece::TwoWallsRightAngle }
}

fn one_wall(first: bool, second: bool) -> TilePiece {
    match (first, second) {
        (true, true) => TilePiece::OneWallTwoPillars,
        (true, false) => TilePiece::OneWallOnePillarRight,
        (false, true) => TilePiece::OneWallOnePillarLeft,
        (false, false) => TilePiece::OneWall,
    }
}

fn pillars_only(corners: [bool; 4]) -> (TilePiece, Rotation) {
    use Rotation::{Clockwise, CounterClockwise, Half, None};
    use TilePiece::*;

    match corners {
        [true, true, true, true] => (FourPillars, None),

        [true, false, true, true] => (ThreePillars, None),
        [true, true, false, true] => (ThreePillars, Clockwise),
        [true, true, true, false] => (ThreePillars, Half),
        [false, true, true, true] => (ThreePillars, CounterClockwise),

        [true, false, false, true] => (TwoPillarsHorizontal, None),
        [true, true, false, false] => (TwoPillarsHorizontal, Clockwise),
        [false, true, true, false] => (TwoPillarsHorizontal, Half),
        [false, false, true, true] => (TwoPillarsHorizontal, CounterClockwise),

        [false, true, false, true] => (TwoPillarsDiagonal, None),
        [true, false, true, false] => (TwoPillarsDiagonal, CounterClockwise),

        [false, false, false, true] => (OnePillar, None),
        [true, false, false, false] => (OnePillar, Clockwise),
        [false, true, false, false] => (OnePillar, Half),
        [false, false, true, false] => (OnePillar, CounterClockwise),

        [false, false, false, false] => (ZeroWalls, None),
    }
}

/// `None` when nothing is built at `pos`.
pub fn classify(pos: Pos, source: &impl TileSource) -> Option<(TilePiece, Rotation)> {
    let tile = source.tile_at(pos)?;
    Some(classify_flags(tile.walls(), corner_flags(source, pos)))
}

/// Outer wall piece for a tile bordering empty space, if it needs one.
pub fn classify_external(pos: Pos, source: &impl TileSource) -> Option<(ExternalPiece, Rotation)> {
    use Rotation::{Clockwise, CounterClockwise, Half, None};

    source.tile_at(pos)?;
    let present = Direction::ALL.map(|direction| source.tile_at(pos.step(direction)).is_some());
    let piece = match present {
        [false, true, true, true] => (ExternalPiece::Single, None),
        [true, false, true, true] => (ExternalPiece::Single, Clockwise),
        [true, true, false, true] => (ExternalPiece::Single, Half),
        [true, true, true, false] => (ExternalPiece::Single, CounterClockwise),

        [false, true, true, false] => (ExternalPiece::Corner, None),
        [false, false, true, true] => (ExternalPiece::Corner, Clockwise),
        [true, false, false, true] => (ExternalPiece::Corner, Half),
        [true, true, false, false] => (ExternalPiece::Corner, CounterClockwise),

        [false, false, true, false] => (ExternalPiece::Hoop, None),
        [false, false, false, true] => (ExternalPiece::Hoop, Clockwise),
        [true, false, false, false] => (ExternalPiece::Hoop, Half),
        [false, true, false, false] => (ExternalPiece::Hoop, CounterClockwise),

        _ => return Option::None,
    };
    Some(piece)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn flags(bits: u8) -> [bool; 4] {
        [bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0]
    }

    #[test]
    fn every_flag_combination_maps_to_one_stable_piece() {
        let mut seen = BTreeSet::new();
        for wall_bits in 0..16 {
            for corner_bits in 0..16 {
                let walls = flags(wall_bits);
                let corners = flags(corner_bits);
                let first = classify_flags(walls, corners);
                assert_eq!(first, classify_flags(walls, corners));
                seen.insert(first.0.name());
            }
        }
        assert_eq!(seen.len(), TilePiece::ALL.len());
    }

    #[test]
    fn corners_only_matter_when_walls_leave_room_for_pillars() {
        for corner_bits in 0..16 {
            let corners = flags(corner_bits);
            assert_eq!(
                classify_flags([true; 4], corners),
                (TilePiece::FourWalls, Rotation::None)
            );
            assert_eq!(
                classify_flags([true, false, true, false], corners),
                (TilePiece::TwoWallsTunnel, Rotation::None)
            );
        }
    }

    #[test]
    fn closed_tile_and_right_wall_with_both_pillars() {
        assert_eq!(classify_flags([true; 4], [false; 4]), (TilePiece::FourWalls, Rotation::None));

        let (piece, rotation) =
            classify_flags([false, true, false, false], [false, false, true, true]);
        assert_eq!(piece.name(), "oneWallTwoPillars");
        assert_eq!(rotation.radians(), -FRAC_PI_2);
    }

    #[test]
    fn one_wall_pillars_are_told_apart_by_side() {
        assert_eq!(
            classify_flags([true, false, false, false], [false, true, false, false]),
            (TilePiece::OneWallOnePillarRight, Rotation::None)
        );
        assert_eq!(
            classify_flags([true, false, false, false], [false, false, true, false]),
            (TilePiece::OneWallOnePillarLeft, Rotation::None)
        );
        assert_eq!(
            classify_flags([false, false, false, true], [false; 4]),
            (TilePiece::OneWall, Rotation::CounterClockwise)
        );
    }

    #[test]
    fn corner_flags_come_from_neighbour_walls() {
        let mut grid = Grid::new(3, 3);
        let center = Pos::new(1, 1);
        for direction in Direction::ALL {
            grid.open_wall(center, direction);
        }
        // Neighbours keep their other walls, so every corner needs a pillar.
        assert_eq!(corner_flags(&grid, center), [true; 4]);
        assert_eq!(classify(center, &grid), Some((TilePiece::FourPillars, Rotation::None)));

        grid.open_wall(Pos::new(1, 0), Direction::Right);
        assert_eq!(corner_flags(&grid, center), [false, true, true, true]);
        assert_eq!(
            classify(center, &grid),
            Some((TilePiece::ThreePillars, Rotation::CounterClockwise))
        );
    }

    #[test]
    fn missing_neighbours_contribute_no_walls() {
        let grid = Grid::new(1, 1);
        assert_eq!(corner_flags(&grid, Pos::new(0, 0)), [false; 4]);
        assert_eq!(classify(Pos::new(5, 5), &grid), None);
    }

    #[test]
    fn external_pieces_follow_absent_neighbours() {
        let grid = Grid::new(3, 3);
        assert_eq!(classify_external(Pos::new(1, 1), &grid), None);
        assert_eq!(
            classify_external(Pos::new(1, 0), &grid),
            Some((ExternalPiece::Single, Rotation::None))
        );
        assert_eq!(
            classify_external(Pos::new(0, 1), &grid),
            Some((ExternalPiece::Single, Rotation::CounterClockwise))
        );
        assert_eq!(
            classify_external(Pos::new(0, 0), &grid),
            Some((ExternalPiece::Corner, Rotation::None))
        );
        assert_eq!(
            classify_external(Pos::new(2, 2), &grid),
            Some((ExternalPiece::Corner, Rotation::Half))
        );

        let column = Grid::new(1, 3);
        assert_eq!(
            classify_external(Pos::new(0, 0), &column),
            Some((ExternalPiece::Hoop, Rotation::None))
        );
        assert_eq!(
            classify_external(Pos::new(0, 2), &column),
            Some((ExternalPiece::Hoop, Rotation::Half))
        );
        assert_eq!(classify_external(Pos::new(0, 1), &column), None);
    }
}
