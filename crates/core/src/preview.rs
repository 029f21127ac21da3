//! Pictures of a generated maze: plain text for terminals and logs, and a
//! colour map image with one 20 pixel square per tile.

use std::ops::RangeInclusive;
use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use log::info;

use crate::error::GenerationError;
use crate::mapgen::{GeneratedWorld, HumanKind, SpecialKind, Tile};
use crate::types::{Direction, Pos};

pub const TILE_PIXELS: u32 = 20;
const WALL_PIXELS: u32 = 2;
/// Victim strips run along the middle of the wall, one pixel inside it.
const VICTIM_SPAN: RangeInclusive<u32> = 5..=15;

const EMPTY: Rgb<u8> = Rgb([255, 255, 255]);
const WALL: Rgb<u8> = Rgb([0, 0, 255]);
const VISUAL_VICTIM: Rgb<u8> = Rgb([255, 0, 255]);
const THERMAL_VICTIM: Rgb<u8> = Rgb([255, 0, 0]);

fn wall_between(world: &GeneratedWorld, pos: Pos, side: Direction) -> bool {
    world.tile(pos).is_some_and(|tile| tile.has_wall(side))
        || world.tile(pos.step(side)).is_some_and(|tile| tile.has_wall(side.opposite()))
}

fn special_mark(tile: &Tile) -> char {
    match tile.special_kind() {
        SpecialKind::None => ' ',
        SpecialKind::Checkpoint => 'C',
        SpecialKind::Trap => 'T',
        SpecialKind::Goal => 'G',
        SpecialKind::Swamp => 'S',
    }
}

fn push_contents(out: &mut String, world: &GeneratedWorld, pos: Pos) {
    let Some(tile) = world.tile(pos) else {
        out.push_str("  ");
        return;
    };
    out.push(special_mark(tile));
    out.push(match tile.human_info() {
        Some(human) if human.kind.is_visual() => 'h',
        Some(_) => 't',
        None if pos == world.start.bay => '@',
        None => ' ',
    });
}

fn push_edge(out: &mut String, world: &GeneratedWorld, columns: RangeInclusive<i32>, y: i32) {
    for x in columns {
        out.push('+');
        out.push_str(if wall_between(world, Pos::new(x, y), Direction::Up) { "--" } else { "  " });
    }
    out.push_str("+\n");
}

/// Two characters per tile: the special (`C`, `T`, `S`, `G`) then the victim
/// (`h` visual, `t` thermal) or `@` on the robots' start bay.
pub fn render_ascii(world: &GeneratedWorld) -> String {
    let bay = world.start.bay;
    let columns = bay.x.min(0)..=bay.x.max(world.width() as i32 - 1);
    let rows = bay.y.min(0)..=bay.y.max(world.height() as i32 - 1);

    let mut out = String::new();
    for y in rows.clone() {
        push_edge(&mut out, world, columns.clone(), y);
        for x in columns.clone() {
            let pos = Pos::new(x, y);
            out.push(if wall_between(world, pos, Direction::Left) { '|' } else { ' ' });
            push_contents(&mut out, world, pos);
        }
        let last = Pos::new(*columns.end(), y);
        out.push(if wall_between(world, last, Direction::Right) { '|' } else { ' ' });
        out.push('\n');
    }
    // Bottom edge: walls below the last row read as the row above's down walls.
    for x in columns {
        out.push('+');
        let pos = Pos::new(x, *rows.end());
        out.push_str(if wall_between(world, pos, Direction::Down) { "--" } else { "  " });
    }
    out.push_str("+\n");
    out
}

fn floor_colour(kind: SpecialKind) -> Rgb<u8> {
    match kind {
        SpecialKind::None => EMPTY,
        SpecialKind::Checkpoint => Rgb([175, 175, 175]),
        SpecialKind::Trap => Rgb([0, 0, 0]),
        SpecialKind::Goal => Rgb([0, 255, 0]),
        SpecialKind::Swamp => Rgb([222, 184, 135]),
    }
}

fn victim_colour(kind: HumanKind) -> Rgb<u8> {
    if kind.is_visual() { VISUAL_VICTIM } else { THERMAL_VICTIM }
}

/// Pixel `depth` steps in from the `side` edge of a tile, `along` that edge.
fn edge_pixel(side: Direction, along: u32, depth: u32) -> (u32, u32) {
    let far = TILE_PIXELS - 1 - depth;
    match side {
        Direction::Up => (along, depth),
        Direction::Down => (along, far),
        Direction::Left => (depth, along),
        Direction::Right => (far, along),
    }
}

fn paint_tile(image: &mut RgbImage, origin: (u32, u32), tile: &Tile) {
    let mut put = |(x, y): (u32, u32), colour: Rgb<u8>| {
        image.put_pixel(origin.0 + x, origin.1 + y, colour);
    };
    let floor = floor_colour(tile.special_kind());
    for y in 0..TILE_PIXELS {
        for x in 0..TILE_PIXELS {
            put((x, y), floor);
        }
    }
    for side in [Direction::Up, Direction::Left, Direction::Down, Direction::Right] {
        if !tile.has_wall(side) {
            continue;
        }
        for depth in 0..WALL_PIXELS {
            for along in 0..TILE_PIXELS {
                put(edge_pixel(side, along, depth), WALL);
            }
        }
        if let Some(human) = tile.human_info().filter(|human| human.side == side) {
            for along in VICTIM_SPAN {
                put(edge_pixel(side, along, WALL_PIXELS), victim_colour(human.kind));
            }
        }
    }
}

/// Map image with a one-tile white margin around the grid; the start bay is
/// drawn in that margin.
pub fn render_map_image(world: &GeneratedWorld) -> RgbImage {
    let columns = world.width() as u32 + 2;
    let rows = world.height() as u32 + 2;
    let mut image = RgbImage::from_pixel(columns * TILE_PIXELS, rows * TILE_PIXELS, EMPTY);
    for row in 0..rows {
        for column in 0..columns {
            let pos = Pos::new(column as i32 - 1, row as i32 - 1);
            if let Some(tile) = world.tile(pos) {
                paint_tile(&mut image, (column * TILE_PIXELS, row * TILE_PIXELS), tile);
            }
        }
    }
    image
}

/// Writes the map image as PNG, whatever extension `path` carries.
pub fn write_map_image(world: &GeneratedWorld, path: &Path) -> Result<(), GenerationError> {
    render_map_image(world)
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| GenerationError::Image { path: path.to_path_buf(), source })?;
    info!("wrote map image to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GenerationConfig, MazeStyle};
    use crate::mapgen::generate_world;

    fn pixel_at(image: &RgbImage, pos: Pos, (x, y): (u32, u32)) -> Rgb<u8> {
        let column = (pos.x + 1) as u32;
        let row = (pos.y + 1) as u32;
        *image.get_pixel(column * TILE_PIXELS + x, row * TILE_PIXELS + y)
    }

    #[test]
    fn picture_has_one_row_pair_per_tile_row() {
        let mut config = GenerationConfig::empty(4, 3);
        config.maze = MazeStyle::Perfect;
        let world = generate_world(config, 9).unwrap();
        let picture = render_ascii(&world);
        let lines: Vec<&str> = picture.lines().collect();
        // One extra row or column holds the bay.
        let (rows, columns) = if world.start.facing.is_vertical() { (4, 4) } else { (3, 5) };
        assert_eq!(lines.len(), 2 * rows + 1);
        assert!(lines.iter().all(|line| line.chars().count() == 3 * columns + 1));
        assert_eq!(picture.matches('G').count(), 1);
        assert_eq!(picture.matches('@').count(), 1);
    }

    #[test]
    fn features_and_victims_are_marked() {
        let mut config = GenerationConfig::empty(7, 7);
        config.checkpoints = 2;
        config.traps = 1;
        config.visual_humans = 3;
        config.thermal_humans = 2;
        let world = generate_world(config, 31).unwrap();
        let picture = render_ascii(&world);
        assert_eq!(picture.matches('C').count(), world.report.checkpoints.placed);
        assert_eq!(picture.matches('T').count(), world.report.traps.placed);
        let visual = world.humans.iter().filter(|human| human.kind.is_visual()).count();
        assert_eq!(picture.matches('h').count(), visual);
        assert_eq!(picture.matches('t').count(), world.humans.len() - visual);
    }

    #[test]
    fn map_image_has_a_margin_and_twenty_pixels_per_tile() {
        let world = generate_world(GenerationConfig::empty(5, 3), 4).unwrap();
        let image = render_map_image(&world);
        assert_eq!(image.dimensions(), (7 * TILE_PIXELS, 5 * TILE_PIXELS));
        assert_eq!(*image.get_pixel(0, 0), EMPTY);
        assert_eq!(pixel_at(&image, world.start.bay, (10, 10)), Rgb([0, 255, 0]));
    }

    #[test]
    fn walls_specials_and_victims_use_their_colours() {
        let mut config = GenerationConfig::empty(7, 7);
        config.checkpoints = 2;
        config.traps = 1;
        config.visual_humans = 2;
        config.thermal_humans = 2;
        let world = generate_world(config, 31).unwrap();
        let image = render_map_image(&world);

        for pos in world.special_tiles(SpecialKind::Checkpoint) {
            assert_eq!(pixel_at(&image, pos, (10, 10)), Rgb([175, 175, 175]));
        }
        for pos in world.special_tiles(SpecialKind::Trap) {
            assert_eq!(pixel_at(&image, pos, (10, 10)), Rgb([0, 0, 0]));
        }
        for (pos, tile) in world.grid.tiles() {
            let floor = floor_colour(tile.special_kind());
            for side in Direction::ALL {
                let expected = if tile.has_wall(side) { WALL } else { floor };
                assert_eq!(pixel_at(&image, pos, edge_pixel(side, 10, 1)), expected);
            }
        }
        for human in &world.humans {
            let colour = pixel_at(&image, human.tile, edge_pixel(human.side, 10, WALL_PIXELS));
            assert_eq!(colour, victim_colour(human.kind));
        }
    }

    #[test]
    fn map_image_is_written_as_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.png");
        let world = generate_world(GenerationConfig::empty(4, 4), 12).unwrap();
        write_map_image(&world, &path).unwrap();
        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded, render_map_image(&world));
    }

    #[test]
    fn map_image_errors_carry_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("map.png");
        let world = generate_world(GenerationConfig::empty(3, 3), 1).unwrap();
        let error = write_map_image(&world, &path).unwrap_err();
        assert!(matches!(
            error,
            GenerationError::Image { path: ref failed, .. } if *failed == path
        ));
    }
}
