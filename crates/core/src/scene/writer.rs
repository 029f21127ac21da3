//! Text rendering of a [`Scene`] in the simulator's world file format.

use std::fmt::{self, Write};
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::GenerationError;
use crate::mapgen::{GeneratedWorld, SpecialKind};
use crate::types::WorldPoint;

use super::emit::{BoundsGroup, ObstacleRecord, Scene};

pub const SCENE_EXTENSION: &str = "wbt";

const HEADER: &str = "#VRML_SIM R2021a utf8";

/// Writes scene sections one after another into any text sink.
pub struct SceneWriter<W> {
    out: W,
}

fn overlay_name(special: SpecialKind) -> &'static str {
    match special {
        SpecialKind::Checkpoint => "checkpoint",
        SpecialKind::Trap => "trap",
        SpecialKind::Goal => "goal",
        SpecialKind::Swamp => "swamp",
        SpecialKind::None => "floor",
    }
}

fn flag(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

/// Floor-plane point as a translation at ground level.
struct At(WorldPoint);

impl fmt::Display for At {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} 0 {:.4}", self.0.x, self.0.z)
    }
}

impl<W: Write> SceneWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write(&mut self, scene: &Scene) -> fmt::Result {
        self.header(scene)?;
        self.external_walls(scene)?;
        self.tiles(scene)?;
        self.overlays(scene)?;
        self.bounds(scene)?;
        self.obstacles("OBSTACLES", "obstacle", &scene.obstacles)?;
        self.obstacles("DEBRIS", "debris", &scene.debris)?;
        self.humans(scene)?;
        self.robots(scene)?;
        self.supervisor()
    }

    fn header(&mut self, scene: &Scene) -> fmt::Result {
        let header = &scene.header;
        writeln!(self.out, "{HEADER}")?;
        writeln!(
            self.out,
            "# maze {}x{} seed {} fingerprint {:016x}",
            header.width, header.height, header.seed, header.fingerprint
        )?;
        writeln!(self.out, "WorldInfo {{")?;
        writeln!(self.out, "  basicTimeStep 16")?;
        writeln!(self.out, "  contactProperties [")?;
        writeln!(self.out, "    ContactProperties {{ coulombFriction [ 0.5 ] }}")?;
        writeln!(self.out, "  ]")?;
        writeln!(self.out, "}}")?;
        writeln!(self.out, "Viewpoint {{")?;
        writeln!(self.out, "  orientation -1 0 0 1.5708")?;
        let distance = header.width.max(header.height) as f64 * 0.5;
        writeln!(self.out, "  position 0 {distance:.4} 0")?;
        writeln!(self.out, "}}")?;
        writeln!(self.out, "TexturedBackground {{")?;
        writeln!(self.out, "}}")?;
        writeln!(self.out, "TexturedBackgroundLight {{")?;
        writeln!(self.out, "}}")
    }

    fn open_group(&mut self, name: &str) -> fmt::Result {
        writeln!(self.out, "DEF {name} Group {{")?;
        writeln!(self.out, "  children [")
    }

    fn close_group(&mut self) -> fmt::Result {
        writeln!(self.out, "  ]")?;
        writeln!(self.out, "}}")
    }

    fn external_walls(&mut self, scene: &Scene) -> fmt::Result {
        self.open_group("EXTERNALWALLS")?;
        for wall in &scene.external_walls {
            writeln!(
                self.out,
                "    {} {{ translation {} rotation 0 1 0 {:.5} name \"external{}\" }}",
                wall.piece.name(),
                At(wall.translation),
                wall.rotation.radians(),
                wall.tile_id
            )?;
        }
        self.close_group()
    }

    fn tiles(&mut self, scene: &Scene) -> fmt::Result {
        self.open_group("WALLTILES")?;
        for tile in &scene.tiles {
            writeln!(
                self.out,
                "    DEF TILE{id} {piece} {{ translation {at} rotation 0 1 0 {rotation:.5} \
                 scale {scale} {scale} {scale} checkpoint {checkpoint} trap {trap} \
                 goal {goal} swamp {swamp} name \"tile{id}\" }}",
                id = tile.tile_id,
                piece = tile.piece.name(),
                at = At(tile.translation),
                rotation = tile.rotation.radians(),
                scale = tile.scale,
                checkpoint = flag(tile.checkpoint()),
                trap = flag(tile.trap()),
                goal = flag(tile.goal()),
                swamp = flag(tile.swamp()),
            )?;
        }
        self.close_group()
    }

    fn overlays(&mut self, scene: &Scene) -> fmt::Result {
        self.open_group("SPECIALTILES")?;
        for overlay in &scene.overlays {
            writeln!(
                self.out,
                "    {} {{ translation {} name \"{}{}\" }}",
                overlay_name(overlay.special),
                At(overlay.translation),
                overlay_name(overlay.special),
                overlay.tile_id
            )?;
        }
        self.close_group()
    }

    fn bounds(&mut self, scene: &Scene) -> fmt::Result {
        for group in BoundsGroup::ALL {
            self.open_group(&format!("{}BOUNDS", group.name().to_uppercase()))?;
            for bounds in scene.bounds_in(group) {
                let name = group.name();
                let id = bounds.id;
                let (min, max) = (At(bounds.area.min), At(bounds.area.max));
                writeln!(self.out, "    DEF {name}{id}min Transform {{ translation {min} }}")?;
                writeln!(self.out, "    DEF {name}{id}max Transform {{ translation {max} }}")?;
            }
            self.close_group()?;
        }
        Ok(())
    }

    fn obstacles(&mut self, group: &str, prefix: &str, records: &[ObstacleRecord]) -> fmt::Result {
        self.open_group(group)?;
        for record in records {
            writeln!(
                self.out,
                "    DEF {prefix}{id} Solid {{ translation {x:.4} {y:.4} {z:.4} \
                 size {w:.2} {h:.2} {d:.2} static {is_static} onMap {on_map} \
                 name \"{prefix}{id}\" }}",
                id = record.id,
                x = record.translation.x,
                y = record.height / 2.0,
                z = record.translation.z,
                w = record.width,
                h = record.height,
                d = record.depth,
                is_static = flag(record.is_static),
                on_map = flag(record.on_map),
            )?;
        }
        self.close_group()
    }

    fn humans(&mut self, scene: &Scene) -> fmt::Result {
        self.open_group("HUMANGROUP")?;
        for human in &scene.humans {
            writeln!(
                self.out,
                "    DEF human{id}solid Solid {{ translation {at} rotation 0 1 0 {rotation:.5} \
                 description \"{kind},{score}\" name \"human{id}\" }}",
                id = human.id,
                at = At(human.translation),
                rotation = human.rotation,
                kind = human.type_name,
                score = human.score,
            )?;
        }
        self.close_group()
    }

    fn robots(&mut self, scene: &Scene) -> fmt::Result {
        for robot in &scene.robots {
            writeln!(
                self.out,
                "DEF ROBOT{id} E-puck {{ translation {at} rotation 0 1 0 {rotation:.5} \
                 name \"e-puck {id}\" controller \"\" }}",
                id = robot.id,
                at = At(robot.translation),
                rotation = robot.rotation,
            )?;
        }
        Ok(())
    }

    fn supervisor(&mut self) -> fmt::Result {
        writeln!(self.out, "DEF MAINSUPERVISOR Robot {{")?;
        writeln!(self.out, "  children [ Receiver {{ }} Emitter {{ }} ]")?;
        writeln!(self.out, "  controller \"MainSupervisor\"")?;
        writeln!(self.out, "  supervisor TRUE")?;
        writeln!(self.out, "}}")
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SceneWriter::new(f).write(self)
    }
}

/// Appends the scene extension unless the path already carries it.
pub fn scene_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|extension| extension == SCENE_EXTENSION) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(SCENE_EXTENSION);
        PathBuf::from(name)
    }
}

/// Renders the world and writes it in one go, returning the final path.
pub fn write_scene(world: &GeneratedWorld, path: &Path) -> Result<PathBuf, GenerationError> {
    let path = scene_path(path);
    let text = Scene::build(world).to_string();
    fs::write(&path, text).map_err(|source| GenerationError::Io { path: path.clone(), source })?;
    info!("wrote scene to {}", path.display());
    Ok(path)
}
