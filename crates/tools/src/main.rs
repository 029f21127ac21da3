use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, value_parser};
use env_logger::{Builder, Env};
use log::info;
use serde::Serialize;
use worldgen::mapgen::{ArenaConfig, ArenaLayout, StartPosition, generate_arena};
use worldgen::{
    Difficulty, GeneratedWorld, GenerationConfig, PlacementReport, Pos, WorldGenerator,
    render_ascii, write_map_image, write_scene,
};

mod seed;

use seed::SeedChoice;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a rescue maze world file", long_about = None)]
struct Args {
    /// Run seed; a time-derived seed is used when omitted
    #[arg(short, long)]
    seed: Option<u64>,
    /// TOML file with generation parameters
    #[arg(short, long, conflicts_with = "difficulty")]
    config: Option<PathBuf>,
    /// Built-in preset, 1 (easiest) to 6 (hardest)
    #[arg(short, long, value_parser = value_parser!(u8).range(1..=6))]
    difficulty: Option<u8>,
    #[arg(long)]
    width: Option<usize>,
    #[arg(long)]
    height: Option<usize>,
    /// Scene file to write; the .wbt extension is added when missing
    #[arg(short, long, default_value = "generatedWorld.wbt")]
    output: PathBuf,
    /// Print an ASCII picture of the maze
    #[arg(long)]
    preview: bool,
    /// Also write a PNG map of the maze, 20 pixels per tile
    #[arg(long, value_name = "PATH")]
    map_image: Option<PathBuf>,
    /// Print a JSON summary instead of the text report
    #[arg(long)]
    summary_json: bool,
    /// Lay out the open room-and-base arena instead of a maze; the preset's
    /// obstacle and victim counts carry over and no scene file is written
    #[arg(long, conflicts_with_all = ["preview", "map_image"])]
    rooms: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    seed: u64,
    fingerprint: String,
    width: usize,
    height: usize,
    start: StartPosition,
    end_tile: Pos,
    report: &'a PlacementReport,
    scene: PathBuf,
}

fn load_config(args: &Args) -> Result<GenerationConfig> {
    let mut config = match (&args.config, args.difficulty) {
        (Some(path), _) => GenerationConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        (None, Some(level)) => Difficulty::new(level)
            .with_context(|| format!("Unknown difficulty: {level}"))?
            .config(),
        (None, None) => GenerationConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    Ok(config)
}

fn print_report(world: &GeneratedWorld, seed: SeedChoice, scene: &Path) {
    println!("Seed: {} ({})", seed.value(), seed.origin());
    println!("Size: {}x{}", world.width(), world.height());
    for (name, placed) in world.report.entries() {
        let note = if placed.is_complete() { "" } else { "  (short)" };
        println!("{name:>16}: {}/{}{note}", placed.placed, placed.requested);
    }
    println!("Fingerprint: {:016x}", world.fingerprint());
    println!("Scene: {}", scene.display());
}

fn arena_config(config: &GenerationConfig) -> ArenaConfig {
    ArenaConfig {
        obstacles: config.static_obstacles,
        humans: config.total_humans(),
        ..ArenaConfig::default()
    }
}

fn print_arena(layout: &ArenaLayout, seed: SeedChoice) {
    println!("Seed: {} ({})", seed.value(), seed.origin());
    println!("Arena: {}x{}", layout.floor.width(), layout.floor.depth());
    println!("{:>16}: {}", "rooms", layout.rooms.len());
    println!("{:>16}: {}", "bases", layout.bases.len());
    println!("{:>16}: {}", "obstacles", layout.obstacles.len());
    println!("{:>16}: {}", "victims", layout.humans.len());
}

fn run_arena(args: &Args, config: &GenerationConfig, seed: SeedChoice) -> Result<()> {
    let layout = generate_arena(&arena_config(config), seed.value())
        .with_context(|| format!("Arena layout failed for seed {}", seed.value()))?;
    if args.summary_json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
    } else {
        print_arena(&layout, seed);
    }
    Ok(())
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = load_config(&args)?;
    let seed = SeedChoice::resolve(args.seed);
    if args.rooms {
        return run_arena(&args, &config, seed);
    }
    info!("generating {}x{} maze with seed {}", config.width, config.height, seed.value());

    let world = WorldGenerator::new(config, seed.value())
        .generate()
        .with_context(|| format!("World generation failed for seed {}", seed.value()))?;
    let scene = write_scene(&world, &args.output)
        .with_context(|| format!("Failed to write scene: {}", args.output.display()))?;

    if args.preview {
        print!("{}", render_ascii(&world));
    }
    if let Some(path) = &args.map_image {
        write_map_image(&world, path)
            .with_context(|| format!("Failed to write map image: {}", path.display()))?;
    }
    if args.summary_json {
        let summary = Summary {
            seed: seed.value(),
            fingerprint: format!("{:016x}", world.fingerprint()),
            width: world.width(),
            height: world.height(),
            start: world.start,
            end_tile: world.end_tile,
            report: &world.report,
            scene,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(&world, seed, &scene);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn parse(parts: &[&str]) -> Args {
        Args::try_parse_from(parts).unwrap()
    }

    #[test]
    fn defaults_to_the_middle_preset() {
        let args = parse(&["worldgen"]);
        assert_eq!(load_config(&args).unwrap(), GenerationConfig::default());
        assert_eq!(args.output, PathBuf::from("generatedWorld.wbt"));
    }

    #[test]
    fn size_flags_override_the_preset() {
        let args = parse(&["worldgen", "--difficulty", "6", "--width", "8", "--height", "4"]);
        let config = load_config(&args).unwrap();
        let preset = Difficulty::new(6).unwrap().config();
        assert_eq!((config.width, config.height), (8, 4));
        assert_eq!(config.visual_humans, preset.visual_humans);
    }

    #[test]
    fn difficulty_outside_the_preset_range_is_rejected() {
        assert!(Args::try_parse_from(["worldgen", "--difficulty", "7"]).is_err());
        assert!(Args::try_parse_from(["worldgen", "--difficulty", "0"]).is_err());
    }

    #[test]
    fn config_and_difficulty_are_exclusive() {
        let parsed = Args::try_parse_from(["worldgen", "--config", "a.toml", "--difficulty", "2"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maze.toml");
        fs::write(&path, "width = 9\nheight = 3\ntraps = 0\n").unwrap();
        let args = parse(&["worldgen", "--config", path.to_str().unwrap()]);
        let config = load_config(&args).unwrap();
        assert_eq!((config.width, config.height, config.traps), (9, 3, 0));
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let args = parse(&["worldgen", "--config", "/nonexistent/maze.toml"]);
        let error = load_config(&args).unwrap_err();
        assert!(format!("{error:#}").contains("/nonexistent/maze.toml"));
    }

    #[test]
    fn rooms_mode_carries_preset_counts_into_the_arena() {
        let args = parse(&["worldgen", "--difficulty", "3", "--rooms"]);
        let config = load_config(&args).unwrap();
        let arena = arena_config(&config);
        assert_eq!(arena.obstacles, config.static_obstacles);
        assert_eq!(arena.humans, config.visual_humans + config.thermal_humans);
        let layout = generate_arena(&arena, 5).unwrap();
        assert_eq!(layout.humans.len(), arena.humans);
    }

    #[test]
    fn rooms_mode_excludes_maze_pictures() {
        assert!(Args::try_parse_from(["worldgen", "--rooms", "--preview"]).is_err());
        assert!(Args::try_parse_from(["worldgen", "--rooms", "--map-image", "m.png"]).is_err());
    }

    #[test]
    fn map_image_flag_takes_a_path() {
        let args = parse(&["worldgen", "--map-image", "map.png"]);
        assert_eq!(args.map_image, Some(PathBuf::from("map.png")));
        assert!(!args.rooms);
    }
}
