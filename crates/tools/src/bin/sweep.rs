use anyhow::{Context, Result, ensure};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use worldgen::geometry::HUMAN_RADIUS;
use worldgen::mapgen::Placement;
use worldgen::{Difficulty, GeneratedWorld, WorldGenerator};

/// Generates many worlds from one seed and checks their invariants.
#[derive(Parser)]
#[command(author, version, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    worlds: u32,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn check_world(world: &GeneratedWorld) -> Result<()> {
    let grid = &world.grid;
    let reachable = grid.reachable_from(world.start.entry, |_| false);
    ensure!(reachable.len() == world.width() * world.height(), "maze is not fully connected");

    for pos in grid.positions() {
        for (direction, next) in grid.neighbours(pos) {
            ensure!(
                grid.is_open(pos, direction) == grid.is_open(next, direction.opposite()),
                "wall between {pos} and {next} differs per side"
            );
        }
    }

    let mut footprints: Vec<_> =
        world.humans.iter().map(|human| (human.position, HUMAN_RADIUS)).collect();
    footprints.extend(world.obstacles.iter().filter_map(|obstacle| match obstacle.placement {
        Placement::Placed(point) => Some((point, obstacle.radius())),
        Placement::OffMap => None,
    }));
    for (index, &(center, radius)) in footprints.iter().enumerate() {
        for &(other, other_radius) in &footprints[index + 1..] {
            ensure!(
                center.distance(other) + 1e-9 >= radius + other_radius,
                "objects at {center:?} and {other:?} overlap"
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Sweeping {} worlds from seed {}...", args.worlds, args.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let presets: Vec<Difficulty> = Difficulty::all().collect();
    let mut short = 0;

    for _ in 0..args.worlds {
        let preset = choose(&mut rng, &presets);
        let mut config = preset.config();
        config.static_obstacles = (rng.next_u64() % 6) as usize;
        config.debris = (rng.next_u64() % 10) as usize;
        let world_seed = rng.next_u64();

        let world = WorldGenerator::new(config, world_seed).generate().with_context(|| {
            format!("generation failed for preset {} seed {world_seed}", preset.level())
        })?;
        check_world(&world).with_context(|| {
            format!("invariant broken for preset {} seed {world_seed}", preset.level())
        })?;
        if !world.report.is_complete() {
            short += 1;
        }
    }

    println!("All worlds passed; {short} placed fewer features than requested.");
    Ok(())
}
