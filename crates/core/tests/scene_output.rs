use std::fs;

use worldgen::mapgen::SpecialKind;
use worldgen::scene::{BoundsGroup, TilePiece, classify};
use worldgen::{Difficulty, GenerationConfig, Pos, Scene, generate_world, write_scene};

#[test]
fn scene_file_lists_every_tile_and_special() {
    let world = generate_world(Difficulty::new(4).unwrap().config(), 2_468).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_scene(&world, &dir.path().join("generatedWorld")).unwrap();
    assert_eq!(path.extension().unwrap(), "wbt");

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches("DEF TILE").count(), world.width() * world.height() + 1);
    assert_eq!(
        text.matches("checkpoint TRUE").count(),
        world.grid.count_special(SpecialKind::Checkpoint)
    );
    assert_eq!(text.matches("trap TRUE").count(), world.grid.count_special(SpecialKind::Trap));
    assert_eq!(text.matches("goal TRUE").count(), 1);
    assert_eq!(text.matches("DEF human").count(), world.humans.len());
    assert!(text.contains(&format!("fingerprint {:016x}", world.fingerprint())));
}

#[test]
fn bounds_contain_their_tile_centres_only() {
    let world = generate_world(Difficulty::new(3).unwrap().config(), 11).unwrap();
    let scene = Scene::build(&world);
    let checkpoints = world.special_tiles(SpecialKind::Checkpoint);
    let bounds: Vec<_> = scene.bounds_in(BoundsGroup::Checkpoint).collect();
    assert_eq!(bounds.len(), checkpoints.len());
    for record in bounds {
        let centre = record.area.center();
        assert!(record.contains(centre));
        let inside = scene.tiles.iter().filter(|tile| record.contains(tile.translation)).count();
        assert_eq!(inside, 1);
    }
}

#[test]
fn pieces_in_the_scene_match_the_classifier() {
    let world = generate_world(GenerationConfig::empty(6, 6), 6).unwrap();
    let scene = Scene::build(&world);
    let positions: Vec<Pos> = world.grid.positions().chain([world.start.bay]).collect();
    for (tile, pos) in scene.tiles.iter().zip(positions) {
        let (piece, rotation) = classify(pos, &world).unwrap();
        assert_eq!((tile.piece, tile.rotation), (piece, rotation), "mismatch at {pos}");
    }
    assert!(scene.tiles.iter().all(|tile| TilePiece::ALL.contains(&tile.piece)));
}

#[test]
fn scene_serializes_to_json() {
    let world = generate_world(GenerationConfig::empty(4, 4), 1).unwrap();
    let value = serde_json::to_value(Scene::build(&world)).unwrap();
    assert_eq!(value["tiles"].as_array().unwrap().len(), 17);
    assert_eq!(value["robots"].as_array().unwrap().len(), 2);
    assert_eq!(value["header"]["width"], 4);
}
