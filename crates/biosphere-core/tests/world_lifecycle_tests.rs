//! Integration tests for the world lifecycle
//!
//! Create a world on disk, edit its creature, play it, rename and delete it,
//! going through the same calls the binary makes.

use biosphere_core::world::{Difficulty, StoreError, WorldStore};
use biosphere_core::{CreatureEditor, GameSession, SessionConfig, SimulationState};
use biosphere_creature::{CreatureComposer, MovementInput, PartCatalog, PartStats, Region};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use tempfile::TempDir;

fn setup() -> (TempDir, WorldStore, PartCatalog) {
    let dir = TempDir::new().unwrap();
    let store = WorldStore::open(dir.path().join("Worlds")).unwrap();
    let catalog = PartCatalog::embedded().unwrap();
    (dir, store, catalog)
}

// ============================================================================
// Create / Edit / Rename / Delete
// ============================================================================

#[test]
fn test_reef_lifecycle() {
    let (_dir, store, catalog) = setup();
    let composer = CreatureComposer::new(&catalog);

    // Create
    let world = store.create("Reef", Difficulty::Medium).unwrap();
    let path = store.dir().join("Reef.json");
    assert!(path.is_file());

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["difficulty"], "Medium");
    assert_eq!(raw["deathCount"], 0);

    // Select parts
    let mut editor = CreatureEditor::enter(world);
    editor.select(&composer, "Green_Body").unwrap();
    editor.select(&composer, "Red_Eyes").unwrap();
    editor.select(&composer, "Blue_Fins").unwrap();

    let expected: PartStats = ["Green_Body", "Red_Eyes", "Blue_Fins"]
        .iter()
        .map(|id| catalog.find_by_id(id).unwrap().stats)
        .sum();
    assert_eq!(editor.stats(&composer), expected);
    let saved = editor.save(&store).unwrap();

    // Rename
    let renamed = store.rename("Reef", "Atoll").unwrap();
    assert!(!path.exists());
    assert!(store.dir().join("Atoll.json").is_file());

    let loaded = store.load("Atoll").unwrap();
    assert_eq!(loaded, renamed);
    assert_eq!(loaded.difficulty, saved.difficulty);
    assert_eq!(loaded.selected_parts, saved.selected_parts);
    assert_eq!(loaded.death_count, saved.death_count);
    assert_eq!(loaded.play_time, saved.play_time);

    // Delete
    store.delete("Atoll").unwrap();
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_second_select_replaces_region() {
    let (_dir, store, catalog) = setup();
    let composer = CreatureComposer::new(&catalog);
    let world = store.create("Kelp", Difficulty::Easy).unwrap();

    let mut editor = CreatureEditor::enter(world);
    editor.select(&composer, "Red_Body").unwrap();
    editor.select(&composer, "Blue_Body").unwrap();
    let saved = editor.save(&store).unwrap();

    assert_eq!(saved.selected_parts.len(), 3);
    assert_eq!(saved.selected_parts.get(Region::Body), Some("Blue_Body"));
}

#[test]
fn test_duplicate_and_missing_worlds() {
    let (_dir, store, _catalog) = setup();
    store.create("Reef", Difficulty::Medium).unwrap();

    assert!(matches!(
        store.create("Reef", Difficulty::Hard),
        Err(StoreError::InvalidName(_))
    ));
    assert!(matches!(
        store.rename("Lagoon", "Atoll"),
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(store.delete("Lagoon"), Err(StoreError::NotFound(_))));
    assert_eq!(store.list().unwrap(), vec!["Reef".to_string()]);
}

// ============================================================================
// Gameplay
// ============================================================================

#[test]
fn test_play_time_persists_after_session() {
    let (_dir, store, catalog) = setup();
    let world = store.create("Reef", Difficulty::Hard).unwrap();
    let mut rng = Xoshiro256StarStar::seed_from_u64(42);

    let mut session = GameSession::new(world, &catalog, &SessionConfig::default(), &mut rng);
    let mut state = SimulationState::Running;
    for frame in 0..120 {
        if frame == 60 {
            state = state.toggled();
        }
        session.tick(state, MovementInput::new(0.3, 1.0), 1.0 / 60.0, &mut rng);

        let enemy = session.enemy().transform.position;
        let player = session.player().transform.position;
        assert!(enemy.distance(player) <= SessionConfig::default().pursuit.despawn_distance);
    }

    store.save(&session.into_world()).unwrap();
    let loaded = store.load("Reef").unwrap();
    assert!((loaded.play_time - 1.0).abs() < 1e-4);
}

#[test]
fn test_first_release_save_on_disk_loads() {
    let (_dir, store, catalog) = setup();
    let composer = CreatureComposer::new(&catalog);
    std::fs::write(
        store.path_for("Old"),
        r#"{"WorldName":"Old","WorldDifficulty":"Easy","TimesDied":2,"TimePlayed":30.0,"AvailableFeatures":[],"SelectedFeatures":["Red_Fins","Blue_Body","Green_Eyes"]}"#,
    )
    .unwrap();

    let world = store.load("Old").unwrap();
    assert_eq!(world.version, biosphere_core::world::SAVE_FORMAT_VERSION);
    assert_eq!(world.death_count, 2);
    assert_eq!(world.selected_parts.get(Region::Body), Some("Blue_Body"));

    let expected: PartStats = ["Red_Fins", "Blue_Body", "Green_Eyes"]
        .iter()
        .map(|id| catalog.find_by_id(id).unwrap().stats)
        .sum();
    assert_eq!(composer.aggregate_stats(&world.selected_parts), expected);
}
