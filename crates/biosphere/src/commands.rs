//! Subcommand implementations

use anyhow::{bail, Context, Result};
use biosphere_core::{
    CreatureEditor, Difficulty, GameSession, NameError, NoticeBoard, SessionConfig,
    SimulationState, StoreError, WorldSave, WorldStore,
};
use biosphere_creature::{BaseBody, CreatureComposer, MovementInput, PartCatalog, Region};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::config::GameConfig;

/// Options for a headless play run
#[derive(Debug, Clone)]
pub struct PlayOptions {
    pub seconds: f32,
    pub fps: u32,
    pub forward: f32,
    pub turn: f32,
    pub pause_after: Option<f32>,
    pub seed: Option<u64>,
}

pub struct App {
    store: WorldStore,
    catalog: PartCatalog,
    gameplay: SessionConfig,
    notices: NoticeBoard,
}

impl App {
    pub fn new(config: &GameConfig) -> Result<Self> {
        let catalog = match &config.catalog.path {
            Some(path) => PartCatalog::load(path)
                .with_context(|| format!("Failed to load part catalog {}", path.display()))?,
            None => PartCatalog::embedded().context("Built-in part catalog is invalid")?,
        };

        let store = WorldStore::open(&config.world.save_dir)
            .with_context(|| {
                format!(
                    "Failed to open save directory {}",
                    config.world.save_dir.display()
                )
            })?
            .with_catalog(catalog.clone());

        Ok(Self {
            store,
            catalog,
            gameplay: config.gameplay.clone(),
            notices: NoticeBoard::new(config.ui.notice_seconds),
        })
    }

    /// Print and drop the notices still on screen
    pub fn flush_notices(&mut self) {
        for notice in self.notices.active() {
            eprintln!("{}", notice);
        }
        self.notices.clear();
    }

    fn reject_name(&mut self, err: NameError) -> Result<()> {
        self.notices.warning(err.to_string());
        bail!("World name rejected")
    }

    pub fn parts(&self, region: Option<Region>) -> Result<()> {
        let regions: Vec<Region> = match region {
            Some(region) => vec![region],
            None => Region::ALL.to_vec(),
        };

        for region in regions {
            println!("{}:", region);
            for part in self.catalog.list_by_region(region) {
                println!("  {:<12} {}", part.id, part.stats);
            }
        }
        Ok(())
    }

    pub fn worlds(&self) -> Result<()> {
        let names = self.store.list().context("Failed to list worlds")?;
        if names.is_empty() {
            println!("No worlds yet. Create one with `biosphere create <name>`.");
            return Ok(());
        }

        for name in names {
            match self.store.load(&name) {
                Ok(world) => println!(
                    "{:<16} {:<7} deaths {:>3}  played {}",
                    world.name,
                    world.difficulty,
                    world.death_count,
                    format_play_time(world.play_time)
                ),
                Err(e) => {
                    log::warn!("Skipping unreadable world '{}': {}", name, e);
                    println!("{:<16} (unreadable)", name);
                }
            }
        }
        Ok(())
    }

    pub fn create(&mut self, name: &str, difficulty: Difficulty) -> Result<()> {
        match self.store.create(name, difficulty) {
            Ok(world) => {
                println!("Created world '{}' ({})", world.name, world.difficulty);
                Ok(())
            }
            Err(StoreError::InvalidName(err)) => self.reject_name(err),
            Err(e) => Err(e).with_context(|| format!("Failed to create world '{}'", name)),
        }
    }

    pub fn show(&self, name: &str) -> Result<()> {
        let world = self.load(name)?;
        let composer = CreatureComposer::new(&self.catalog);
        let model = composer.assemble(&world.selected_parts, &BaseBody::standard());

        println!("World:      {}", world.name);
        println!("Difficulty: {}", world.difficulty);
        println!("Deaths:     {}", world.death_count);
        println!("Played:     {}", format_play_time(world.play_time));
        println!("Stats:      {}", composer.aggregate_stats(&world.selected_parts));
        println!("Creature:");
        for region in Region::ALL {
            match model.part(region) {
                Some(part) => println!(
                    "  {:<5} {:<12} at ({:.2}, {:.2}){}",
                    region,
                    part.part_id,
                    part.offset.x,
                    part.offset.y,
                    if part.anchored { "" } else { " (root)" }
                ),
                None => println!("  {:<5} -", region),
            }
        }
        Ok(())
    }

    pub fn select(&self, world: &str, parts: &[String]) -> Result<()> {
        let composer = CreatureComposer::new(&self.catalog);
        let mut editor = CreatureEditor::enter(self.load(world)?);

        for id in parts {
            editor
                .select(&composer, id)
                .with_context(|| format!("Cannot select '{}'", id))?;
        }

        let stats = editor.stats(&composer);
        let saved = editor
            .save(&self.store)
            .with_context(|| format!("Failed to save world '{}'", world))?;
        println!("Saved creature for '{}': {}", saved.name, stats);
        Ok(())
    }

    pub fn clear(&self, world: &str, region: Region) -> Result<()> {
        let composer = CreatureComposer::new(&self.catalog);
        let mut editor = CreatureEditor::enter(self.load(world)?);

        match editor.clear(&composer, region) {
            Some(removed) => {
                let stats = editor.stats(&composer);
                editor
                    .save(&self.store)
                    .with_context(|| format!("Failed to save world '{}'", world))?;
                println!("Removed {} from {}: {}", removed, region, stats);
            }
            None => {
                editor.discard();
                println!("Nothing selected for {}", region);
            }
        }
        Ok(())
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        match self.store.rename(old, new) {
            Ok(world) => {
                println!("Renamed '{}' to '{}'", old, world.name);
                Ok(())
            }
            Err(StoreError::InvalidName(err)) => self.reject_name(err),
            Err(e) => Err(e).with_context(|| format!("Failed to rename world '{}'", old)),
        }
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        self.store
            .delete(name)
            .with_context(|| format!("Failed to delete world '{}'", name))?;
        println!("Deleted world '{}'", name);
        Ok(())
    }

    pub fn play(&mut self, name: &str, options: PlayOptions) -> Result<()> {
        if options.fps == 0 || options.seconds < 0.0 {
            bail!("Frame rate must be positive and duration non-negative");
        }

        let world = self.load(name)?;
        let seed = options.seed.unwrap_or_else(rand::random);
        log::info!("Playing '{}' with seed {}", world.name, seed);
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);

        let delta_time = 1.0 / options.fps as f32;
        let frames = (options.seconds * options.fps as f32).round() as u32;
        let input = MovementInput::new(options.turn, options.forward);

        let mut session = GameSession::new(world, &self.catalog, &self.gameplay, &mut rng);
        let mut state = SimulationState::Running;
        let mut simulated = 0u32;
        let mut respawns = 0u32;

        for frame in 0..frames {
            if let Some(limit) = options.pause_after {
                if state == SimulationState::Running && frame as f32 * delta_time >= limit {
                    state = state.toggled();
                    self.notices.info("Paused");
                }
            }

            let report = session.tick(state, input, delta_time, &mut rng);
            if report.simulated {
                simulated += 1;
                // Notices only age while the game runs
                self.notices.tick(delta_time);
            }
            if report.enemy_respawned {
                respawns += 1;
                self.notices.info("A new predator picked up your trail");
            }
        }

        let player = session.player().transform;
        let enemy = session.enemy().transform;
        println!(
            "Simulated {} of {} frames: player at ({:.2}, {:.2}), predator {:.2} away, {} respawns",
            simulated,
            frames,
            player.position.x,
            player.position.y,
            enemy.position.distance(player.position),
            respawns
        );

        let world = session.into_world();
        self.store
            .save(&world)
            .with_context(|| format!("Failed to save world '{}'", world.name))?;
        println!("Total play time: {}", format_play_time(world.play_time));
        Ok(())
    }

    fn load(&self, name: &str) -> Result<WorldSave> {
        self.store
            .load(name)
            .with_context(|| format!("Failed to load world '{}'", name))
    }
}

fn format_play_time(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}
