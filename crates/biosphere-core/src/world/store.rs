//! On-disk world store: one JSON file per world, named after the world

use std::path::{Path, PathBuf};

use biosphere_creature::{CatalogError, CreatureComposer, PartCatalog};
use thiserror::Error;

use super::name::{sanitize_file_stem, validate_world_name, NameError};
use super::save::{Difficulty, SaveFormatError, WorldSave};

const SAVE_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    InvalidName(#[from] NameError),

    #[error("world not found: {0}")]
    NotFound(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read world '{name}': {source}")]
    Format {
        name: String,
        #[source]
        source: SaveFormatError,
    },

    #[error("failed to encode world: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

/// Manages world save files inside a single directory
#[derive(Debug, Clone)]
pub struct WorldStore {
    dir: PathBuf,
    /// Resolves regions when migrating first-release saves
    catalog: PartCatalog,
}

impl WorldStore {
    /// Open (and create if needed) the save directory, using the built-in catalog
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        Ok(Self {
            dir,
            catalog: PartCatalog::embedded()?,
        })
    }

    /// Use `catalog` when migrating saves
    pub fn with_catalog(mut self, catalog: PartCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a world with this name is stored in
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!(
            "{}.{}",
            sanitize_file_stem(name.trim()),
            SAVE_EXTENSION
        ))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Names of all stored worlds (file stems), sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.dir).map_err(io_error(&self.dir))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(io_error(&self.dir))?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(SAVE_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Validate `name` as a new world name against the stored worlds
    pub fn validate_new_name(&self, name: &str) -> Result<()> {
        let existing = self.list()?;
        validate_world_name(name, existing.iter().map(String::as_str))?;
        Ok(())
    }

    /// Create and persist a new world with the starter creature
    pub fn create(&self, name: &str, difficulty: Difficulty) -> Result<WorldSave> {
        self.validate_new_name(name)?;

        let world = WorldSave::new(name.trim(), difficulty);
        self.save(&world)?;
        log::info!("Created world '{}' ({})", world.name, world.difficulty);
        Ok(world)
    }

    /// Write a world to its file (temp file + rename)
    pub fn save(&self, world: &WorldSave) -> Result<()> {
        let path = self.path_for(&world.name);
        self.write_atomic(world, &path)?;
        log::debug!("[SAVE] World '{}' -> {:?}", world.name, path);
        Ok(())
    }

    fn write_atomic(&self, world: &WorldSave, path: &Path) -> Result<()> {
        let json = world.to_json()?;
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, json).map_err(io_error(&temp_path))?;
        std::fs::rename(&temp_path, path).map_err(io_error(path))?;
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<WorldSave> {
        let path = self.path_for(name);
        if !path.is_file() {
            log::warn!("[LOAD] World '{}' not found at {:?}", name, path);
            return Err(StoreError::NotFound(name.to_string()));
        }

        let json = std::fs::read_to_string(&path).map_err(io_error(&path))?;
        let mut world = WorldSave::from_json(&json).map_err(|source| StoreError::Format {
            name: name.to_string(),
            source,
        })?;
        if world.needs_part_migration() {
            world.migrate_parts(&CreatureComposer::new(&self.catalog));
        }

        log::info!(
            "[LOAD] World '{}' ({}, {} deaths, {:.0}s played)",
            world.name,
            world.difficulty,
            world.death_count,
            world.play_time
        );
        Ok(world)
    }

    /// Rename a world. The old file is removed only after the new one is written.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<WorldSave> {
        let old_path = self.path_for(old_name);
        if !old_path.is_file() {
            log::warn!("Cannot rename '{}': world not found", old_name);
            return Err(StoreError::NotFound(old_name.to_string()));
        }

        let old_stem = sanitize_file_stem(old_name.trim());
        let others: Vec<String> = self
            .list()?
            .into_iter()
            .filter(|stem| stem.to_lowercase() != old_stem.to_lowercase())
            .collect();
        validate_world_name(new_name, others.iter().map(String::as_str))?;

        let mut world = self.load(old_name)?;
        world.name = new_name.trim().to_string();
        let new_path = self.path_for(&world.name);

        // The new file appears in one rename; the old one is only removed afterwards
        self.write_atomic(&world, &new_path)?;

        if new_path != old_path {
            // A case-only rename on a case-insensitive filesystem has just
            // replaced the old file; only remove it when both names are listed
            let distinct = !same_file_name(&old_path, &new_path)
                || (self.has_entry(&old_path)? && self.has_entry(&new_path)?);
            if distinct {
                std::fs::remove_file(&old_path).map_err(io_error(&old_path))?;
            }
        }

        log::info!("Renamed world '{}' to '{}'", old_name, world.name);
        Ok(world)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        if !path.is_file() {
            log::warn!("Cannot delete '{}': world not found", name);
            return Err(StoreError::NotFound(name.to_string()));
        }

        std::fs::remove_file(&path).map_err(io_error(&path))?;
        log::info!("Deleted world '{}'", name);
        Ok(())
    }

    /// Whether the directory lists exactly this file name (case-sensitive)
    fn has_entry(&self, path: &Path) -> Result<bool> {
        let Some(wanted) = path.file_name() else {
            return Ok(false);
        };
        let entries = std::fs::read_dir(&self.dir).map_err(io_error(&self.dir))?;
        for entry in entries {
            if entry.map_err(io_error(&self.dir))?.file_name().as_os_str() == wanted {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn same_file_name(a: &Path, b: &Path) -> bool {
    a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosphere_creature::{CreatureDefinition, Region};
    use tempfile::TempDir;

    fn store() -> (TempDir, WorldStore) {
        let dir = TempDir::new().unwrap();
        let store = WorldStore::open(dir.path().join("Worlds")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_create_writes_named_file() -> Result<()> {
        let (_dir, store) = store();
        let world = store.create("Reef", Difficulty::Medium)?;

        assert!(store.dir().join("Reef.json").is_file());
        assert_eq!(world.death_count, 0);
        assert_eq!(store.list()?, vec!["Reef".to_string()]);
        Ok(())
    }

    #[test]
    fn test_create_rejects_invalid_names_without_writing() {
        let (_dir, store) = store();

        for name in ["", "R", "ThisNameIsTooLong"] {
            assert!(matches!(
                store.create(name, Difficulty::Easy),
                Err(StoreError::InvalidName(_))
            ));
        }
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_create_rejects_duplicate() -> Result<()> {
        let (_dir, store) = store();
        store.create("Reef", Difficulty::Easy)?;

        match store.create("reef", Difficulty::Hard) {
            Err(StoreError::InvalidName(NameError::Duplicate(name))) => assert_eq!(name, "Reef"),
            other => panic!("expected duplicate error, got {:?}", other),
        }
        // Original untouched
        assert_eq!(store.load("Reef")?.difficulty, Difficulty::Easy);
        Ok(())
    }

    #[test]
    fn test_save_load_roundtrip() -> Result<()> {
        let (_dir, store) = store();
        let mut world = WorldSave::new("Kelp", Difficulty::Hard);
        world.death_count = 2;
        world.play_time = 99.25;
        world.selected_parts = CreatureDefinition::new();

        store.save(&world)?;
        assert_eq!(store.load("Kelp")?, world);
        assert!(!store.dir().join("Kelp.tmp").exists());
        Ok(())
    }

    #[test]
    fn test_load_missing_world() {
        let (_dir, store) = store();
        assert!(matches!(store.load("Nowhere"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_load_corrupt_world() {
        let (_dir, store) = store();
        std::fs::write(store.path_for("Broken"), "{ not json").unwrap();
        assert!(matches!(
            store.load("Broken"),
            Err(StoreError::Format { .. })
        ));
    }

    #[test]
    fn test_rename_moves_file_and_keeps_fields() -> Result<()> {
        let (_dir, store) = store();
        let mut world = store.create("Reef", Difficulty::Medium)?;
        world.play_time = 10.0;
        store.save(&world)?;

        let renamed = store.rename("Reef", "Atoll")?;
        assert!(!store.exists("Reef"));
        assert!(store.exists("Atoll"));

        let loaded = store.load("Atoll")?;
        assert_eq!(loaded, renamed);
        assert_eq!(loaded.name, "Atoll");
        assert_eq!(loaded.play_time, 10.0);
        assert_eq!(loaded.difficulty, Difficulty::Medium);
        assert_eq!(loaded.selected_parts.get(Region::Body), Some("Green_Body"));
        Ok(())
    }

    #[test]
    fn test_rename_missing_world_changes_nothing() -> Result<()> {
        let (_dir, store) = store();
        store.create("Reef", Difficulty::Medium)?;

        assert!(matches!(
            store.rename("Ghost", "Atoll"),
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.list()?, vec!["Reef".to_string()]);
        Ok(())
    }

    #[test]
    fn test_rename_to_existing_name_rejected() -> Result<()> {
        let (_dir, store) = store();
        store.create("Reef", Difficulty::Medium)?;
        store.create("Atoll", Difficulty::Hard)?;

        assert!(matches!(
            store.rename("Reef", "Atoll"),
            Err(StoreError::InvalidName(NameError::Duplicate(_)))
        ));
        assert_eq!(store.load("Atoll")?.difficulty, Difficulty::Hard);
        assert!(store.exists("Reef"));
        Ok(())
    }

    #[test]
    fn test_rename_case_only() -> Result<()> {
        let (_dir, store) = store();
        store.create("reef", Difficulty::Medium)?;

        store.rename("reef", "Reef")?;
        assert_eq!(store.list()?, vec!["Reef".to_string()]);
        assert_eq!(store.load("Reef")?.name, "Reef");
        Ok(())
    }

    #[test]
    fn test_failed_case_only_rename_leaves_world_intact() -> Result<()> {
        let (_dir, store) = store();
        store.create("reef", Difficulty::Medium)?;

        // Block the temp file so the write fails
        std::fs::create_dir(store.dir().join("Reef.tmp")).unwrap();
        assert!(matches!(
            store.rename("reef", "Reef"),
            Err(StoreError::Io { .. })
        ));

        assert_eq!(store.list()?, vec!["reef".to_string()]);
        assert_eq!(store.load("reef")?.name, "reef");
        Ok(())
    }

    #[test]
    fn test_load_migrates_first_release_save() -> Result<()> {
        let (_dir, store) = store();
        std::fs::write(
            store.path_for("Tide"),
            r#"{"WorldName":"Tide","WorldDifficulty":"Hard","TimesDied":3,"TimePlayed":40.5,"AvailableFeatures":[],"SelectedFeatures":["Red_Fins","Blue_Body","Green_Eyes"]}"#,
        )
        .unwrap();

        let world = store.load("Tide")?;
        assert_eq!(world.selected_parts.get(Region::Body), Some("Blue_Body"));
        assert_eq!(world.selected_parts.get(Region::Eyes), Some("Green_Eyes"));
        assert_eq!(world.selected_parts.get(Region::Fins), Some("Red_Fins"));

        // Saving writes the current format, which reloads unchanged
        store.save(&world)?;
        let raw = std::fs::read_to_string(store.path_for("Tide")).unwrap();
        assert!(!raw.contains("SelectedFeatures"));
        assert_eq!(store.load("Tide")?, world);
        Ok(())
    }

    #[test]
    fn test_migration_uses_configured_catalog() -> Result<()> {
        let (_dir, store) = store();
        let catalog = PartCatalog::from_json_str(
            r#"{"parts":[
                {"id":"Shell","region":"Body","stats":{"health":50,"speed":0,"strength":5},"visual":"Sprites/Creature/Shell"},
                {"id":"Stalk_Eyes","region":"Eyes","stats":{"health":1,"speed":1,"strength":1},"visual":"Sprites/Creature/Stalk_Eyes"},
                {"id":"Flippers","region":"Fins","stats":{"health":1,"speed":9,"strength":1},"visual":"Sprites/Creature/Flippers"}
            ]}"#,
        )?;
        let store = store.with_catalog(catalog);
        std::fs::write(
            store.path_for("Crab"),
            r#"{"WorldName":"Crab","WorldDifficulty":"Easy","SelectedFeatures":["Shell","Red_Eyes"]}"#,
        )
        .unwrap();

        let world = store.load("Crab")?;
        assert_eq!(world.selected_parts.len(), 1);
        assert_eq!(world.selected_parts.get(Region::Body), Some("Shell"));
        Ok(())
    }

    #[test]
    fn test_delete() -> Result<()> {
        let (_dir, store) = store();
        store.create("Reef", Difficulty::Medium)?;

        store.delete("Reef")?;
        assert!(store.list()?.is_empty());
        assert!(matches!(store.delete("Reef"), Err(StoreError::NotFound(_))));
        Ok(())
    }

    #[test]
    fn test_list_ignores_other_files() -> Result<()> {
        let (_dir, store) = store();
        store.create("Reef", Difficulty::Medium)?;
        store.create("Atoll", Difficulty::Medium)?;
        std::fs::write(store.dir().join("notes.txt"), "hello").unwrap();
        std::fs::write(store.dir().join("Kelp.tmp"), "partial").unwrap();

        assert_eq!(
            store.list()?,
            vec!["Atoll".to_string(), "Reef".to_string()]
        );
        Ok(())
    }
}
