//! World save model and its JSON format

use biosphere_creature::{CreatureComposer, CreatureDefinition};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Save format written by this build
pub const SAVE_FORMAT_VERSION: u32 = 1;

/// Errors decoding a save document
#[derive(Debug, Error)]
pub enum SaveFormatError {
    #[error("malformed save: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save format version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// World difficulty, chosen at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Multiplier applied to the enemy's follow speed
    pub fn enemy_speed_factor(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.90,
            Difficulty::Medium => 0.95,
            Difficulty::Hard => 1.0,
        }
    }

    /// Map the creation screen's 3-step slider (0, 1, 2) to a difficulty
    pub fn from_slider(value: u8) -> Self {
        match value {
            0 => Difficulty::Easy,
            1 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!(
                "Unknown difficulty: {}. Valid: easy, medium, hard",
                s
            )),
        }
    }
}

/// A named, persisted game world
///
/// Missing optional fields fall back to the defaults below; `name` and
/// `difficulty` are required. Field aliases accept saves written by the
/// first release, which had no `version` field and stored the creature as a
/// flat `SelectedFeatures` id list. That list is kept until
/// [`WorldSave::migrate_parts`] sorts it into regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSave {
    /// 0 marks a legacy save without a version field
    #[serde(default)]
    pub version: u32,

    #[serde(alias = "WorldName")]
    pub name: String,

    #[serde(alias = "WorldDifficulty")]
    pub difficulty: Difficulty,

    #[serde(default = "CreatureDefinition::starter")]
    pub selected_parts: CreatureDefinition,

    #[serde(default, alias = "TimesDied")]
    pub death_count: u32,

    /// Seconds spent in gameplay
    #[serde(default, alias = "TimePlayed")]
    pub play_time: f64,

    /// First-release part list, pending migration
    #[serde(default, rename = "SelectedFeatures", skip_serializing)]
    legacy_parts: Option<Vec<String>>,
}

impl WorldSave {
    /// Fresh world with the starter creature
    pub fn new(name: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            version: SAVE_FORMAT_VERSION,
            name: name.into(),
            difficulty,
            selected_parts: CreatureDefinition::starter(),
            death_count: 0,
            play_time: 0.0,
            legacy_parts: None,
        }
    }

    /// Decode a save, upgrading legacy documents and rejecting newer formats
    pub fn from_json(json: &str) -> Result<Self, SaveFormatError> {
        let mut save: WorldSave = serde_json::from_str(json)?;

        if save.version > SAVE_FORMAT_VERSION {
            return Err(SaveFormatError::UnsupportedVersion {
                found: save.version,
                supported: SAVE_FORMAT_VERSION,
            });
        }

        if save.version > 0 && save.legacy_parts.take().is_some() {
            log::warn!(
                "Save '{}' is format {} but carries a first-release part list, ignoring it",
                save.name,
                save.version
            );
        }

        if save.version < SAVE_FORMAT_VERSION {
            log::info!(
                "Upgrading save '{}' from format {} to {}",
                save.name,
                save.version,
                SAVE_FORMAT_VERSION
            );
            save.version = SAVE_FORMAT_VERSION;
        }

        Ok(save)
    }

    /// True while a first-release part list still has to be migrated
    pub fn needs_part_migration(&self) -> bool {
        self.legacy_parts.is_some()
    }

    /// Rebuild the creature from a first-release part list.
    ///
    /// Regions come from the catalog. Ids the catalog does not know are
    /// skipped with a warning and returned. No-op for current saves.
    pub fn migrate_parts(&mut self, composer: &CreatureComposer<'_>) -> Vec<String> {
        let Some(ids) = self.legacy_parts.take() else {
            return Vec::new();
        };

        let mut creature = CreatureDefinition::new();
        let mut dropped = Vec::new();
        for id in ids {
            if let Err(err) = composer.select_part(&mut creature, &id) {
                log::warn!(
                    "Save '{}': dropping first-release part {} ({})",
                    self.name,
                    id,
                    err
                );
                dropped.push(id);
            }
        }

        log::info!(
            "Save '{}': migrated first-release creature with {} parts",
            self.name,
            creature.len()
        );
        self.selected_parts = creature;
        dropped
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn add_play_time(&mut self, seconds: f64) {
        self.play_time += seconds.max(0.0);
    }
}
