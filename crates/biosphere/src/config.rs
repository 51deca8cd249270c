//! Game configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `biosphere.ron` file (if exists)
//! 3. Environment variables prefixed with `BIOSPHERE_`
//!
//! Example environment variable: `BIOSPHERE_GAMEPLAY__BASE_MOVE_SPEED=6.0`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use biosphere_core::notice::DEFAULT_NOTICE_SECONDS;
use biosphere_core::SessionConfig;
use biosphere_creature::InvalidSetting;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Main game configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GameConfig {
    #[serde(default)]
    pub world: WorldConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub gameplay: SessionConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub debug: DebugConfig,
}

/// Save location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Directory holding one JSON file per world
    pub save_dir: PathBuf,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("Worlds"),
        }
    }
}

/// Part definitions source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON definitions file; the built-in catalog is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Seconds before a notice is dismissed
    pub notice_seconds: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notice_seconds: DEFAULT_NOTICE_SECONDS,
        }
    }
}

/// Debug/development settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Enable verbose logging
    pub verbose_logging: bool,
}

impl GameConfig {
    /// Load configuration from `biosphere.ron` in the working directory
    /// plus `BIOSPHERE_` environment variables
    pub fn load() -> Result<Self> {
        let builder = Self::defaults()?
            // Layer 2: Config file (optional, won't error if missing)
            .add_source(
                File::with_name("biosphere")
                    .format(FileFormat::Ron)
                    .required(false),
            );
        Self::finish(builder)
    }

    /// Like [`GameConfig::load`] but reads an explicit file, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let builder = Self::defaults()?.add_source(File::from(path).format(FileFormat::Ron));
        Self::finish(builder)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    /// Layer 1: Compiled defaults
    fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>> {
        let gameplay = SessionConfig::default();
        let pursuit = &gameplay.pursuit;

        Ok(Config::builder()
            .set_default("world.save_dir", "Worlds")?
            .set_default("gameplay.base_move_speed", f64::from(gameplay.base_move_speed))?
            .set_default("gameplay.turn_speed_deg", f64::from(gameplay.turn_speed_deg))?
            .set_default(
                "gameplay.camera_follow_rate",
                f64::from(gameplay.camera_follow_rate),
            )?
            .set_default("gameplay.pursuit.follow_speed", f64::from(pursuit.follow_speed))?
            .set_default(
                "gameplay.pursuit.max_angular_speed_deg",
                f64::from(pursuit.max_angular_speed_deg),
            )?
            .set_default(
                "gameplay.pursuit.approach_ratio",
                f64::from(pursuit.approach_ratio),
            )?
            .set_default(
                "gameplay.pursuit.despawn_distance",
                f64::from(pursuit.despawn_distance),
            )?
            .set_default("gameplay.pursuit.spawn_radius", f64::from(pursuit.spawn_radius))?
            .set_default("ui.notice_seconds", f64::from(DEFAULT_NOTICE_SECONDS))?
            .set_default("debug.verbose_logging", false)?)
    }

    fn finish(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        // Layer 3: Environment variables (BIOSPHERE_WORLD__SAVE_DIR, etc.)
        let config = builder
            .add_source(Environment::with_prefix("BIOSPHERE").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Reject values the game cannot run with, naming the offending key
    pub fn validate(&self) -> Result<(), InvalidSetting> {
        self.gameplay
            .validate()
            .map_err(|err| err.with_prefix("gameplay"))?;
        InvalidSetting::check_non_negative("ui.notice_seconds", self.ui.notice_seconds)
    }
}
