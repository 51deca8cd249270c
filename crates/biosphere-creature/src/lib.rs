//! Creature parts for BioSphere
//!
//! This crate implements:
//! - The part catalog (bodies, eyes and fins with their stats)
//! - Creature composition, stat aggregation and assembly onto anchor points
//! - Per-tick movement rules: player locomotion and enemy pursuit

pub mod catalog;
pub mod composer;
pub mod locomotion;
pub mod morphology;
pub mod pursuit;
pub mod types;

// Re-export main types for convenience
pub use catalog::{CatalogError, PartCatalog, PartDefinition};
pub use composer::{ComposeError, CreatureComposer, CreatureDefinition};
pub use locomotion::{CameraRig, Locomotion, MovementInput};
pub use morphology::{AnchorPoint, AssembledModel, AttachedPart, BaseBody};
pub use pursuit::{InvalidSetting, PursuitBehavior, PursuitConfig, PursuitOutcome};
pub use types::{EntityId, PartStats, Region, Transform2D};
