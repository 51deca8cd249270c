//! Part catalog
//!
//! The static list of creature parts a player can pick from. Loaded once at
//! startup from a JSON definitions resource and read-only afterwards.

use std::collections::HashMap;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{PartStats, Region};

/// Definitions compiled into the crate, used when no catalog path is configured
const EMBEDDED_PARTS: &str = include_str!("../assets/parts.json");

/// Errors raised while loading or querying the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("part not found: {0}")]
    NotFound(String),

    #[error("failed to read part definitions {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse part definitions: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate part id: {0}")]
    DuplicateId(String),

    #[error("part catalog has no parts for region {0}")]
    EmptyRegion(Region),
}

/// A single interchangeable creature part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDefinition {
    pub id: String,
    pub region: Region,
    pub stats: PartStats,
    /// Opaque handle the renderer resolves to a sprite
    pub visual: String,
}

/// On-disk layout of the definitions resource
#[derive(Debug, Serialize, Deserialize)]
struct PartDefinitionsFile {
    parts: Vec<PartDefinition>,
}

/// Ordered, id-indexed collection of part definitions
#[derive(Debug, Clone)]
pub struct PartCatalog {
    parts: Vec<PartDefinition>,
    index: HashMap<String, usize>,
}

impl PartCatalog {
    /// Build a catalog from definitions, keeping their order
    pub fn new(parts: Vec<PartDefinition>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            if index.insert(part.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(part.id.clone()));
            }
        }

        for region in Region::ALL {
            if !parts.iter().any(|p| p.region == region) {
                return Err(CatalogError::EmptyRegion(region));
            }
        }

        Ok(Self { parts, index })
    }

    /// Parse a catalog from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: PartDefinitionsFile = serde_json::from_str(json)?;
        Self::new(file.parts)
    }

    /// Load a catalog from a JSON file on disk
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        log::info!(
            "Loaded {} part definitions from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// The catalog shipped with the game
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json_str(EMBEDDED_PARTS)
    }

    /// Look up a part by id
    pub fn find_by_id(&self, id: &str) -> Result<&PartDefinition, CatalogError> {
        self.index
            .get(id)
            .map(|&i| &self.parts[i])
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Parts attachable to `region`, in catalog order
    pub fn list_by_region(&self, region: Region) -> impl Iterator<Item = &PartDefinition> + '_ {
        self.parts.iter().filter(move |p| p.region == region)
    }

    /// Pick a uniformly random part for `region`
    pub fn random_part<R: Rng + ?Sized>(&self, region: Region, rng: &mut R) -> &PartDefinition {
        let candidates: Vec<&PartDefinition> = self.list_by_region(region).collect();
        // Construction guarantees every region has at least one part
        candidates
            .choose(rng)
            .copied()
            .unwrap_or_else(|| &self.parts[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartDefinition> + '_ {
        self.parts.iter()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
