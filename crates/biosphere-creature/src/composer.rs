//! Creature composition
//!
//! Selects parts per region, derives aggregate stats and assembles the
//! selected parts onto a base body.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{PartCatalog, PartDefinition};
use crate::morphology::{AssembledModel, AttachedPart, BaseBody};
use crate::types::{PartStats, Region};

/// Parts every new world starts with
pub const STARTER_PARTS: [(Region, &str); 3] = [
    (Region::Body, "Green_Body"),
    (Region::Eyes, "Red_Eyes"),
    (Region::Fins, "Blue_Fins"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("invalid part: {0}")]
    InvalidPart(String),
}

/// Selected part id per region
///
/// The map shape enforces at most one selection per region.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatureDefinition {
    selected_parts: BTreeMap<Region, String>,
}

impl CreatureDefinition {
    /// A creature with nothing selected
    pub fn new() -> Self {
        Self::default()
    }

    /// The default creature new worlds start with
    pub fn starter() -> Self {
        Self {
            selected_parts: STARTER_PARTS
                .iter()
                .map(|(region, id)| (*region, id.to_string()))
                .collect(),
        }
    }

    pub fn get(&self, region: Region) -> Option<&str> {
        self.selected_parts.get(&region).map(String::as_str)
    }

    /// Selected (region, part id) pairs in region order
    pub fn iter(&self) -> impl Iterator<Item = (Region, &str)> + '_ {
        self.selected_parts.iter().map(|(r, id)| (*r, id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.selected_parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_parts.is_empty()
    }

    /// True when every region has a selection
    pub fn is_complete(&self) -> bool {
        Region::ALL
            .iter()
            .all(|r| self.selected_parts.contains_key(r))
    }
}

/// Parts of a creature that resolved against the catalog, plus the ids that did not
#[derive(Debug)]
pub struct ResolvedParts<'a> {
    pub parts: Vec<&'a PartDefinition>,
    pub missing: Vec<String>,
}

/// Composition operations over a catalog
#[derive(Debug, Clone, Copy)]
pub struct CreatureComposer<'a> {
    catalog: &'a PartCatalog,
}

impl<'a> CreatureComposer<'a> {
    pub fn new(catalog: &'a PartCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a PartCatalog {
        self.catalog
    }

    /// Select `part_id` for its region, replacing any previous selection.
    ///
    /// Returns the id that was replaced, if any.
    pub fn select_part(
        &self,
        creature: &mut CreatureDefinition,
        part_id: &str,
    ) -> Result<Option<String>, ComposeError> {
        let part = self
            .catalog
            .find_by_id(part_id)
            .map_err(|_| ComposeError::InvalidPart(part_id.to_string()))?;

        let previous = creature
            .selected_parts
            .insert(part.region, part.id.clone());
        log::debug!(
            "Selected {} for {} (was {:?})",
            part.id,
            part.region,
            previous
        );
        Ok(previous)
    }

    /// Remove the selection for `region`, returning the removed id
    pub fn clear_region(&self, creature: &mut CreatureDefinition, region: Region) -> Option<String> {
        creature.selected_parts.remove(&region)
    }

    /// Resolve every selection against the catalog
    pub fn resolve(&self, creature: &CreatureDefinition) -> ResolvedParts<'a> {
        let mut parts = Vec::with_capacity(creature.len());
        let mut missing = Vec::new();

        for (region, id) in creature.iter() {
            match self.catalog.find_by_id(id) {
                Ok(part) if part.region == region => parts.push(part),
                Ok(part) => {
                    log::warn!(
                        "Part {} is tagged {} but selected for {}, skipping",
                        id,
                        part.region,
                        region
                    );
                    missing.push(id.to_string());
                }
                Err(_) => {
                    log::warn!("Part {} for {} not in catalog, skipping", id, region);
                    missing.push(id.to_string());
                }
            }
        }

        ResolvedParts { parts, missing }
    }

    /// Element-wise sum of the selected parts' stats.
    ///
    /// Unresolved parts contribute zero.
    pub fn aggregate_stats(&self, creature: &CreatureDefinition) -> PartStats {
        self.resolve(creature).parts.iter().map(|p| p.stats).sum()
    }

    /// Attach each selected part's visual to the base body's anchor for its region
    pub fn assemble(&self, creature: &CreatureDefinition, base: &BaseBody) -> AssembledModel {
        let resolved = self.resolve(creature);
        let mut model = AssembledModel::new();

        for part in resolved.parts {
            let (anchor, anchored) = match base.anchor_for(part.region) {
                Some(anchor) => (anchor.transform(), true),
                None => {
                    log::debug!(
                        "No anchor for {} on base body, attaching {} at root",
                        part.region,
                        part.id
                    );
                    (base.root, false)
                }
            };

            model.attach(AttachedPart {
                region: part.region,
                part_id: part.id.clone(),
                visual: part.visual.clone(),
                offset: anchor.position,
                rotation: anchor.rotation,
                anchored,
            });
        }

        model
    }

    /// One random part per region, used for enemy creatures
    pub fn random_creature<R: Rng + ?Sized>(&self, rng: &mut R) -> CreatureDefinition {
        let mut creature = CreatureDefinition::new();
        for region in Region::ALL {
            let part = self.catalog.random_part(region, rng);
            creature.selected_parts.insert(region, part.id.clone());
        }
        creature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::AnchorPoint;
    use crate::types::Transform2D;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn catalog() -> PartCatalog {
        PartCatalog::embedded().unwrap()
    }

    #[test]
    fn test_select_part_replaces_region() {
        let catalog = catalog();
        let composer = CreatureComposer::new(&catalog);
        let mut creature = CreatureDefinition::new();

        assert_eq!(composer.select_part(&mut creature, "Green_Body"), Ok(None));
        assert_eq!(
            composer.select_part(&mut creature, "Red_Body"),
            Ok(Some("Green_Body".to_string()))
        );
        assert_eq!(creature.len(), 1);
        assert_eq!(creature.get(Region::Body), Some("Red_Body"));
    }

    #[test]
    fn test_select_part_never_duplicates_regions() {
        let catalog = catalog();
        let composer = CreatureComposer::new(&catalog);
        let mut creature = CreatureDefinition::new();

        for part in catalog.iter() {
            composer.select_part(&mut creature, &part.id).unwrap();
            assert!(creature.len() <= Region::ALL.len());
            assert_eq!(creature.get(part.region), Some(part.id.as_str()));
        }
        assert!(creature.is_complete());
    }

    #[test]
    fn test_select_unknown_part_fails() {
        let catalog = catalog();
        let composer = CreatureComposer::new(&catalog);
        let mut creature = CreatureDefinition::starter();

        let result = composer.select_part(&mut creature, "Golden_Horn");
        assert_eq!(
            result,
            Err(ComposeError::InvalidPart("Golden_Horn".to_string()))
        );
        assert_eq!(creature, CreatureDefinition::starter());
    }

    #[test]
    fn test_aggregate_stats_sums_selected_parts() {
        let catalog = catalog();
        let composer = CreatureComposer::new(&catalog);
        let creature = CreatureDefinition::starter();

        let expected = ["Green_Body", "Red_Eyes", "Blue_Fins"]
            .iter()
            .map(|id| catalog.find_by_id(id).unwrap().stats)
            .sum::<PartStats>();
        assert_eq!(composer.aggregate_stats(&creature), expected);
        assert_eq!(expected, PartStats::new(35, 22, 15));
    }

    #[test]
    fn test_omitted_region_contributes_zero() {
        let catalog = catalog();
        let composer = CreatureComposer::new(&catalog);
        let mut creature = CreatureDefinition::starter();

        let full = composer.aggregate_stats(&creature);
        let fins = composer.clear_region(&mut creature, Region::Fins).unwrap();
        let fin_stats = catalog.find_by_id(&fins).unwrap().stats;

        let without = composer.aggregate_stats(&creature);
        assert_eq!(without + fin_stats, full);
        assert_eq!(
            composer.aggregate_stats(&CreatureDefinition::new()),
            PartStats::ZERO
        );
    }

    #[test]
    fn test_unknown_saved_part_is_skipped() {
        let catalog = catalog();
        let composer = CreatureComposer::new(&catalog);
        let creature: CreatureDefinition =
            serde_json::from_str(r#"{"Body":"Green_Body","Eyes":"Retired_Eyes"}"#).unwrap();

        let resolved = composer.resolve(&creature);
        assert_eq!(resolved.parts.len(), 1);
        assert_eq!(resolved.missing, vec!["Retired_Eyes".to_string()]);
        assert_eq!(
            composer.aggregate_stats(&creature),
            PartStats::new(30, 5, 10)
        );
    }

    #[test]
    fn test_part_saved_under_wrong_region_is_skipped() {
        let catalog = catalog();
        let composer = CreatureComposer::new(&catalog);
        let creature: CreatureDefinition =
            serde_json::from_str(r#"{"Fins":"Green_Body"}"#).unwrap();

        assert_eq!(composer.aggregate_stats(&creature), PartStats::ZERO);
    }

    #[test]
    fn test_assemble_uses_anchors_and_falls_back_to_root() {
        let catalog = catalog();
        let composer = CreatureComposer::new(&catalog);
        let base = BaseBody {
            root: Transform2D::default(),
            anchors: vec![AnchorPoint {
                name: "EyesAnchor".to_string(),
                region: Region::Eyes,
                offset: Vec2::new(0.0, 0.4),
                rotation: 0.0,
            }],
        };

        let model = composer.assemble(&CreatureDefinition::starter(), &base);
        assert_eq!(model.parts().len(), 3);

        let eyes = model.part(Region::Eyes).unwrap();
        assert!(eyes.anchored);
        assert_eq!(eyes.offset, Vec2::new(0.0, 0.4));
        assert_eq!(eyes.visual, "Sprites/Creature/Red_Eyes");

        let fins = model.part(Region::Fins).unwrap();
        assert!(!fins.anchored);
        assert_eq!(fins.offset, Vec2::ZERO);
    }

    #[test]
    fn test_random_creature_is_complete_and_valid() {
        let catalog = catalog();
        let composer = CreatureComposer::new(&catalog);
        let mut rng = Xoshiro256StarStar::seed_from_u64(99);

        let creature = composer.random_creature(&mut rng);
        assert!(creature.is_complete());
        assert!(composer.resolve(&creature).missing.is_empty());
    }

    #[test]
    fn test_definition_serializes_as_region_map() {
        let json = serde_json::to_string(&CreatureDefinition::starter()).unwrap();
        assert_eq!(
            json,
            r#"{"Body":"Green_Body","Eyes":"Red_Eyes","Fins":"Blue_Fins"}"#
        );
    }
}
