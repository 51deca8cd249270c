//! Creature editor: edits a draft copy of a world's creature

use biosphere_creature::{
    ComposeError, CreatureComposer, CreatureDefinition, PartCatalog, PartDefinition, PartStats,
    Region,
};

use crate::world::{StoreError, WorldSave, WorldStore};

/// Editing session for one world's creature.
///
/// Changes go to a draft; the world is only touched by [`CreatureEditor::save`].
#[derive(Debug, Clone)]
pub struct CreatureEditor {
    world: WorldSave,
    draft: CreatureDefinition,
}

impl CreatureEditor {
    pub fn enter(world: WorldSave) -> Self {
        log::debug!("Entering creature editor for '{}'", world.name);
        let draft = world.selected_parts.clone();
        Self { world, draft }
    }

    pub fn world(&self) -> &WorldSave {
        &self.world
    }

    pub fn draft(&self) -> &CreatureDefinition {
        &self.draft
    }

    /// True when the draft differs from the saved selection
    pub fn is_dirty(&self) -> bool {
        self.draft != self.world.selected_parts
    }

    pub fn select(
        &mut self,
        composer: &CreatureComposer<'_>,
        part_id: &str,
    ) -> Result<Option<String>, ComposeError> {
        composer.select_part(&mut self.draft, part_id)
    }

    pub fn clear(&mut self, composer: &CreatureComposer<'_>, region: Region) -> Option<String> {
        composer.clear_region(&mut self.draft, region)
    }

    /// Live stats of the draft
    pub fn stats(&self, composer: &CreatureComposer<'_>) -> PartStats {
        composer.aggregate_stats(&self.draft)
    }

    /// Parts offered for `region`, with the currently selected one flagged
    pub fn available<'c>(
        &self,
        catalog: &'c PartCatalog,
        region: Region,
    ) -> Vec<(&'c PartDefinition, bool)> {
        let selected = self.draft.get(region);
        catalog
            .list_by_region(region)
            .map(|part| (part, selected == Some(part.id.as_str())))
            .collect()
    }

    /// Replace the world's selection with the draft and persist it
    pub fn save(mut self, store: &WorldStore) -> Result<WorldSave, StoreError> {
        self.world.selected_parts = self.draft;
        store.save(&self.world)?;
        log::info!(
            "Saved creature for '{}' ({} parts)",
            self.world.name,
            self.world.selected_parts.len()
        );
        Ok(self.world)
    }

    /// Drop the draft, returning the world unchanged
    pub fn discard(self) -> WorldSave {
        if self.is_dirty() {
            log::debug!("Discarded creature edits for '{}'", self.world.name);
        }
        self.world
    }
}
