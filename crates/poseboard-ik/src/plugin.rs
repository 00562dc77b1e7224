//! Bevy integration for character rigs.
//!
//! [`PoseboardIkPlugin`] registers a [`RigRegistry`] resource and two
//! systems: the rig update in [`PoseSet::Rig`] and sync-back in
//! [`PoseSet::Sync`], with input handling expected in [`PoseSet::Input`].
//!
//! # Usage
//!
//! 1. Add [`PoseboardIkPlugin`] to your app.
//! 2. Register each character with [`RigRegistry::build_and_insert`].
//! 3. Have input/VR systems write targets via [`RigRegistry::target_mut`]
//!    and per-tick flags via [`RigRegistry::set_input`] in
//!    [`PoseSet::Input`].

use std::collections::HashMap;

use bevy::log::debug;
use bevy::prelude::*;

use poseboard_core::config::RigConfig;
use poseboard_core::error::RigError;
use poseboard_core::types::{CharacterId, ControlTarget, TargetRole, TargetSet, TickInput};
use poseboard_core::PoseSet;
use poseboard_skeleton::Skeleton;

use crate::rig::CharacterRig;
use crate::sync;

/// Bevy plugin that runs rig updates and sync-back each frame, in the
/// mandatory solve → continuity → sync-back order.
pub struct PoseboardIkPlugin;

impl Plugin for PoseboardIkPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RigRegistry>()
            .configure_sets(
                Update,
                (PoseSet::Input, PoseSet::Rig, PoseSet::Sync).chain(),
            )
            .add_systems(
                Update,
                (
                    rig_update_system.in_set(PoseSet::Rig),
                    sync_back_system.in_set(PoseSet::Sync),
                ),
            );
    }
}

/// Per-character rig data owned by the registry.
#[derive(Debug)]
pub struct RigEntry {
    /// The application-owned skeleton, mutated only by sync-back.
    pub source: Skeleton,
    pub rig: CharacterRig,
    pub targets: TargetSet,
    pub input: TickInput,
}

/// Resource mapping [`CharacterId`] to rig data.
#[derive(Resource, Debug, Default)]
pub struct RigRegistry {
    entries: HashMap<CharacterId, RigEntry>,
}

impl RigRegistry {
    /// Insert a pre-built entry for a character.
    pub fn insert(&mut self, id: CharacterId, entry: RigEntry) {
        self.entries.insert(id, entry);
    }

    /// Build a [`CharacterRig`] for a character and register it.
    ///
    /// `rig_id` is the asset's rig identifier, used only for the
    /// authoring-patch lookup.
    pub fn build_and_insert(
        &mut self,
        id: CharacterId,
        source: Skeleton,
        mut targets: TargetSet,
        rig_id: &str,
        config: &RigConfig,
    ) -> Result<(), RigError> {
        let rig = CharacterRig::new(&source, &mut targets, rig_id, config)?;
        debug!(
            "poseboard: registered character {id:?} ({} bones, {} chains)",
            source.len(),
            rig.chains().len()
        );
        self.entries.insert(
            id,
            RigEntry {
                source,
                rig,
                targets,
                input: TickInput::default(),
            },
        );
        Ok(())
    }

    /// Replace a character's per-tick input flags.
    pub fn set_input(&mut self, id: CharacterId, input: TickInput) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.input = input;
        }
    }

    /// Mutable access to one control target, for input systems.
    pub fn target_mut(&mut self, id: CharacterId, role: TargetRole) -> Option<&mut ControlTarget> {
        self.entries
            .get_mut(&id)
            .map(|entry| entry.targets.get_mut(role))
    }

    #[must_use]
    pub fn get(&self, id: CharacterId) -> Option<&RigEntry> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut RigEntry> {
        self.entries.get_mut(&id)
    }

    /// Remove a character's rig when it leaves the scene.
    pub fn remove(&mut self, id: CharacterId) -> Option<RigEntry> {
        self.entries.remove(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// System that ticks every registered rig.
#[allow(clippy::needless_pass_by_value)]
pub fn rig_update_system(mut registry: ResMut<RigRegistry>) {
    for entry in registry.entries.values_mut() {
        let RigEntry {
            source,
            rig,
            targets,
            input,
        } = entry;
        rig.update(source, targets, *input);
    }
}

/// System that copies working-skeleton rotations back onto each source
/// skeleton for rendering and animation blending.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_back_system(mut registry: ResMut<RigRegistry>) {
    for entry in registry.entries.values_mut() {
        if !entry.input.enabled {
            continue;
        }
        let RigEntry { source, rig, .. } = entry;
        sync::apply_to_source(rig.working(), rig.baseline(), source);
    }
}
