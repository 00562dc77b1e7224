//! The character rig: setup and the per-tick update.

use nalgebra::UnitQuaternion;

use poseboard_core::config::RigConfig;
use poseboard_core::error::RigError;
use poseboard_core::types::{forward_axis_vector, TargetRole, TargetSet, TickInput};
use poseboard_skeleton::{align_forward, BoneId, Skeleton};

use crate::chain::{build_chains, LimbChain};
use crate::continuity::PoseContinuity;
use crate::solver::{CcdSolver, SolveReport};
use crate::state::{ModeMachine, RigMode};
use crate::sync::PoseBaseline;

/// Known authoring defects, keyed by rig identifier: the named bone's
/// local rotation is reset to identity right after cloning. A finite
/// lookup for specific broken assets, not a general rule.
const AUTHORING_PATCHES: [(&str, &str); 1] = [("female-adult-meso", "Spine")];

fn authoring_patch(rig_id: &str) -> Option<&'static str> {
    AUTHORING_PATCHES
        .iter()
        .find(|(id, _)| *id == rig_id)
        .map(|(_, bone)| *bone)
}

/// One character's IK instance.
///
/// Owns a working copy of the character's skeleton and its five limb
/// chains. The source skeleton stays external and read-only here; results
/// reach it through [`sync::apply_to_source`](crate::sync::apply_to_source)
/// after each tick.
#[derive(Debug)]
pub struct CharacterRig {
    working: Skeleton,
    hips: BoneId,
    chains: Vec<LimbChain>,
    solver: CcdSolver,
    mode: ModeMachine,
    continuity: PoseContinuity,
    baseline: PoseBaseline,
    last_report: Option<SolveReport>,
}

impl CharacterRig {
    /// Set up a rig for one character.
    ///
    /// Clones the source skeleton, reorients the hips basis to the
    /// solver's forward convention, applies any per-rig authoring patch,
    /// builds the five limb chains (renaming effector targets to their
    /// end bones), and captures the initial continuity offset and sync
    /// baseline.
    ///
    /// # Errors
    ///
    /// Fatal when the skeleton has no `Hips` bone, when any chain bone
    /// is absent, when a chain never closes, or when two chains claim
    /// the same bone.
    pub fn new(
        source: &Skeleton,
        targets: &mut TargetSet,
        rig_id: &str,
        config: &RigConfig,
    ) -> Result<Self, RigError> {
        let mut working = source.working_copy();
        let hips = working
            .bone_id("Hips")
            .ok_or_else(|| RigError::MissingBone("Hips".into()))?;

        align_forward(&mut working, hips, forward_axis_vector(config.forward_axis));

        if let Some(bone_name) = authoring_patch(rig_id) {
            if let Some(id) = working.bone_id(bone_name) {
                working.set_local_rotation(id, UnitQuaternion::identity());
                working.refresh_subtree(id);
            }
        }

        targets.get_mut(TargetRole::Hips).name = "Hips".into();
        let chains = build_chains(&mut working, targets)?;

        let mut continuity = PoseContinuity::new();
        continuity.recompute(targets);
        let mut baseline = PoseBaseline::new();
        baseline.capture(source, &working);

        Ok(Self {
            working,
            hips,
            chains,
            solver: CcdSolver::new(config.solver),
            mode: ModeMachine::new(),
            continuity,
            baseline,
            last_report: None,
        })
    }

    /// Run one tick: mode transition, hips direct drive, at most one
    /// chain solve (whose effector also takes the target's orientation),
    /// then pose continuity; enable transitions additionally reset the
    /// continuity offset and recapture the sync baseline.
    ///
    /// `source` is only read for baseline capture; `targets` may have the
    /// head target's local position rewritten by continuity.
    pub fn update(&mut self, source: &Skeleton, targets: &mut TargetSet, input: TickInput) {
        let change = self.mode.advance(&input, targets.active_role());
        if change.entered_enabled {
            // Reset pose state at the transition instant, before this
            // tick's solve: the offset reflects the targets as enabled,
            // and the baseline pairs the skeletons as they stand so the
            // solve shows through sync-back.
            self.continuity.recompute(targets);
            self.baseline.capture(source, &self.working);
        }

        match self.mode.mode() {
            // Working skeleton is inert while disabled.
            RigMode::Disabled => return,
            // Caller writes rotations directly; the solver must not run.
            RigMode::RotationOverride => {}
            RigMode::Idle | RigMode::Solving(_) => {
                self.drive_hips(targets);
                if let RigMode::Solving(role) = self.mode.mode() {
                    let goal = targets.get(role).world_position();
                    let orientation = targets.get(role).world_rotation();
                    if let Some(chain) = self.chains.iter().find(|c| c.role() == role) {
                        let effector = chain.effector();
                        self.last_report =
                            Some(self.solver.solve(&mut self.working, chain, goal));
                        self.orient_effector(effector, orientation);
                    }
                }
                // Idle: no solve; chains retain their last rotations.
            }
        }

        self.continuity.apply(targets, &input);
    }

    /// Hips are direct-driven from target 0, never solved: copy the hips
    /// target's world position into the working hips bone.
    fn drive_hips(&mut self, targets: &TargetSet) {
        let target_world = targets.get(TargetRole::Hips).world_position();
        let local = match self.working.bone(self.hips).parent() {
            Some(parent) => self
                .working
                .world(parent)
                .inverse_transform_point(&target_world),
            None => target_world,
        };
        self.working.set_local_translation(self.hips, local.coords);
        self.working.refresh_subtree(self.hips);
    }

    /// The solve positions the effector; its orientation is copied
    /// straight from the target (a hand follows the controller's grip,
    /// the head follows the headset).
    fn orient_effector(&mut self, effector: BoneId, orientation: UnitQuaternion<f32>) {
        let parent_rotation = self
            .working
            .bone(effector)
            .parent()
            .map_or_else(UnitQuaternion::identity, |p| self.working.world(p).rotation);
        self.working
            .set_local_rotation(effector, parent_rotation.inverse() * orientation);
        self.working.refresh_subtree(effector);
    }

    /// Write one working-skeleton bone rotation directly.
    ///
    /// Used while in rotation-override mode; the next enabled tick will
    /// solve from the overridden pose rather than resetting it.
    pub fn override_rotation(
        &mut self,
        bone: &str,
        rotation: UnitQuaternion<f32>,
    ) -> Result<(), RigError> {
        let id = self
            .working
            .bone_id(bone)
            .ok_or_else(|| RigError::MissingBone(bone.into()))?;
        self.working.set_local_rotation(id, rotation);
        self.working.refresh_subtree(id);
        Ok(())
    }

    /// Explicit continuity reset, e.g. after a target teleport.
    pub fn reset_continuity(&mut self, targets: &TargetSet) {
        self.continuity.recompute(targets);
    }

    #[must_use]
    pub const fn working(&self) -> &Skeleton {
        &self.working
    }

    #[must_use]
    pub const fn mode(&self) -> RigMode {
        self.mode.mode()
    }

    #[must_use]
    pub fn chains(&self) -> &[LimbChain] {
        &self.chains
    }

    #[must_use]
    pub const fn baseline(&self) -> &PoseBaseline {
        &self.baseline
    }

    #[must_use]
    pub const fn continuity(&self) -> &PoseContinuity {
        &self.continuity
    }

    /// Report from the most recent solve, if any chain has been solved.
    #[must_use]
    pub const fn last_report(&self) -> Option<SolveReport> {
        self.last_report
    }
}
