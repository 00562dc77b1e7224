//! Hips-to-torso pose continuity.
//!
//! Dragging the hips should carry the torso rigidly, so the rig caches
//! the spatial offset between the hips target and the head-chain target
//! and reapplies it every tick while the hips are being dragged. The
//! offset is only recomputed on explicit reset (enable transitions or a
//! reset request) — staleness between resets is intentional.

use nalgebra::Vector3;

use poseboard_core::types::{TargetRole, TargetSet, TickInput};

/// Cached offset between the hips target and the head-chain target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoseContinuity {
    offset: Vector3<f32>,
}

impl PoseContinuity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cached offset.
    #[must_use]
    pub const fn offset(&self) -> &Vector3<f32> {
        &self.offset
    }

    /// Capture the current local-space offset between the hips target and
    /// the head-chain target.
    ///
    /// Called on enable transitions and explicit reset requests, never
    /// every tick.
    pub fn recompute(&mut self, targets: &TargetSet) {
        self.offset =
            targets.get(TargetRole::Head).position - targets.get(TargetRole::Hips).position;
    }

    /// Reapply the cached offset so hips motion carries the torso.
    ///
    /// Runs every tick after solving. Writes the head target's local
    /// position as the hips' world position plus the cached offset,
    /// expressed in the head target's parent space — but only while the
    /// hips are being dragged and the torso is not itself being edited.
    /// When both flags are asserted in one tick the torso edit wins and
    /// the head target is left untouched.
    ///
    /// Returns whether the head target was rewritten.
    pub fn apply(&self, targets: &mut TargetSet, input: &TickInput) -> bool {
        if input.torso_editing || !input.hips_dragging {
            return false;
        }

        let hips_world = targets.get(TargetRole::Hips).world_position();
        let head = targets.get_mut(TargetRole::Head);
        head.position = head.world_to_local(hips_world) + self.offset;
        true
    }
}
