//! Sync-back baseline between the source and working skeletons.
//!
//! The working skeleton diverges from the animation-owned source as soon
//! as solving starts. To write IK results back without corrupting the
//! animation pose, the rig captures — once per enable transition, not per
//! tick — the relative rotation between the two skeletons for every bone.
//! Sync-back then composes each working rotation with its baseline to
//! produce the source rotation for rendering.

use nalgebra::UnitQuaternion;

use poseboard_skeleton::{BoneId, Skeleton};

/// Per-bone relative rotations between working and source skeletons.
///
/// `captured` is per rig instance; independent characters never share
/// baseline state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoseBaseline {
    relative: Vec<UnitQuaternion<f32>>,
    captured: bool,
}

impl PoseBaseline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn captured(&self) -> bool {
        self.captured
    }

    /// Relative rotation for one bone, identity before first capture.
    #[must_use]
    pub fn relative(&self, bone: BoneId) -> UnitQuaternion<f32> {
        self.relative
            .get(bone.index())
            .copied()
            .unwrap_or_else(UnitQuaternion::identity)
    }

    /// Capture the relative rotation of every bone at this instant.
    ///
    /// The two skeletons share topology and ids by construction (the
    /// working skeleton is a structural copy of the source).
    pub fn capture(&mut self, source: &Skeleton, working: &Skeleton) {
        debug_assert!(source.same_topology(working));
        self.relative = vec![UnitQuaternion::identity(); source.len()];
        for id in source.preorder() {
            let source_rotation = source.bone(id).local().rotation;
            let working_rotation = working.bone(id).local().rotation;
            // Stored so that working * relative == source at capture time.
            self.relative[id.index()] = working_rotation.inverse() * source_rotation;
        }
        self.captured = true;
    }
}

/// Write working-skeleton rotations onto the source skeleton.
///
/// Runs after the rig update, on the same thread, completing the
/// mandatory solve → continuity → sync-back tick order. Each source
/// bone's local rotation becomes the working rotation composed with the
/// baseline, so a freshly captured baseline leaves the source unchanged.
/// World recomposition honors per-bone auto-propagation flags: a source
/// bone the host manages by hand keeps its cached world transform.
pub fn apply_to_source(working: &Skeleton, baseline: &PoseBaseline, source: &mut Skeleton) {
    debug_assert!(source.same_topology(working));
    if !baseline.captured() {
        return;
    }
    for id in working.preorder() {
        let rotation = working.bone(id).local().rotation * baseline.relative(id);
        source.set_local_rotation(id, rotation);
    }
    source.propagate();
}
