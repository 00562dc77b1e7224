//! Forward-axis adaptation.
//!
//! Character assets and IK solvers disagree on which local axis "faces
//! forward" (rigs commonly author -Z forward while the solver works with
//! +Z). The fix is a one-time reorientation of a single bone's local
//! basis — in practice the hips — at setup; every descendant inherits the
//! correction through normal transform composition.

use nalgebra::{UnitQuaternion, UnitVector3, Vector3};

use crate::bone::BoneId;
use crate::skeleton::Skeleton;

/// Rotate `bone`'s local basis so its effective forward direction (local
/// rotation applied to +Z) equals `forward`.
///
/// Must be called exactly once per skeleton, immediately after cloning;
/// calling it again after the solver has run would fold the correction
/// into an already-corrected pose.
pub fn align_forward(skeleton: &mut Skeleton, bone: BoneId, forward: Vector3<f32>) {
    let desired = UnitVector3::new_normalize(forward);
    let rotation = skeleton.bone(bone).local().rotation;
    let current = rotation * Vector3::z_axis();

    let delta = UnitQuaternion::rotation_between_axis(&current, &desired)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&flip_axis(&desired), std::f32::consts::PI));

    skeleton.set_local_rotation(bone, delta * rotation);
    skeleton.refresh_subtree(bone);
}

/// Any axis perpendicular to `forward`, for the antiparallel case where
/// the 180-degree flip axis is underdetermined. Prefers one derived from
/// the rig's up axis so the flip stays in the ground plane.
fn flip_axis(forward: &UnitVector3<f32>) -> UnitVector3<f32> {
    let forward = forward.into_inner();
    let up = Vector3::y();
    if forward.dot(&up).abs() < 0.99 {
        UnitVector3::new_normalize(forward.cross(&up))
    } else {
        Vector3::x_axis()
    }
}
