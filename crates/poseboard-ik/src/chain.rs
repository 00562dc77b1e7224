//! Limb chains over the working skeleton.
//!
//! A [`LimbChain`] is the ordered bone path from a start bone to an end
//! bone, each wrapped in a [`Joint`], bound to one control-target role.
//! The five chain definitions are fixed for humanoid rigs; construction
//! fails fatally when a named bone is absent or a chain cannot close.

use poseboard_core::error::RigError;
use poseboard_core::types::{TargetRole, TargetSet};
use poseboard_skeleton::{BoneId, Skeleton};

/// Optional rotational constraint on a joint.
///
/// Limits how far a single solver step may rotate the joint, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationLimit {
    pub max_step: f32,
}

/// One bone of a chain plus its optional constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub bone: BoneId,
    pub limit: Option<RotationLimit>,
}

/// Fixed mapping of a chain's bone range to its control-target role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSpec {
    pub role: TargetRole,
    pub start: &'static str,
    pub end: &'static str,
}

/// The five humanoid limb chains, in target-priority order.
pub const CHAIN_SPECS: [ChainSpec; 5] = [
    ChainSpec {
        role: TargetRole::Head,
        start: "Spine",
        end: "Head",
    },
    ChainSpec {
        role: TargetRole::LeftHand,
        start: "LeftArm",
        end: "LeftHand",
    },
    ChainSpec {
        role: TargetRole::RightHand,
        start: "RightArm",
        end: "RightHand",
    },
    ChainSpec {
        role: TargetRole::LeftFoot,
        start: "LeftUpLeg",
        end: "LeftFoot",
    },
    ChainSpec {
        role: TargetRole::RightFoot,
        start: "RightUpLeg",
        end: "RightFoot",
    },
];

/// An ordered joint sequence from a chain's start bone to its end bone.
///
/// Joints are in ancestor-to-descendant order; the last joint is the
/// effector the solver drives toward the bound control target.
#[derive(Debug, Clone, PartialEq)]
pub struct LimbChain {
    role: TargetRole,
    joints: Vec<Joint>,
}

impl LimbChain {
    /// Build one chain by walking parent links from the end bone up to
    /// the start bone in the working skeleton.
    pub fn build(skeleton: &Skeleton, spec: &ChainSpec) -> Result<Self, RigError> {
        let start = skeleton
            .bone_id(spec.start)
            .ok_or_else(|| RigError::MissingBone(spec.start.into()))?;
        let end = skeleton
            .bone_id(spec.end)
            .ok_or_else(|| RigError::MissingBone(spec.end.into()))?;

        let mut path = vec![end];
        let mut cursor = end;
        while cursor != start {
            let Some(parent) = skeleton.bone(cursor).parent() else {
                return Err(RigError::ChainNotClosed {
                    role: spec.role.name(),
                    start: spec.start,
                    end: spec.end,
                });
            };
            cursor = parent;
            path.push(cursor);
        }
        path.reverse();

        Ok(Self {
            role: spec.role,
            joints: path
                .into_iter()
                .map(|bone| Joint { bone, limit: None })
                .collect(),
        })
    }

    #[must_use]
    pub const fn role(&self) -> TargetRole {
        self.role
    }

    #[must_use]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Number of joints, inclusive of both endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// The effector bone (the chain's end).
    #[must_use]
    pub fn effector(&self) -> BoneId {
        self.joints[self.joints.len() - 1].bone
    }

    /// Set or clear the rotational constraint on one joint.
    pub fn set_joint_limit(&mut self, index: usize, limit: Option<RotationLimit>) {
        self.joints[index].limit = limit;
    }
}

/// Build all five limb chains over the working skeleton.
///
/// Walks the skeleton in depth-first pre-order disabling automatic
/// transform propagation on every bone (the rig owns matrix updates from
/// here on), builds each chain, verifies no bone belongs to two chains,
/// and renames each effector target to its end bone's name.
pub fn build_chains(
    skeleton: &mut Skeleton,
    targets: &mut TargetSet,
) -> Result<Vec<LimbChain>, RigError> {
    for id in skeleton.preorder() {
        skeleton.set_auto_propagate(id, false);
    }

    let mut chains = Vec::with_capacity(CHAIN_SPECS.len());
    let mut claimed: Vec<BoneId> = Vec::new();

    for spec in &CHAIN_SPECS {
        let chain = LimbChain::build(skeleton, spec)?;
        for joint in chain.joints() {
            if claimed.contains(&joint.bone) {
                return Err(RigError::OverlappingChains {
                    bone: skeleton.bone(joint.bone).name().into(),
                });
            }
            claimed.push(joint.bone);
        }
        targets.get_mut(spec.role).name = spec.end.into();
        chains.push(chain);
    }

    Ok(chains)
}
