//! Cyclic Coordinate Descent solver for limb chains.
//!
//! Each iteration sweeps the chain tip-to-root, rotating every joint so
//! the effector swings toward the target, then checks convergence.
//! Convergence is approximate: stopping at the iteration cap is normal
//! and self-corrects on later ticks as long as targets move continuously.

use nalgebra::{Point3, UnitQuaternion};

use poseboard_core::config::SolverSettings;
use poseboard_skeleton::Skeleton;

use crate::chain::LimbChain;

/// Result of one chain solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    /// Whether the effector came within tolerance of the target.
    pub converged: bool,
    /// Iterations used.
    pub iterations: u32,
    /// Final effector-to-target distance.
    pub position_error: f32,
}

/// Bounded-iteration CCD solver.
#[derive(Debug, Clone)]
pub struct CcdSolver {
    settings: SolverSettings,
}

impl CcdSolver {
    #[must_use]
    pub const fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(SolverSettings::default())
    }

    #[must_use]
    pub const fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Solve one chain toward a world-space target position.
    ///
    /// Mutates joint rotations in the working skeleton. A report with
    /// `converged: false` is an expected outcome, not an error: the pose
    /// is left at bounded error for the next tick to refine.
    pub fn solve(
        &self,
        skeleton: &mut Skeleton,
        chain: &LimbChain,
        target: Point3<f32>,
    ) -> SolveReport {
        // The rig owns matrix updates for the working skeleton, so start
        // each solve from freshly composed world transforms.
        skeleton.refresh_all();

        let effector = chain.effector();
        let joints = chain.joints();
        if joints.len() < 2 {
            let position_error = (skeleton.world_position(effector) - target).norm();
            return SolveReport {
                converged: position_error < self.settings.tolerance,
                iterations: 0,
                position_error,
            };
        }

        for iteration in 0..self.settings.max_iterations {
            let position_error = (skeleton.world_position(effector) - target).norm();
            if position_error < self.settings.tolerance {
                return SolveReport {
                    converged: true,
                    iterations: iteration,
                    position_error,
                };
            }

            // Tip-to-root pass. The effector joint itself is skipped:
            // rotating about the effector cannot move the effector.
            for joint in joints[..joints.len() - 1].iter().rev() {
                let pivot = skeleton.world_position(joint.bone);
                let to_effector = skeleton.world_position(effector) - pivot;
                let to_target = target - pivot;
                if to_effector.norm() < f32::EPSILON || to_target.norm() < f32::EPSILON {
                    continue;
                }

                let Some(mut delta) = UnitQuaternion::rotation_between(&to_effector, &to_target)
                else {
                    // Antiparallel; let the remaining joints shoulder it.
                    continue;
                };

                if let Some(limit) = joint.limit {
                    if delta.angle() > limit.max_step {
                        if let Some(axis) = delta.axis() {
                            delta = UnitQuaternion::from_axis_angle(&axis, limit.max_step);
                        }
                    }
                }

                // World-frame delta expressed back into the joint's local
                // rotation: world = parent_world * local.
                let parent_rotation = skeleton
                    .bone(joint.bone)
                    .parent()
                    .map_or_else(UnitQuaternion::identity, |p| skeleton.world(p).rotation);
                let world_rotation = skeleton.world(joint.bone).rotation;
                let local = parent_rotation.inverse() * delta * world_rotation;

                skeleton.set_local_rotation(joint.bone, local);
                skeleton.refresh_subtree(joint.bone);
            }
        }

        let position_error = (skeleton.world_position(effector) - target).norm();
        SolveReport {
            converged: position_error < self.settings.tolerance,
            iterations: self.settings.max_iterations,
            position_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainSpec, LimbChain, RotationLimit};
    use approx::assert_relative_eq;
    use nalgebra::Isometry3;
    use poseboard_core::types::TargetRole;

    /// Hips -> Spine -> Head column with half-unit segments.
    fn column() -> (Skeleton, LimbChain) {
        let mut sk = Skeleton::new();
        let hips = sk.add_root("Hips", Isometry3::identity()).unwrap();
        let spine = sk
            .add_bone("Spine", hips, Isometry3::translation(0.0, 0.5, 0.0))
            .unwrap();
        sk.add_bone("Head", spine, Isometry3::translation(0.0, 0.5, 0.0))
            .unwrap();
        let chain = LimbChain::build(
            &sk,
            &ChainSpec {
                role: TargetRole::Head,
                start: "Spine",
                end: "Head",
            },
        )
        .unwrap();
        (sk, chain)
    }

    /// Three-segment arm along +X under a fixed shoulder.
    fn arm() -> (Skeleton, LimbChain) {
        let mut sk = Skeleton::new();
        let root = sk.add_root("Shoulder", Isometry3::identity()).unwrap();
        let upper = sk
            .add_bone("LeftArm", root, Isometry3::translation(0.1, 0.0, 0.0))
            .unwrap();
        let fore = sk
            .add_bone("LeftForeArm", upper, Isometry3::translation(0.3, 0.0, 0.0))
            .unwrap();
        sk.add_bone("LeftHand", fore, Isometry3::translation(0.3, 0.0, 0.0))
            .unwrap();
        let chain = LimbChain::build(
            &sk,
            &ChainSpec {
                role: TargetRole::LeftHand,
                start: "LeftArm",
                end: "LeftHand",
            },
        )
        .unwrap();
        (sk, chain)
    }

    #[test]
    fn two_joint_chain_converges_to_target_above_hips() {
        let (mut sk, chain) = column();
        // Head target one unit above the hips: exactly the rest pose.
        let report = CcdSolver::with_defaults().solve(&mut sk, &chain, Point3::new(0.0, 1.0, 0.0));
        assert!(report.converged);
        assert!(report.position_error < 1e-3);
    }

    #[test]
    fn two_joint_chain_reaches_displaced_target() {
        let (mut sk, chain) = column();
        // On the reachable sphere around the spine (radius 0.5).
        let target = Point3::new(0.3, 0.9, 0.0);
        let report = CcdSolver::with_defaults().solve(&mut sk, &chain, target);
        assert!(report.converged, "pos_err={}", report.position_error);

        let head = sk.bone_id("Head").unwrap();
        let pos = sk.world_position(head);
        assert_relative_eq!(pos.x, target.x, epsilon = 1e-3);
        assert_relative_eq!(pos.y, target.y, epsilon = 1e-3);
    }

    #[test]
    fn arm_bends_to_reach_within_workspace() {
        let (mut sk, chain) = arm();
        let target = Point3::new(0.4, 0.3, 0.0);
        let report = CcdSolver::with_defaults().solve(&mut sk, &chain, target);
        assert!(report.converged, "pos_err={}", report.position_error);
    }

    #[test]
    fn unreachable_target_stops_at_iteration_cap() {
        let (mut sk, chain) = arm();
        let report = CcdSolver::with_defaults().solve(&mut sk, &chain, Point3::new(5.0, 5.0, 5.0));
        assert!(!report.converged);
        assert_eq!(report.iterations, 10);
        assert!(report.position_error > 1.0);
    }

    #[test]
    fn already_converged_uses_zero_iterations() {
        let (mut sk, chain) = column();
        let report = CcdSolver::with_defaults().solve(&mut sk, &chain, Point3::new(0.0, 1.0, 0.0));
        assert_eq!(report.iterations, 0);
    }

    #[test]
    fn rotation_limit_clamps_per_step_motion() {
        let (mut sk, mut chain) = column();
        // Clamp the spine joint hard; one default-budget solve cannot
        // cover the quarter-turn to a sideways target.
        chain.set_joint_limit(0, Some(RotationLimit { max_step: 0.01 }));
        let report = CcdSolver::with_defaults().solve(&mut sk, &chain, Point3::new(0.5, 0.5, 0.0));
        assert!(!report.converged);
        // Error shrank versus the rest pose (distance ~0.707).
        assert!(report.position_error < 0.71);
    }

    #[test]
    fn repeated_solves_refine_toward_moving_budget() {
        let (mut sk, chain) = arm();
        let solver = CcdSolver::new(SolverSettings {
            max_iterations: 2,
            tolerance: 1e-4,
        });
        let target = Point3::new(0.1, 0.5, 0.2);
        let first = solver.solve(&mut sk, &chain, target);
        let second = solver.solve(&mut sk, &chain, target);
        assert!(second.position_error <= first.position_error + 1e-6);
    }
}
