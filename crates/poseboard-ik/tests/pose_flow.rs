//! End-to-end tick flow: solve, continuity, sync-back.

use approx::assert_relative_eq;
use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

use poseboard_core::config::RigConfig;
use poseboard_core::types::{TargetRole, TargetSet, TickInput};
use poseboard_ik::{apply_to_source, CharacterRig, RigMode};
use poseboard_skeleton::Skeleton;

fn humanoid() -> Skeleton {
    let mut sk = Skeleton::new();
    let y = |dy: f32| Isometry3::translation(0.0, dy, 0.0);
    let x = |dx: f32| Isometry3::translation(dx, 0.0, 0.0);

    let hips = sk.add_root("Hips", y(1.0)).unwrap();
    let spine = sk.add_bone("Spine", hips, y(0.2)).unwrap();
    let spine1 = sk.add_bone("Spine1", spine, y(0.2)).unwrap();
    let neck = sk.add_bone("Neck", spine1, y(0.2)).unwrap();
    sk.add_bone("Head", neck, y(0.2)).unwrap();

    let l_arm = sk.add_bone("LeftArm", spine1, x(0.2)).unwrap();
    let l_fore = sk.add_bone("LeftForeArm", l_arm, x(0.25)).unwrap();
    sk.add_bone("LeftHand", l_fore, x(0.25)).unwrap();

    let r_arm = sk.add_bone("RightArm", spine1, x(-0.2)).unwrap();
    let r_fore = sk.add_bone("RightForeArm", r_arm, x(-0.25)).unwrap();
    sk.add_bone("RightHand", r_fore, x(-0.25)).unwrap();

    let l_up = sk.add_bone("LeftUpLeg", hips, x(0.1)).unwrap();
    let l_leg = sk.add_bone("LeftLeg", l_up, y(-0.4)).unwrap();
    sk.add_bone("LeftFoot", l_leg, y(-0.4)).unwrap();

    let r_up = sk.add_bone("RightUpLeg", hips, x(-0.1)).unwrap();
    let r_leg = sk.add_bone("RightLeg", r_up, y(-0.4)).unwrap();
    sk.add_bone("RightFoot", r_leg, y(-0.4)).unwrap();

    sk
}

fn parked_targets() -> TargetSet {
    let mut targets = TargetSet::with_role_names();
    targets.get_mut(TargetRole::Hips).position = Point3::new(0.0, 1.0, 0.0);
    targets.get_mut(TargetRole::Head).position = Point3::new(0.0, 1.8, 0.0);
    targets
}

const ENABLED: TickInput = TickInput {
    enabled: true,
    rotation_override: false,
    hips_dragging: false,
    torso_editing: false,
};

/// One simulated frame in the mandatory order.
fn tick(rig: &mut CharacterRig, source: &mut Skeleton, targets: &mut TargetSet, input: TickInput) {
    rig.update(source, targets, input);
    if input.enabled {
        apply_to_source(rig.working(), rig.baseline(), source);
    }
}

#[test]
fn reach_then_release_holds_the_pose() {
    let mut source = humanoid();
    let mut targets = parked_targets();
    let mut rig =
        CharacterRig::new(&source, &mut targets, "generic", &RigConfig::default()).unwrap();

    let goal = Point3::new(0.5, 1.6, 0.2);
    targets.get_mut(TargetRole::LeftHand).activated = true;
    targets.get_mut(TargetRole::LeftHand).position = goal;
    for _ in 0..3 {
        tick(&mut rig, &mut source, &mut targets, ENABLED);
    }
    assert_eq!(rig.mode(), RigMode::Solving(TargetRole::LeftHand));

    let hand = source.bone_id("LeftHand").unwrap();
    let reached = source.world_position(hand);
    assert_relative_eq!(reached.x, goal.x, epsilon = 5e-3);
    assert_relative_eq!(reached.y, goal.y, epsilon = 5e-3);
    assert_relative_eq!(reached.z, goal.z, epsilon = 5e-3);

    // Release: chains hold the last solved pose, ticks are stable.
    targets.get_mut(TargetRole::LeftHand).activated = false;
    for _ in 0..4 {
        tick(&mut rig, &mut source, &mut targets, ENABLED);
        assert_eq!(rig.mode(), RigMode::Idle);
    }
    let held = source.world_position(hand);
    assert_relative_eq!(held.x, reached.x, epsilon = 1e-6);
    assert_relative_eq!(held.y, reached.y, epsilon = 1e-6);
}

#[test]
fn hips_drag_carries_torso_target() {
    let mut source = humanoid();
    let mut targets = parked_targets();
    let mut rig =
        CharacterRig::new(&source, &mut targets, "generic", &RigConfig::default()).unwrap();
    tick(&mut rig, &mut source, &mut targets, ENABLED);

    // Drag hips forward; the head target must follow at the cached offset.
    targets.get_mut(TargetRole::Hips).position = Point3::new(0.0, 1.0, 0.6);
    let dragging = TickInput {
        hips_dragging: true,
        ..ENABLED
    };
    tick(&mut rig, &mut source, &mut targets, dragging);

    let head = targets.get(TargetRole::Head).position;
    assert_relative_eq!(head.y, 1.8, epsilon = 1e-6);
    assert_relative_eq!(head.z, 0.6, epsilon = 1e-6);

    // The working hips followed the drag too.
    let hips = rig.working().bone_id("Hips").unwrap();
    assert_relative_eq!(rig.working().world_position(hips).z, 0.6, epsilon = 1e-6);
}

#[test]
fn override_window_survives_round_trip() {
    let mut source = humanoid();
    let mut targets = parked_targets();
    let mut rig =
        CharacterRig::new(&source, &mut targets, "generic", &RigConfig::default()).unwrap();
    tick(&mut rig, &mut source, &mut targets, ENABLED);

    let override_input = TickInput {
        rotation_override: true,
        ..ENABLED
    };
    tick(&mut rig, &mut source, &mut targets, override_input);
    let twist = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.4);
    rig.override_rotation("Neck", twist).unwrap();
    tick(&mut rig, &mut source, &mut targets, override_input);

    let neck = rig.working().bone_id("Neck").unwrap();
    assert_relative_eq!(
        rig.working().bone(neck).local().rotation.angle_to(&twist),
        0.0,
        epsilon = 1e-6
    );

    // Clearing the override returns to idle and re-baselines without
    // disturbing the overridden pose.
    tick(&mut rig, &mut source, &mut targets, ENABLED);
    assert_eq!(rig.mode(), RigMode::Idle);
    assert_relative_eq!(
        rig.working().bone(neck).local().rotation.angle_to(&twist),
        0.0,
        epsilon = 1e-6
    );
}

#[test]
fn disabling_mid_session_freezes_source() {
    let mut source = humanoid();
    let mut targets = parked_targets();
    let mut rig =
        CharacterRig::new(&source, &mut targets, "generic", &RigConfig::default()).unwrap();

    targets.get_mut(TargetRole::RightFoot).activated = true;
    targets.get_mut(TargetRole::RightFoot).position = Point3::new(-0.3, 0.3, 0.2);
    tick(&mut rig, &mut source, &mut targets, ENABLED);
    let frozen = source.clone();

    // Disable: immediate, synchronous, no further mutation.
    tick(&mut rig, &mut source, &mut targets, TickInput::default());
    tick(&mut rig, &mut source, &mut targets, TickInput::default());
    assert_eq!(source, frozen);
    assert_eq!(rig.mode(), RigMode::Disabled);
}
