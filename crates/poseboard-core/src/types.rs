use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CharacterId
// ---------------------------------------------------------------------------

/// Identifies one character instance in the scene.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CharacterId(pub u32);

// ---------------------------------------------------------------------------
// TargetRole
// ---------------------------------------------------------------------------

/// Fixed role of each of the six control targets.
///
/// Index 0 (hips) is direct-drive and never solved; indices 1–5 are chain
/// effectors. When several effector targets are activated in the same tick,
/// the lowest index wins — an explicit policy, not an accident of iteration
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRole {
    Hips,
    Head,
    LeftHand,
    RightHand,
    LeftFoot,
    RightFoot,
}

impl TargetRole {
    /// All roles in index order.
    pub const ALL: [Self; 6] = [
        Self::Hips,
        Self::Head,
        Self::LeftHand,
        Self::RightHand,
        Self::LeftFoot,
        Self::RightFoot,
    ];

    /// Effector roles (everything except hips), in priority order.
    pub const EFFECTORS: [Self; 5] = [
        Self::Head,
        Self::LeftHand,
        Self::RightHand,
        Self::LeftFoot,
        Self::RightFoot,
    ];

    /// Role name, as used in error messages and target names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hips => "Hips",
            Self::Head => "Head",
            Self::LeftHand => "LeftHand",
            Self::RightHand => "RightHand",
            Self::LeftFoot => "LeftFoot",
            Self::RightFoot => "RightFoot",
        }
    }

    /// Fixed position of this role in the control-target array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Hips => 0,
            Self::Head => 1,
            Self::LeftHand => 2,
            Self::RightHand => 3,
            Self::LeftFoot => 4,
            Self::RightFoot => 5,
        }
    }
}

// ---------------------------------------------------------------------------
// ControlTarget
// ---------------------------------------------------------------------------

/// Externally driven transform indicating where a chain's end should move.
///
/// Targets are owned by the caller (input/VR handling) for the lifetime of
/// the rig; the IK subsystem only reads them, except that pose continuity
/// may rewrite the head target's local position and chain construction
/// renames each effector target to its end bone.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlTarget {
    /// Display name; rebound to the driven bone's name at chain setup.
    pub name: String,
    /// Position in the target's parent space.
    pub position: Point3<f32>,
    /// Rotation in the target's parent space; copied onto the effector
    /// bone while this target's chain is being solved.
    pub rotation: UnitQuaternion<f32>,
    /// World transform of the target's parent in the scene graph.
    pub parent_world: Isometry3<f32>,
    /// Whether the user is actively driving this target.
    pub activated: bool,
}

impl ControlTarget {
    /// A deactivated target at the local origin.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            parent_world: Isometry3::identity(),
            activated: false,
        }
    }

    /// Target position in world space.
    #[must_use]
    pub fn world_position(&self) -> Point3<f32> {
        self.parent_world * self.position
    }

    /// Target rotation in world space.
    #[must_use]
    pub fn world_rotation(&self) -> UnitQuaternion<f32> {
        self.parent_world.rotation * self.rotation
    }

    /// Express a world-space point in this target's parent space.
    #[must_use]
    pub fn world_to_local(&self, world: Point3<f32>) -> Point3<f32> {
        self.parent_world.inverse_transform_point(&world)
    }
}

// ---------------------------------------------------------------------------
// TargetSet
// ---------------------------------------------------------------------------

/// Exactly six control targets, one per [`TargetRole`].
///
/// The fixed-size constructor makes the six-target precondition a
/// compile-time fact rather than a runtime length check.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSet {
    targets: [ControlTarget; 6],
}

impl TargetSet {
    #[must_use]
    pub const fn new(targets: [ControlTarget; 6]) -> Self {
        Self { targets }
    }

    /// A full set of deactivated targets named after their roles.
    #[must_use]
    pub fn with_role_names() -> Self {
        Self::new([
            ControlTarget::new("Hips"),
            ControlTarget::new("Head"),
            ControlTarget::new("LeftHand"),
            ControlTarget::new("RightHand"),
            ControlTarget::new("LeftFoot"),
            ControlTarget::new("RightFoot"),
        ])
    }

    #[must_use]
    pub fn get(&self, role: TargetRole) -> &ControlTarget {
        &self.targets[role.index()]
    }

    pub fn get_mut(&mut self, role: TargetRole) -> &mut ControlTarget {
        &mut self.targets[role.index()]
    }

    /// The effector role to solve this tick: the lowest-index activated
    /// target among roles 1–5, or `None` if all are clear.
    #[must_use]
    pub fn active_role(&self) -> Option<TargetRole> {
        TargetRole::EFFECTORS
            .into_iter()
            .find(|role| self.get(*role).activated)
    }
}

// ---------------------------------------------------------------------------
// TickInput
// ---------------------------------------------------------------------------

/// Per-tick caller flags for the rig update.
///
/// Transient UI state is passed explicitly instead of being fetched from
/// ambient globals, keeping the update pure and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInput {
    /// IK solving is on. Turning this off is immediate and synchronous.
    pub enabled: bool,
    /// The caller is writing bone rotations directly; solving is suspended.
    pub rotation_override: bool,
    /// The hips target is being dragged by the user.
    pub hips_dragging: bool,
    /// The torso is being repositioned independently of the hips.
    /// Mutually exclusive with hips-driven offset application in a tick.
    pub torso_editing: bool,
}

/// Forward axis from a config triple, normalized.
#[must_use]
pub fn forward_axis_vector(axis: [f32; 3]) -> Vector3<f32> {
    Vector3::new(axis[0], axis[1], axis[2]).normalize()
}
