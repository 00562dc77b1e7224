use nalgebra::Isometry3;

/// Index of a bone within its [`Skeleton`](crate::Skeleton) arena.
///
/// Ids are only meaningful within the skeleton that issued them, but a
/// working copy preserves indices, so the same id addresses the matching
/// bone in both the source skeleton and its working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoneId(pub(crate) u32);

impl BoneId {
    /// Arena index of this bone.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node in a skeletal hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub(crate) name: String,
    pub(crate) local: Isometry3<f32>,
    pub(crate) parent: Option<BoneId>,
    pub(crate) children: Vec<BoneId>,
    /// When false, [`Skeleton::propagate`](crate::Skeleton::propagate)
    /// leaves this bone's cached world transform alone: the IK chain
    /// machinery owns its matrix updates to prevent double application.
    pub(crate) auto_propagate: bool,
}

impl Bone {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn local(&self) -> &Isometry3<f32> {
        &self.local
    }

    #[must_use]
    pub const fn parent(&self) -> Option<BoneId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[BoneId] {
        &self.children
    }

    #[must_use]
    pub const fn auto_propagate(&self) -> bool {
        self.auto_propagate
    }
}
