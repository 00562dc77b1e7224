//! Arena-backed bone tree with cached world transforms.

use std::collections::HashMap;

use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

use poseboard_core::error::RigError;

use crate::bone::{Bone, BoneId};

/// A named bone hierarchy.
///
/// Invariants: single root, no cycles (children are always added under an
/// existing parent), unique bone names. World transforms are cached per
/// bone and refreshed either by [`propagate`](Self::propagate) (which
/// honors each bone's auto-propagation flag) or by the forced refresh
/// methods used by the IK machinery.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
    by_name: HashMap<String, BoneId>,
    world: Vec<Isometry3<f32>>,
}

impl Skeleton {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// The root bone, if any bone has been added.
    #[must_use]
    pub fn root(&self) -> Option<BoneId> {
        self.bones.first().map(|_| BoneId(0))
    }

    /// Add the root bone.
    pub fn add_root(
        &mut self,
        name: impl Into<String>,
        local: Isometry3<f32>,
    ) -> Result<BoneId, RigError> {
        if !self.bones.is_empty() {
            return Err(RigError::MultipleRoots);
        }
        self.push_bone(name.into(), None, local)
    }

    /// Add a bone under `parent`.
    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        parent: BoneId,
        local: Isometry3<f32>,
    ) -> Result<BoneId, RigError> {
        let id = self.push_bone(name.into(), Some(parent), local)?;
        self.bones[parent.index()].children.push(id);
        Ok(id)
    }

    fn push_bone(
        &mut self,
        name: String,
        parent: Option<BoneId>,
        local: Isometry3<f32>,
    ) -> Result<BoneId, RigError> {
        if self.by_name.contains_key(&name) {
            return Err(RigError::DuplicateBoneName(name));
        }
        #[allow(clippy::cast_possible_truncation)]
        let id = BoneId(self.bones.len() as u32);
        let world = match parent {
            Some(p) => self.world[p.index()] * local,
            None => local,
        };
        self.by_name.insert(name.clone(), id);
        self.bones.push(Bone {
            name,
            local,
            parent,
            children: Vec::new(),
            auto_propagate: true,
        });
        self.world.push(world);
        Ok(id)
    }

    /// Look up a bone by name.
    #[must_use]
    pub fn bone_id(&self, name: &str) -> Option<BoneId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn bone(&self, id: BoneId) -> &Bone {
        &self.bones[id.index()]
    }

    /// Cached world transform of a bone.
    #[must_use]
    pub fn world(&self, id: BoneId) -> &Isometry3<f32> {
        &self.world[id.index()]
    }

    /// Cached world position of a bone.
    #[must_use]
    pub fn world_position(&self, id: BoneId) -> Point3<f32> {
        Point3::from(self.world[id.index()].translation.vector)
    }

    pub fn set_local(&mut self, id: BoneId, local: Isometry3<f32>) {
        self.bones[id.index()].local = local;
    }

    pub fn set_local_rotation(&mut self, id: BoneId, rotation: UnitQuaternion<f32>) {
        self.bones[id.index()].local.rotation = rotation;
    }

    pub fn set_local_translation(&mut self, id: BoneId, translation: Vector3<f32>) {
        self.bones[id.index()].local.translation.vector = translation;
    }

    pub fn set_auto_propagate(&mut self, id: BoneId, auto: bool) {
        self.bones[id.index()].auto_propagate = auto;
    }

    /// Bone ids in depth-first pre-order from the root.
    ///
    /// Arena ids are issued in insertion order, which is already a valid
    /// pre-order for the purposes of world propagation (every parent
    /// precedes its children), but traversal callers get true DFS order.
    #[must_use]
    pub fn preorder(&self) -> Vec<BoneId> {
        let mut order = Vec::with_capacity(self.bones.len());
        let Some(root) = self.root() else {
            return order;
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            // Push children reversed so the first child is visited first.
            for &child in self.bones[id.index()].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Refresh cached world transforms, honoring auto-propagation flags.
    ///
    /// Bones with auto-propagation disabled keep whatever world transform
    /// the IK machinery last wrote; their children still compose against
    /// that cached value.
    pub fn propagate(&mut self) {
        for id in self.preorder() {
            if self.bones[id.index()].auto_propagate {
                self.refresh_bone(id);
            }
        }
    }

    /// Force-refresh every cached world transform, ignoring flags.
    pub fn refresh_all(&mut self) {
        for id in self.preorder() {
            self.refresh_bone(id);
        }
    }

    /// Recompute one bone's world transform from its parent's cache.
    pub fn refresh_bone(&mut self, id: BoneId) {
        let bone = &self.bones[id.index()];
        self.world[id.index()] = match bone.parent {
            Some(p) => self.world[p.index()] * bone.local,
            None => bone.local,
        };
    }

    /// Force-refresh a bone and all of its descendants.
    pub fn refresh_subtree(&mut self, id: BoneId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            self.refresh_bone(id);
            stack.extend_from_slice(&self.bones[id.index()].children);
        }
    }

    /// Deep structural copy with independent transforms.
    ///
    /// Topology, names and bone ids are identical at creation; values
    /// diverge afterward. This is the working skeleton the IK rig owns
    /// exclusively.
    #[must_use]
    pub fn working_copy(&self) -> Self {
        self.clone()
    }

    /// Whether two skeletons share topology and names bone-for-bone.
    #[must_use]
    pub fn same_topology(&self, other: &Self) -> bool {
        self.bones.len() == other.bones.len()
            && self
                .bones
                .iter()
                .zip(&other.bones)
                .all(|(a, b)| a.name == b.name && a.parent == b.parent)
    }
}
