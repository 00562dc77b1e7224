//! Bone hierarchies for the Poseboard IK subsystem.
//!
//! A [`Skeleton`] is an arena-backed single-root bone tree with unique
//! names and local [`Isometry3`](nalgebra::Isometry3) transforms. Two
//! skeletons exist per character: the *source* skeleton owned by the
//! surrounding application (animation, rendering) and the *working*
//! skeleton owned exclusively by the IK rig, produced once at setup by
//! [`Skeleton::working_copy`]. Bones are paired across the two by
//! name-to-id lookup, never by traversal order.

pub mod axis;
pub mod bone;
pub mod skeleton;

pub use axis::align_forward;
pub use bone::{Bone, BoneId};
pub use skeleton::Skeleton;
