//! Inverse kinematics for Poseboard character rigs.
//!
//! Poses articulated human skeletons through six control targets: a
//! direct-driven hips target plus head, hand and foot effectors, each
//! bound to a fixed limb chain in a private working copy of the
//! character's skeleton.
//!
//! # Architecture
//!
//! ```text
//! Skeleton ──► CharacterRig ──► working-skeleton rotations
//!                 │                      │
//!            LimbChain × 5          PoseBaseline ──► sync-back
//!                 │
//!             CcdSolver
//! ```
//!
//! The [`CharacterRig`] clones the source skeleton once at setup, adapts
//! its forward axis, builds the five limb chains, and then each tick
//! solves at most one chain toward its activated target, applies the
//! hips-to-torso continuity offset, and (on enable transitions) captures
//! the per-bone baseline consumed by sync-back.

pub mod chain;
pub mod continuity;
pub mod plugin;
pub mod rig;
pub mod solver;
pub mod state;
pub mod sync;

pub use chain::{build_chains, ChainSpec, Joint, LimbChain, RotationLimit, CHAIN_SPECS};
pub use continuity::PoseContinuity;
pub use plugin::{PoseboardIkPlugin, RigEntry, RigRegistry};
pub use rig::CharacterRig;
pub use solver::{CcdSolver, SolveReport};
pub use state::{ModeChange, ModeMachine, RigMode};
pub use sync::{apply_to_source, PoseBaseline};
