// poseboard-core: Types, config and errors for the Poseboard character IK workspace.

pub mod config;
pub mod error;
pub mod types;

use bevy::prelude::SystemSet;

/// System set ordering for the per-tick IK pipeline.
///
/// The order is mandatory: input capture writes control targets and tick
/// flags, the rig set solves and applies pose continuity, and the sync set
/// copies working-skeleton rotations back onto source skeletons. Running
/// them out of order produces stale limb placement.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseSet {
    /// Input handling writes [`ControlTarget`](types::ControlTarget) values.
    Input,
    /// Rig update: solve, then pose continuity.
    Rig,
    /// Sync-back onto source skeletons for rendering.
    Sync,
}

pub mod prelude {
    pub use crate::config::{RigConfig, SolverSettings};
    pub use crate::error::{ConfigError, PoseboardError, RigError};
    pub use crate::types::{CharacterId, ControlTarget, TargetRole, TargetSet, TickInput};
    pub use crate::PoseSet;
}
