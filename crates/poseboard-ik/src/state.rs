//! Rig mode state machine.
//!
//! Tracks whether the rig is disabled, holding pose, solving toward an
//! active target, or suspended while the caller writes bone rotations
//! directly. Transitions are driven entirely by the per-tick input flags
//! and target activation; there is no terminal state — teardown is the
//! owner's responsibility.

use poseboard_core::types::{TargetRole, TickInput};

/// Current rig mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RigMode {
    /// Solving off; the working skeleton is inert.
    #[default]
    Disabled,
    /// Solving on, no active target; chains hold their last pose.
    Idle,
    /// An active target drives convergence.
    Solving(TargetRole),
    /// The caller writes bone rotations directly; solving is suspended.
    RotationOverride,
}

impl RigMode {
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Whether the solver may run in this mode.
    #[must_use]
    pub const fn solving_allowed(self) -> bool {
        matches!(self, Self::Idle | Self::Solving(_))
    }
}

/// Side effects of a mode transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[must_use]
pub struct ModeChange {
    /// The rig just (re-)entered an enabled, non-override mode — either
    /// Disabled→enabled or RotationOverride→enabled. The continuity
    /// offset must be recomputed and the sync baseline recaptured.
    pub entered_enabled: bool,
}

/// Per-instance mode machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeMachine {
    mode: RigMode,
}

impl ModeMachine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: RigMode::Disabled,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> RigMode {
        self.mode
    }

    /// Advance the machine for one tick.
    ///
    /// `active` is the effector role selected for this tick, if any.
    /// Disabling is immediate and synchronous: there is no in-flight
    /// solve to cancel.
    pub fn advance(&mut self, input: &TickInput, active: Option<TargetRole>) -> ModeChange {
        let previous = self.mode;

        self.mode = if !input.enabled {
            RigMode::Disabled
        } else if input.rotation_override {
            RigMode::RotationOverride
        } else if let Some(role) = active {
            RigMode::Solving(role)
        } else {
            RigMode::Idle
        };

        ModeChange {
            entered_enabled: !previous.solving_allowed() && self.mode.solving_allowed(),
        }
    }
}
