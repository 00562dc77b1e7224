use std::path::Path;

use bevy::prelude::Resource;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_max_iterations() -> u32 {
    10
}
const fn default_tolerance() -> f32 {
    1e-3
}
const fn default_forward_axis() -> [f32; 3] {
    [0.0, 0.0, 1.0]
}

// ---------------------------------------------------------------------------
// SolverSettings
// ---------------------------------------------------------------------------

/// Convergence settings for the per-chain CCD solver.
///
/// The iteration cap and tolerance are deliberate configuration, not hidden
/// constants: a solve that stops at the cap is normal and self-corrects on
/// subsequent ticks as long as targets move continuously.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Maximum solver iterations per tick (default: 10).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Position error tolerance in scene units (default: 1e-3).
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
        }
    }
}

// ---------------------------------------------------------------------------
// RigConfig
// ---------------------------------------------------------------------------

/// Configuration for a character rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct RigConfig {
    /// Solver convergence settings.
    #[serde(default)]
    pub solver: SolverSettings,

    /// Forward-axis convention of the solver (default: +Z).
    ///
    /// The hips basis is reoriented once at initialization so the rig's
    /// forward direction matches this axis.
    #[serde(default = "default_forward_axis")]
    pub forward_axis: [f32; 3],
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            solver: SolverSettings::default(),
            forward_axis: default_forward_axis(),
        }
    }
}

impl RigConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solver.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if !(self.solver.tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(self.solver.tolerance));
        }
        // The axis is normalized at rig setup; reject anything whose
        // normalization would produce NaN components.
        let norm = Vector3::from(self.forward_axis).norm();
        if !norm.is_finite() || norm <= f32::EPSILON {
            return Err(ConfigError::InvalidForwardAxis(self.forward_axis));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_are_valid() {
        let config = RigConfig::default();
        config.validate().unwrap();
        assert_eq!(config.solver.max_iterations, 10);
        assert_relative_eq!(config.solver.tolerance, 1e-3);
        assert_eq!(config.forward_axis, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = RigConfig::from_toml_str("").unwrap();
        assert_eq!(config, RigConfig::default());
    }

    #[test]
    fn parse_partial_toml() {
        let config = RigConfig::from_toml_str(
            r"
            [solver]
            max_iterations = 50
            ",
        )
        .unwrap();
        assert_eq!(config.solver.max_iterations, 50);
        assert_relative_eq!(config.solver.tolerance, 1e-3);
    }

    #[test]
    fn zero_iterations_rejected() {
        let err = RigConfig::from_toml_str(
            r"
            [solver]
            max_iterations = 0
            ",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroIterations));
    }

    #[test]
    fn negative_tolerance_rejected() {
        let err = RigConfig::from_toml_str(
            r"
            [solver]
            tolerance = -0.5
            ",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTolerance(_)));
    }

    #[test]
    fn zero_forward_axis_rejected() {
        let err = RigConfig::from_toml_str("forward_axis = [0.0, 0.0, 0.0]").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidForwardAxis(_)));
    }

    #[test]
    fn non_finite_forward_axis_rejected() {
        let config = RigConfig {
            forward_axis: [f32::NAN, 0.0, 1.0],
            ..RigConfig::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidForwardAxis(_)
        ));
    }

    #[test]
    fn nan_tolerance_rejected() {
        let config = RigConfig {
            solver: SolverSettings {
                max_iterations: 10,
                tolerance: f32::NAN,
            },
            ..RigConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_parse_error_surfaces() {
        let err = RigConfig::from_toml_str("not valid toml [").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
