use thiserror::Error;

/// Top-level error type for the Poseboard workspace.
#[derive(Debug, Error)]
pub enum PoseboardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rig error: {0}")]
    Rig(#[from] RigError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid max_iterations: 0 (must be > 0)")]
    ZeroIterations,

    #[error("Invalid tolerance: {0} (must be > 0)")]
    InvalidTolerance(f32),

    #[error("Invalid forward_axis: {0:?} (must have finite nonzero length)")]
    InvalidForwardAxis([f32; 3]),
}

/// Rig initialization and update errors.
///
/// Everything here is fatal at initialization time; per-tick solving has
/// no error path (non-convergence within the iteration cap is normal).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RigError {
    #[error("Bone not found in skeleton: {0}")]
    MissingBone(String),

    #[error("Chain {role} never closes: {start} is not an ancestor of {end}")]
    ChainNotClosed {
        role: &'static str,
        start: &'static str,
        end: &'static str,
    },

    #[error("Bone {bone} belongs to more than one chain")]
    OverlappingChains { bone: String },

    #[error("Duplicate bone name: {0}")]
    DuplicateBoneName(String),

    #[error("Skeleton already has a root bone")]
    MultipleRoots,
}
