use glam::Vec2;
use thiserror::Error;

use crate::types::{LevelIndex, LevelState};

/// Rejected level or generator settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("spawn bounds are inverted or not finite: min {min}, max {max}")]
    InvalidSpawnBounds { min: Vec2, max: Vec2 },

    #[error("attempt multiplier must be at least 1")]
    ZeroAttemptMultiplier,

    #[error("probe height must be positive and finite, got {0}")]
    InvalidProbeHeight(f32),

    #[error("yaw jitter must be finite and non-negative, got {0}")]
    InvalidYawJitter(f32),

    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),

    #[error("speed range is inverted: {min}..={max}")]
    InvalidSpeedRange { min: u32, max: u32 },

    #[error("level index {0} is mapped to more than one fixed scene")]
    DuplicateLevelIndex(LevelIndex),

    #[error("fixed scene name for level {0} is empty")]
    EmptySceneName(LevelIndex),

    #[error("failed to parse level settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Misuse of the two-phase level protocol.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("no population pass is pending (level state: {state:?})")]
    NothingToPopulate { state: LevelState },
}
