//! Level and generator settings, loaded from TOML and validated before use.

use std::collections::{BTreeMap, BTreeSet};
use std::f32::consts::FRAC_PI_4;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{BOSS_1_SCENE, CollisionMask, HUB_SCENE, LevelIndex};

pub const DEFAULT_TARGET_COUNT: u32 = 10;
pub const DEFAULT_ATTEMPT_MULTIPLIER: u32 = 3;
pub const DEFAULT_PROBE_HEIGHT: f32 = 100.0;
pub const HUB_LEVEL_INDEX: LevelIndex = 5;
pub const BOSS_1_LEVEL_INDEX: LevelIndex = 8;

/// Axis-aligned horizontal rectangle candidates are sampled from.
/// `min.x`/`max.x` span world x, `min.y`/`max.y` span world z.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl SpawnBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, x: f32, z: f32) -> bool {
        (self.min.x..=self.max.x).contains(&x) && (self.min.y..=self.max.y).contains(&z)
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = self.min.is_finite() && self.max.is_finite();
        if !finite || self.min.x > self.max.x || self.min.y > self.max.y {
            return Err(ConfigError::InvalidSpawnBounds { min: self.min, max: self.max });
        }
        Ok(())
    }
}

impl Default for SpawnBounds {
    fn default() -> Self {
        Self { min: Vec2::new(-50.0, -50.0), max: Vec2::new(50.0, 50.0) }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Desired number of encounter entities per pass.
    pub target_count: u32,
    /// Attempts are capped at `target_count * attempt_multiplier`.
    pub attempt_multiplier: u32,
    /// Probes run from `+probe_height` down to `-probe_height`.
    pub probe_height: f32,
    pub collision_mask: CollisionMask,
    /// Maximum absolute yaw offset, in radians, applied after facing the player.
    pub yaw_jitter: f32,
    pub min_speed: u32,
    pub max_speed: u32,
    // Last so it serializes as a trailing TOML table.
    pub spawn_bounds: SpawnBounds,
}

impl GeneratorSettings {
    pub fn max_attempts(&self) -> u32 {
        self.target_count.saturating_mul(self.attempt_multiplier)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spawn_bounds.validate()?;
        if self.attempt_multiplier == 0 {
            return Err(ConfigError::ZeroAttemptMultiplier);
        }
        if !self.probe_height.is_finite() || self.probe_height <= 0.0 {
            return Err(ConfigError::InvalidProbeHeight(self.probe_height));
        }
        if !self.yaw_jitter.is_finite() || self.yaw_jitter < 0.0 {
            return Err(ConfigError::InvalidYawJitter(self.yaw_jitter));
        }
        if self.min_speed > self.max_speed {
            return Err(ConfigError::InvalidSpeedRange {
                min: self.min_speed,
                max: self.max_speed,
            });
        }
        Ok(())
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            attempt_multiplier: DEFAULT_ATTEMPT_MULTIPLIER,
            spawn_bounds: SpawnBounds::default(),
            probe_height: DEFAULT_PROBE_HEIGHT,
            collision_mask: CollisionMask::GROUND,
            yaw_jitter: FRAC_PI_4,
            min_speed: 10,
            max_speed: 18,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedLevelEntry {
    pub index: LevelIndex,
    pub scene: String,
    #[serde(default)]
    pub spawn_point: Option<Vec3>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSettings {
    pub procedural_spawn_point: Option<Vec3>,
    pub generator: GeneratorSettings,
    pub fixed_levels: Vec<FixedLevelEntry>,
}

impl LevelSettings {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        let mut seen = BTreeSet::new();
        for entry in &self.fixed_levels {
            if entry.scene.trim().is_empty() {
                return Err(ConfigError::EmptySceneName(entry.index));
            }
            if !seen.insert(entry.index) {
                return Err(ConfigError::DuplicateLevelIndex(entry.index));
            }
        }
        Ok(())
    }

    pub fn fixed_scenes(&self) -> BTreeMap<LevelIndex, String> {
        self.fixed_levels.iter().map(|entry| (entry.index, entry.scene.clone())).collect()
    }

    pub fn fixed_spawn_points(&self) -> BTreeMap<String, Vec3> {
        self.fixed_levels
            .iter()
            .filter_map(|entry| entry.spawn_point.map(|point| (entry.scene.clone(), point)))
            .collect()
    }
}

impl Default for LevelSettings {
    fn default() -> Self {
        let spawn = Some(Vec3::new(0.0, 1.0, 0.0));
        Self {
            generator: GeneratorSettings::default(),
            procedural_spawn_point: spawn,
            fixed_levels: vec![
                FixedLevelEntry {
                    index: HUB_LEVEL_INDEX,
                    scene: HUB_SCENE.to_string(),
                    spawn_point: spawn,
                },
                FixedLevelEntry {
                    index: BOSS_1_LEVEL_INDEX,
                    scene: BOSS_1_SCENE.to_string(),
                    spawn_point: spawn,
                },
            ],
        }
    }
}
