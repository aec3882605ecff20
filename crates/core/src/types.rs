use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct EntityId;
}

/// Integer naming a level slot; resolved to a [`Topology`] by the topology table.
pub type LevelIndex = i32;

/// 64-bit value that fully determines a generator's draw sequence.
pub type GenerationSeed = u64;

pub const HUB_SCENE: &str = "Hub";
pub const BOSS_1_SCENE: &str = "Boss1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionMask(pub u32);

impl CollisionMask {
    pub const GROUND: Self = Self(1);
    pub const ALL: Self = Self(u32::MAX);

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for CollisionMask {
    fn default() -> Self {
        Self::GROUND
    }
}

/// The kind of content behind a level index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    Procedural,
    Fixed(String),
}

impl Topology {
    pub fn hub() -> Self {
        Self::Fixed(HUB_SCENE.to_string())
    }

    pub fn boss_1() -> Self {
        Self::Fixed(BOSS_1_SCENE.to_string())
    }

    pub fn is_procedural(&self) -> bool {
        matches!(self, Self::Procedural)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Procedural => "Procedural",
            Self::Fixed(scene) => scene,
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle state of the level slot owned by `LevelManager`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LevelState {
    #[default]
    Unloaded,
    /// Structure attached; population is pending until the world can answer queries.
    Instantiating,
    Populating,
    Ready,
    Retiring,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_masks_intersect_on_shared_bits() {
        assert!(CollisionMask(0b011).intersects(CollisionMask(0b010)));
        assert!(!CollisionMask(0b100).intersects(CollisionMask::GROUND));
        assert!(CollisionMask::ALL.intersects(CollisionMask(1 << 31)));
    }

    #[test]
    fn topology_labels_match_scene_names() {
        assert_eq!(Topology::Procedural.label(), "Procedural");
        assert_eq!(Topology::hub().to_string(), "Hub");
        assert_eq!(Topology::boss_1().label(), "Boss1");
        assert!(!Topology::hub().is_procedural());
    }
}
