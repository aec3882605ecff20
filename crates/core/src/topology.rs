//! Level index to topology resolution.

use std::collections::BTreeMap;

use crate::config::{BOSS_1_LEVEL_INDEX, HUB_LEVEL_INDEX};
use crate::types::{BOSS_1_SCENE, HUB_SCENE, LevelIndex, Topology};

/// Fixed scenes keyed by index over a Procedural default, so resolution is total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopologyTable {
    fixed: BTreeMap<LevelIndex, String>,
}

impl TopologyTable {
    pub fn procedural_only() -> Self {
        Self { fixed: BTreeMap::new() }
    }

    pub fn from_fixed(fixed: BTreeMap<LevelIndex, String>) -> Self {
        Self { fixed }
    }

    pub fn with_fixed(mut self, index: LevelIndex, scene: impl Into<String>) -> Self {
        self.fixed.insert(index, scene.into());
        self
    }

    pub fn resolve(&self, index: LevelIndex) -> Topology {
        match self.fixed.get(&index) {
            Some(scene) => Topology::Fixed(scene.clone()),
            None => Topology::Procedural,
        }
    }

    pub fn is_procedural(&self, index: LevelIndex) -> bool {
        !self.fixed.contains_key(&index)
    }

    pub fn fixed_levels(&self) -> impl Iterator<Item = (LevelIndex, &str)> {
        self.fixed.iter().map(|(index, scene)| (*index, scene.as_str()))
    }
}

impl Default for TopologyTable {
    fn default() -> Self {
        Self::procedural_only()
            .with_fixed(HUB_LEVEL_INDEX, HUB_SCENE)
            .with_fixed(BOSS_1_LEVEL_INDEX, BOSS_1_SCENE)
    }
}
