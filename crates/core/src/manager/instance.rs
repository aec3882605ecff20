//! Level containers and the library that instantiates them.
//! This module exists to separate "what a topology looks like when attached" from lifecycle rules.
//! It does not own seed selection, population timing, or notifications.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::config::{GeneratorSettings, LevelSettings};
use crate::generator::LevelGenerator;
use crate::types::{InstanceId, LevelIndex, Topology};

/// Freshly instantiated structure for one topology, before it becomes a live instance.
#[derive(Debug, Default)]
pub struct LevelContent {
    pub generator: Option<LevelGenerator>,
    /// Where the player should be placed once the level is announced.
    pub spawn_point: Option<Vec3>,
}

/// Entity-instantiation surface: builds level containers for a topology.
pub trait ContentLibrary {
    fn instantiate(&mut self, topology: &Topology) -> LevelContent;
}

impl<L: ContentLibrary + ?Sized> ContentLibrary for Box<L> {
    fn instantiate(&mut self, topology: &Topology) -> LevelContent {
        (**self).instantiate(topology)
    }
}

/// Library backed by [`LevelSettings`]: procedural levels get a generator, fixed scenes do not.
#[derive(Clone, Debug)]
pub struct SceneLibrary {
    generator: GeneratorSettings,
    procedural_spawn_point: Option<Vec3>,
    fixed_spawn_points: BTreeMap<String, Vec3>,
}

impl SceneLibrary {
    pub fn from_settings(settings: &LevelSettings) -> Self {
        Self {
            generator: settings.generator.clone(),
            procedural_spawn_point: settings.procedural_spawn_point,
            fixed_spawn_points: settings.fixed_spawn_points(),
        }
    }
}

impl Default for SceneLibrary {
    fn default() -> Self {
        Self::from_settings(&LevelSettings::default())
    }
}

impl ContentLibrary for SceneLibrary {
    fn instantiate(&mut self, topology: &Topology) -> LevelContent {
        match topology {
            Topology::Procedural => LevelContent {
                generator: Some(LevelGenerator::new(self.generator.clone())),
                spawn_point: self.procedural_spawn_point,
            },
            Topology::Fixed(scene) => LevelContent {
                generator: None,
                spawn_point: self.fixed_spawn_points.get(scene).copied(),
            },
        }
    }
}

/// The single live level owned by `LevelManager`. Never reused after retirement.
#[derive(Debug)]
pub struct LevelInstance {
    id: InstanceId,
    index: LevelIndex,
    topology: Topology,
    generator: Option<LevelGenerator>,
    spawn_point: Option<Vec3>,
}

impl LevelInstance {
    pub(crate) fn attach(
        id: InstanceId,
        index: LevelIndex,
        topology: Topology,
        content: LevelContent,
    ) -> Self {
        Self {
            id,
            index,
            topology,
            generator: content.generator,
            spawn_point: content.spawn_point,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn index(&self) -> LevelIndex {
        self.index
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn generator(&self) -> Option<&LevelGenerator> {
        self.generator.as_ref()
    }

    pub(crate) fn generator_mut(&mut self) -> Option<&mut LevelGenerator> {
        self.generator.as_mut()
    }

    pub fn spawn_point(&self) -> Option<Vec3> {
        self.spawn_point
    }

    pub fn entity_count(&self) -> usize {
        self.generator.as_ref().map_or(0, LevelGenerator::entity_count)
    }

    /// Destroys everything the instance placed; returns how many entities went away.
    pub(crate) fn retire(mut self) -> usize {
        self.generator.as_mut().map_or(0, LevelGenerator::clear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedural_content_carries_a_generator() {
        let mut library = SceneLibrary::default();
        let content = library.instantiate(&Topology::Procedural);
        let generator = content.generator.expect("procedural content should have a generator");
        assert_eq!(generator.settings().target_count, 10);
        assert_eq!(content.spawn_point, Some(Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn fixed_content_has_no_generator() {
        let mut library = SceneLibrary::default();
        let hub = library.instantiate(&Topology::hub());
        assert!(hub.generator.is_none());
        assert_eq!(hub.spawn_point, Some(Vec3::new(0.0, 1.0, 0.0)));

        let unknown = library.instantiate(&Topology::Fixed("Unlisted".to_string()));
        assert!(unknown.generator.is_none());
        assert_eq!(unknown.spawn_point, None);
    }
}
