//! Level lifecycle state machine.
//! This module exists to own the single live level slot and the seed bookkeeping for retries.
//! It does not own placement rules, collision queries, or how scenes are built.

mod events;
mod instance;

pub use events::{LevelEvent, ListenerId};
pub use instance::{ContentLibrary, LevelContent, LevelInstance, SceneLibrary};

use tracing::{debug, error, info};

use self::events::ListenerRegistry;
use crate::config::LevelSettings;
use crate::error::TransitionError;
use crate::generator::{PopulationContext, PopulationOutcome, PopulationReport};
use crate::seed::SeedSource;
use crate::topology::TopologyTable;
use crate::types::{GenerationSeed, InstanceId, LevelIndex, LevelState, Topology};

pub struct LevelManager {
    topology: TopologyTable,
    content: Box<dyn ContentLibrary>,
    seeds: Box<dyn SeedSource>,
    state: LevelState,
    current: Option<LevelInstance>,
    current_index: LevelIndex,
    // Topology of the most recent attach; survives `unload` so retry can replay it.
    last_topology: Option<Topology>,
    // Seed waiting for `populate`; cleared once a pass ran against a ready world.
    pending_seed: Option<GenerationSeed>,
    last_seed: Option<GenerationSeed>,
    next_instance_id: u64,
    listeners: ListenerRegistry,
}

impl LevelManager {
    pub fn new(
        topology: TopologyTable,
        content: impl ContentLibrary + 'static,
        seeds: impl SeedSource + 'static,
    ) -> Self {
        Self {
            topology,
            content: Box::new(content),
            seeds: Box::new(seeds),
            state: LevelState::Unloaded,
            current: None,
            current_index: 0,
            last_topology: None,
            pending_seed: None,
            last_seed: None,
            next_instance_id: 0,
            listeners: ListenerRegistry::default(),
        }
    }

    pub fn from_settings(settings: &LevelSettings, seeds: impl SeedSource + 'static) -> Self {
        Self::new(
            TopologyTable::from_fixed(settings.fixed_scenes()),
            SceneLibrary::from_settings(settings),
            seeds,
        )
    }

    /// Retires the live level and attaches the topology mapped to `index`.
    /// Procedural levels draw a fresh seed and wait for [`Self::populate`].
    pub fn load_level(&mut self, index: LevelIndex) -> LevelState {
        self.retire_current();
        let topology = self.topology.resolve(index);
        self.attach(index, topology, None)
    }

    /// Like [`Self::load_level`] but always procedural, generating from `seed`.
    pub fn load_level_with_seed(&mut self, index: LevelIndex, seed: GenerationSeed) -> LevelState {
        self.retire_current();
        self.attach(index, Topology::Procedural, Some(seed))
    }

    /// Rebuilds the current level. Procedural levels replay the last recorded seed,
    /// including after [`Self::unload`].
    pub fn retry_current_level(&mut self) -> LevelState {
        let index = self.current_index;
        let procedural = self.last_topology.as_ref().is_some_and(Topology::is_procedural);
        if !procedural {
            return self.load_level(index);
        }
        let seed = self.last_seed;
        info!(index, ?seed, "retrying procedural level");
        self.retire_current();
        self.attach(index, Topology::Procedural, seed)
    }

    pub fn load_next_level(&mut self) -> LevelState {
        self.load_level(self.current_index.saturating_add(1))
    }

    /// Second phase: populates the pending procedural level against `context`.
    ///
    /// A world that is not ready yet leaves the population pending with the same seed,
    /// so the caller can invoke this again once collision data is available.
    pub fn populate(
        &mut self,
        context: PopulationContext<'_>,
    ) -> Result<PopulationReport, TransitionError> {
        let state = self.state;
        let (Some(seed), LevelState::Instantiating) = (self.pending_seed, state) else {
            return Err(TransitionError::NothingToPopulate { state });
        };
        let Some(generator) = self.current.as_mut().and_then(LevelInstance::generator_mut) else {
            return Err(TransitionError::NothingToPopulate { state });
        };

        self.state = LevelState::Populating;
        let report = generator.generate_level_with_seed(seed, context);
        if report.outcome == PopulationOutcome::WorldNotReady {
            self.state = LevelState::Instantiating;
            return Ok(report);
        }

        self.pending_seed = None;
        self.state = LevelState::Ready;
        self.listeners.emit(&LevelEvent::LevelPopulated {
            index: self.current_index,
            report: report.clone(),
        });
        Ok(report)
    }

    /// Retires the live level without loading another one.
    pub fn unload(&mut self) {
        if self.current.is_some() {
            info!(index = self.current_index, "unloading level");
        }
        self.retire_current();
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    pub fn current_index(&self) -> LevelIndex {
        self.current_index
    }

    pub fn current_topology(&self) -> Option<&Topology> {
        self.current.as_ref().map(LevelInstance::topology)
    }

    pub fn current_instance(&self) -> Option<&LevelInstance> {
        self.current.as_ref()
    }

    /// Seed of the most recent procedural level. Stale while a fixed level is loaded.
    ///
    /// Recorded when the level is instantiated, before any placement runs, so a
    /// procedural level retired before a successful [`Self::populate`] still
    /// replaces the previous value.
    pub fn last_seed(&self) -> Option<GenerationSeed> {
        self.last_seed
    }

    pub fn pending_seed(&self) -> Option<GenerationSeed> {
        self.pending_seed
    }

    pub fn topology_table(&self) -> &TopologyTable {
        &self.topology
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&LevelEvent) + 'static) -> ListenerId {
        self.listeners.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn retire_current(&mut self) {
        self.pending_seed = None;
        let Some(level) = self.current.take() else {
            self.state = LevelState::Unloaded;
            return;
        };
        self.state = LevelState::Retiring;
        let id = level.id();
        let index = level.index();
        let removed = level.retire();
        debug!(instance = id.0, index, removed, "level retired");
        self.state = LevelState::Unloaded;
    }

    fn attach(
        &mut self,
        index: LevelIndex,
        topology: Topology,
        seed: Option<GenerationSeed>,
    ) -> LevelState {
        debug_assert!(self.current.is_none(), "previous level must be retired first");
        let content = self.content.instantiate(&topology);
        let id = InstanceId(self.next_instance_id);
        self.next_instance_id += 1;
        let level = LevelInstance::attach(id, index, topology.clone(), content);
        let spawn_point = level.spawn_point();

        self.state = match (&topology, level.generator().is_some()) {
            (Topology::Procedural, true) => {
                let seed = seed.unwrap_or_else(|| self.seeds.next_seed());
                self.pending_seed = Some(seed);
                self.last_seed = Some(seed);
                info!(index, seed, "procedural level instantiated; population pending");
                LevelState::Instantiating
            }
            (Topology::Procedural, false) => {
                error!(
                    index,
                    instance = id.0,
                    "procedural level has no generator; it will stay unpopulated"
                );
                LevelState::Ready
            }
            (Topology::Fixed(scene), _) => {
                info!(index, scene = scene.as_str(), "fixed level instantiated");
                LevelState::Ready
            }
        };
        self.current = Some(level);
        self.current_index = index;
        self.last_topology = Some(topology.clone());

        self.listeners.emit(&LevelEvent::LevelLoaded { index, topology, spawn_point });
        self.state
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec3;

    use super::*;
    use crate::config::SpawnBounds;
    use crate::seed::CounterSeedSource;
    use crate::terrain::FlatGround;

    fn manager() -> LevelManager {
        LevelManager::from_settings(&LevelSettings::default(), CounterSeedSource::new(11))
    }

    #[test]
    fn procedural_load_waits_for_populate() {
        let mut levels = manager();
        let expected_seed = CounterSeedSource::new(11).next_seed();

        assert_eq!(levels.load_level(1), LevelState::Instantiating);
        assert_eq!(levels.pending_seed(), Some(expected_seed));
        assert_eq!(levels.last_seed(), Some(expected_seed));
        assert_eq!(levels.current_instance().map(LevelInstance::entity_count), Some(0));

        let ground = FlatGround::new(0.0, SpawnBounds::default());
        let report = levels.populate(PopulationContext::ready(&ground)).expect("pending pass");
        assert_eq!(report.seed, expected_seed);
        assert_eq!(levels.state(), LevelState::Ready);
        assert_eq!(levels.pending_seed(), None);
    }

    #[test]
    fn populate_without_pending_pass_is_rejected() {
        let mut levels = manager();
        assert_eq!(
            levels.populate(PopulationContext::not_ready()),
            Err(TransitionError::NothingToPopulate { state: LevelState::Unloaded })
        );

        levels.load_level(5);
        assert_eq!(
            levels.populate(PopulationContext::not_ready()),
            Err(TransitionError::NothingToPopulate { state: LevelState::Ready })
        );
    }

    #[test]
    fn unready_world_keeps_population_pending() {
        let mut levels = manager();
        levels.load_level_with_seed(2, 99);

        let report = levels.populate(PopulationContext::not_ready()).expect("pending pass");
        assert_eq!(report.outcome, PopulationOutcome::WorldNotReady);
        assert_eq!(levels.state(), LevelState::Instantiating);
        assert_eq!(levels.pending_seed(), Some(99));

        let ground = FlatGround::new(0.0, SpawnBounds::default());
        let report = levels.populate(PopulationContext::ready(&ground)).expect("still pending");
        assert_eq!(report.seed, 99);
        assert_eq!(report.placed(), 10);
    }

    #[test]
    fn instance_ids_are_never_reused() {
        let mut levels = manager();
        levels.load_level(1);
        let first = levels.current_instance().map(LevelInstance::id);
        levels.load_level(1);
        let second = levels.current_instance().map(LevelInstance::id);
        assert_ne!(first, second);
    }

    #[test]
    fn loaded_event_fires_before_population() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let mut levels = manager();
        levels.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        levels.load_level(8);

        assert_eq!(
            *events.borrow(),
            vec![LevelEvent::LevelLoaded {
                index: 8,
                topology: Topology::boss_1(),
                spawn_point: Some(Vec3::new(0.0, 1.0, 0.0)),
            }]
        );
    }

    #[test]
    fn unload_clears_the_slot() {
        let mut levels = manager();
        levels.load_level(3);
        levels.unload();
        assert_eq!(levels.state(), LevelState::Unloaded);
        assert!(levels.current_instance().is_none());
        assert_eq!(levels.pending_seed(), None);
        assert!(levels.last_seed().is_some());
    }

    #[test]
    fn retry_after_unload_replays_the_recorded_seed() {
        let mut levels = manager();
        levels.load_level_with_seed(3, 42);
        levels.unload();

        assert_eq!(levels.retry_current_level(), LevelState::Instantiating);
        assert_eq!(levels.pending_seed(), Some(42));
        assert_eq!(levels.current_topology(), Some(&Topology::Procedural));
    }

    #[test]
    fn seed_of_an_unpopulated_level_still_becomes_the_last_seed() {
        let mut levels = manager();
        levels.load_level_with_seed(2, 7);
        levels.load_level_with_seed(3, 8);
        levels.unload();
        assert_eq!(levels.last_seed(), Some(8));
    }

    #[test]
    fn listeners_can_be_removed() {
        let mut levels = manager();
        let id = levels.subscribe(|_| {});
        assert_eq!(levels.listener_count(), 1);
        assert!(levels.unsubscribe(id));
        assert_eq!(levels.listener_count(), 0);
    }

    #[test]
    fn next_level_saturates_at_the_top_index() {
        let mut levels = manager();
        levels.load_level(LevelIndex::MAX);
        levels.load_next_level();
        assert_eq!(levels.current_index(), LevelIndex::MAX);
    }
}
