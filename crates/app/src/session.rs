//! Play-session flow around the level manager.
//! This module exists to own the player-facing loop: start, death, retry, new level.
//! It does not own topology rules, seed bookkeeping, or placement.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec3;
use level_core::{
    GenerationSeed, LevelEvent, LevelInstance, LevelManager, LevelState, PopulationContext,
    PopulationReport, SpatialQuery, TransitionError,
};
use tracing::info;

pub const STARTING_LEVEL_INDEX: i32 = 1;
pub const FULL_HEALTH: u32 = 100;
pub const FULL_MANA: u32 = 100;

/// Shown on death; carries the seed so the run can be shared or replayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeathPrompt {
    pub seed: Option<GenerationSeed>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionMode {
    #[default]
    Playing,
    Dead(DeathPrompt),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerVitals {
    pub health: u32,
    pub mana: u32,
}

impl Default for PlayerVitals {
    fn default() -> Self {
        Self { health: FULL_HEALTH, mana: FULL_MANA }
    }
}

pub struct Session {
    levels: LevelManager,
    player_position: Rc<Cell<Vec3>>,
    vitals: PlayerVitals,
    mode: SessionMode,
}

impl Session {
    /// Wraps `levels` and moves the player to each loaded level's spawn point.
    pub fn new(mut levels: LevelManager, player_position: Vec3) -> Self {
        let player_position = Rc::new(Cell::new(player_position));
        let relocated = Rc::clone(&player_position);
        levels.subscribe(move |event| {
            if let LevelEvent::LevelLoaded { index, spawn_point, .. } = event {
                if let Some(spawn) = spawn_point {
                    relocated.set(*spawn);
                }
                info!(index, "level {index} loaded");
            }
        });
        Self {
            levels,
            player_position,
            vitals: PlayerVitals::default(),
            mode: SessionMode::Playing,
        }
    }

    pub fn start_new_level(&mut self) -> LevelState {
        let state = self.levels.load_level(STARTING_LEVEL_INDEX);
        info!(seed = ?self.levels.last_seed(), "new level started");
        self.reset_player();
        state
    }

    pub fn start_with_seed(&mut self, seed: GenerationSeed) -> LevelState {
        let state = self.levels.load_level_with_seed(STARTING_LEVEL_INDEX, seed);
        info!(seed, "level started from a chosen seed");
        self.reset_player();
        state
    }

    /// Runs the pending population pass, facing encounters toward the player.
    pub fn populate(
        &mut self,
        space: &dyn SpatialQuery,
    ) -> Result<PopulationReport, TransitionError> {
        let context = PopulationContext::ready(space).with_player(self.player_position.get());
        self.levels.populate(context)
    }

    /// Like [`Self::populate`], but a level with nothing pending yields `None`.
    /// Fixed levels and procedural levels without a generator land here.
    pub fn populate_if_pending(
        &mut self,
        space: &dyn SpatialQuery,
    ) -> Result<Option<PopulationReport>, TransitionError> {
        if self.levels.state() != LevelState::Instantiating {
            return Ok(None);
        }
        self.populate(space).map(Some)
    }

    pub fn player_died(&mut self) -> DeathPrompt {
        let prompt = DeathPrompt { seed: self.levels.last_seed() };
        self.vitals.health = 0;
        self.mode = SessionMode::Dead(prompt);
        prompt
    }

    pub fn retry(&mut self) -> LevelState {
        let state = self.levels.retry_current_level();
        self.reset_player();
        state
    }

    pub fn new_level(&mut self) -> LevelState {
        self.start_new_level()
    }

    pub fn advance_to_next_level(&mut self) -> LevelState {
        self.levels.load_next_level()
    }

    pub fn levels(&self) -> &LevelManager {
        &self.levels
    }

    pub fn player_position(&self) -> Vec3 {
        self.player_position.get()
    }

    pub fn vitals(&self) -> PlayerVitals {
        self.vitals
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    fn reset_player(&mut self) {
        let spawn = self.levels.current_instance().and_then(LevelInstance::spawn_point);
        if let Some(spawn) = spawn {
            self.player_position.set(spawn);
        }
        self.vitals = PlayerVitals::default();
        self.mode = SessionMode::Playing;
    }
}
