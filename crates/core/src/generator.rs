//! Seeded encounter placement for one level instance.
//! This module exists to own the bounded-attempt spawn loop and the entities it places.
//! It does not own level lifecycle, seed bookkeeping across instances, or retries.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use slotmap::SlotMap;
use tracing::{debug, error, info, trace, warn};

use crate::config::GeneratorSettings;
use crate::seed::{SeedSource, SeededRandomSource};
use crate::spatial::{GroundProbe, SpatialQuery, SpawnCandidate};
use crate::types::{EntityId, GenerationSeed};

/// Encounter entity bound to a validated ground point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedEntity {
    /// Zero-based attempt that produced this placement.
    pub attempt: u32,
    pub position: Vec3,
    /// Rotation about +Y in radians; yaw 0 faces -Z.
    pub yaw: f32,
    pub speed: u32,
}

impl PlacedEntity {
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub fn velocity(&self) -> Vec3 {
        self.forward() * self.speed as f32
    }
}

/// What the caller can see about the world when a pass runs.
#[derive(Clone, Copy, Default)]
pub struct PopulationContext<'a> {
    /// `None` while the host's collision world is not ready for queries.
    pub space: Option<&'a dyn SpatialQuery>,
    pub player_position: Option<Vec3>,
}

impl<'a> PopulationContext<'a> {
    pub fn ready(space: &'a dyn SpatialQuery) -> Self {
        Self { space: Some(space), player_position: None }
    }

    pub fn not_ready() -> Self {
        Self::default()
    }

    pub fn with_player(mut self, position: Vec3) -> Self {
        self.player_position = Some(position);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopulationOutcome {
    Complete,
    /// Attempts ran out before the target was reached.
    Shortfall { missing: u32 },
    /// The spatial-query surface was unavailable; nothing was placed.
    WorldNotReady,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PopulationReport {
    pub seed: GenerationSeed,
    pub target: u32,
    pub attempts: u32,
    pub max_attempts: u32,
    pub placements: Vec<PlacedEntity>,
    pub outcome: PopulationOutcome,
}

impl PopulationReport {
    pub fn placed(&self) -> u32 {
        self.placements.len() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.outcome == PopulationOutcome::Complete
    }
}

#[derive(Debug)]
pub struct LevelGenerator {
    settings: GeneratorSettings,
    stream: SeededRandomSource,
    entities: SlotMap<EntityId, PlacedEntity>,
}

impl LevelGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings, stream: SeededRandomSource::new(0), entities: SlotMap::with_key() }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn current_seed(&self) -> GenerationSeed {
        self.stream.seed()
    }

    pub fn entities(&self) -> &SlotMap<EntityId, PlacedEntity> {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Removes every entity this generator placed; returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entities.len();
        self.entities.clear();
        removed
    }

    pub fn generate_level(
        &mut self,
        seeds: &mut dyn SeedSource,
        context: PopulationContext<'_>,
    ) -> PopulationReport {
        let seed = seeds.next_seed();
        self.generate_level_with_seed(seed, context)
    }

    pub fn generate_level_with_seed(
        &mut self,
        seed: GenerationSeed,
        context: PopulationContext<'_>,
    ) -> PopulationReport {
        self.stream.reseed(seed);
        let cleared = self.clear();
        info!(seed, cleared, "level generated with seed {seed}");
        self.spawn_encounters(context)
    }

    fn spawn_encounters(&mut self, context: PopulationContext<'_>) -> PopulationReport {
        let seed = self.stream.seed();
        let target = self.settings.target_count;
        let max_attempts = self.settings.max_attempts();

        let Some(space) = context.space else {
            error!(seed, "spatial query surface is not ready; population pass aborted");
            return PopulationReport {
                seed,
                target,
                attempts: 0,
                max_attempts,
                placements: Vec::new(),
                outcome: PopulationOutcome::WorldNotReady,
            };
        };

        let probe = GroundProbe::new(
            space,
            self.settings.probe_height,
            self.settings.collision_mask,
        );
        let look_target = context.player_position.unwrap_or(Vec3::ZERO);
        let mut placements = Vec::with_capacity(target as usize);
        let mut attempts = 0;

        while (placements.len() as u32) < target && attempts < max_attempts {
            let attempt = attempts;
            attempts += 1;

            let candidate = self.draw_candidate();
            let Some(ground) = probe.probe(candidate) else {
                trace!(attempt, x = candidate.x, z = candidate.z, "probe missed");
                continue;
            };

            let entity = self.orient_entity(attempt, ground, look_target);
            let id = self.entities.insert(entity);
            debug!(?id, attempt, position = %ground, yaw = entity.yaw, "encounter placed");
            placements.push(entity);
        }

        let placed = placements.len() as u32;
        info!(seed, placed, target, attempts, "spawned {placed}/{target} encounters");
        let outcome = if placed < target {
            warn!(seed, placed, target, attempts, "only spawned {placed}/{target} encounters");
            PopulationOutcome::Shortfall { missing: target - placed }
        } else {
            PopulationOutcome::Complete
        };

        PopulationReport { seed, target, attempts, max_attempts, placements, outcome }
    }

    fn draw_candidate(&mut self) -> SpawnCandidate {
        let bounds = self.settings.spawn_bounds;
        let x = self.stream.range_f32(bounds.min.x, bounds.max.x);
        let z = self.stream.range_f32(bounds.min.y, bounds.max.y);
        SpawnCandidate { x, z }
    }

    fn orient_entity(&mut self, attempt: u32, position: Vec3, look_target: Vec3) -> PlacedEntity {
        let jitter = self.settings.yaw_jitter;
        let offset = self.stream.range_f32(-jitter, jitter);
        let yaw = wrap_angle(facing_yaw(position, look_target) + offset);
        let speed =
            self.stream.range_u32_inclusive(self.settings.min_speed, self.settings.max_speed);
        PlacedEntity { attempt, position, yaw, speed }
    }
}

/// Yaw that turns the -Z forward axis toward `target` in the horizontal plane.
pub fn facing_yaw(from: Vec3, target: Vec3) -> f32 {
    let dx = target.x - from.x;
    let dz = target.z - from.z;
    if dx == 0.0 && dz == 0.0 {
        return 0.0;
    }
    (-dx).atan2(-dz)
}

/// Normalizes an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}
