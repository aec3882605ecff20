pub mod config;
pub mod error;
pub mod fingerprint;
pub mod generator;
pub mod manager;
pub mod seed;
pub mod spatial;
pub mod terrain;
pub mod topology;
pub mod types;

pub use config::{FixedLevelEntry, GeneratorSettings, LevelSettings, SpawnBounds};
pub use error::{ConfigError, TransitionError};
pub use fingerprint::format_fingerprint;
pub use generator::{
    LevelGenerator, PlacedEntity, PopulationContext, PopulationOutcome, PopulationReport,
};
pub use manager::{
    ContentLibrary, LevelContent, LevelEvent, LevelInstance, LevelManager, ListenerId,
    SceneLibrary,
};
pub use seed::{CounterSeedSource, SeedSource, SeededRandomSource, mix_seed};
pub use spatial::{GroundProbe, SpatialQuery, SpawnCandidate};
pub use terrain::{EmptyWorld, FlatGround, Heightfield};
pub use topology::TopologyTable;
pub use types::*;
