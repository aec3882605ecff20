//! Stable population hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from the placement loop.
//! It does not own replay orchestration or persistence of fingerprints.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use crate::generator::{PopulationOutcome, PopulationReport};

impl PopulationReport {
    /// Hash of the seed, budget, outcome and every placement bit-for-bit.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u32(self.target);
        hasher.write_u32(self.attempts);
        hasher.write_u32(self.max_attempts);
        match self.outcome {
            PopulationOutcome::Complete => hasher.write_u8(0),
            PopulationOutcome::Shortfall { missing } => {
                hasher.write_u8(1);
                hasher.write_u32(missing);
            }
            PopulationOutcome::WorldNotReady => hasher.write_u8(2),
        }
        hasher.write_usize(self.placements.len());
        for entity in &self.placements {
            hasher.write_u32(entity.attempt);
            hasher.write_u32(entity.position.x.to_bits());
            hasher.write_u32(entity.position.y.to_bits());
            hasher.write_u32(entity.position.z.to_bits());
            hasher.write_u32(entity.yaw.to_bits());
            hasher.write_u32(entity.speed);
        }
        hasher.finish()
    }
}

pub fn format_fingerprint(fingerprint: u64) -> String {
    format!("0x{fingerprint:016x}")
}
