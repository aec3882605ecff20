use anyhow::{Result, anyhow};
use clap::Parser;
use glam::Vec2;
use level_core::{
    GeneratorSettings, Heightfield, LevelGenerator, PopulationContext, PopulationOutcome,
    SpawnBounds,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 500)]
    cases: u32,
}

struct CaseSummary {
    placed: u32,
    shortfall: bool,
}

fn unit(rng: &mut ChaCha8Rng) -> f32 {
    (rng.next_u32() >> 8) as f32 / (1_u32 << 24) as f32
}

fn random_settings(rng: &mut ChaCha8Rng) -> GeneratorSettings {
    let half = Vec2::new(5.0 + unit(rng) * 60.0, 5.0 + unit(rng) * 60.0);
    let center = Vec2::new(unit(rng) * 40.0 - 20.0, unit(rng) * 40.0 - 20.0);
    let min_speed = rng.next_u32() % 20;
    GeneratorSettings {
        target_count: rng.next_u32() % 30,
        attempt_multiplier: 1 + rng.next_u32() % 4,
        spawn_bounds: SpawnBounds::new(center - half, center + half),
        yaw_jitter: unit(rng) * 1.5,
        min_speed,
        max_speed: min_speed + rng.next_u32() % 10,
        ..GeneratorSettings::default()
    }
}

/// One generator run over a random arena, checked against the placement invariants.
fn check_case(case_seed: u64) -> Result<CaseSummary, String> {
    let mut rng = ChaCha8Rng::seed_from_u64(case_seed);
    let settings = random_settings(&mut rng);
    let coverage = unit(&mut rng);
    let cell_size = 1.0 + unit(&mut rng) * 9.0;
    let arena = Heightfield::patchy(settings.spawn_bounds, cell_size, coverage, rng.next_u64())
        .map_err(|err| format!("case {case_seed}: {err}"))?;
    let seed = rng.next_u64();
    let bounds = settings.spawn_bounds;

    let mut generator = LevelGenerator::new(settings.clone());
    let report = generator.generate_level_with_seed(seed, PopulationContext::ready(&arena));

    if report.attempts > settings.max_attempts() {
        return Err(format!("case {case_seed}: attempts {} over budget", report.attempts));
    }
    if report.placed() > settings.target_count {
        return Err(format!("case {case_seed}: placed more than the target"));
    }
    if generator.entity_count() != report.placements.len() {
        return Err(format!("case {case_seed}: generator and report disagree"));
    }
    for entity in &report.placements {
        let position = entity.position;
        if !bounds.contains(position.x, position.z) {
            return Err(format!("case {case_seed}: entity outside bounds at {position}"));
        }
        if arena.height_at(position.x, position.z) != Some(position.y) {
            return Err(format!("case {case_seed}: entity off the ground at {position}"));
        }
        if !(settings.min_speed..=settings.max_speed).contains(&entity.speed) {
            return Err(format!("case {case_seed}: speed {} out of range", entity.speed));
        }
    }

    let replay = generator.generate_level_with_seed(seed, PopulationContext::ready(&arena));
    if replay != report {
        return Err(format!("case {case_seed}: regenerating seed {seed} diverged"));
    }

    Ok(CaseSummary {
        placed: report.placed(),
        shortfall: matches!(report.outcome, PopulationOutcome::Shortfall { .. }),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting fuzz harness on seed {} for {} cases...", args.seed, args.cases);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut placed = 0_u64;
    let mut shortfalls = 0_u32;

    for _ in 0..args.cases {
        let summary = check_case(rng.next_u64()).map_err(|err| anyhow!(err))?;
        placed += u64::from(summary.placed);
        shortfalls += u32::from(summary.shortfall);
    }

    println!("Placed {placed} encounters; {shortfalls} cases fell short of their target.");
    println!("Fuzzing completed successfully.");
    Ok(())
}
