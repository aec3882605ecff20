use anyhow::{Context, Result, bail};
use clap::Parser;
use level_core::{
    CounterSeedSource, Heightfield, LevelIndex, LevelManager, LevelSettings, PopulationContext,
    PopulationReport, format_fingerprint,
};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rebuild a procedural level from a seed, retry it, and print what was placed.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed to generate the level from
    #[arg(short, long)]
    seed: u64,
    /// Level index to load the seed into
    #[arg(short, long, default_value_t = 1)]
    level: LevelIndex,
    /// Fraction of arena cells that carry ground
    #[arg(short, long, default_value_t = 0.75)]
    coverage: f32,
    /// Seed for the arena's hole layout
    #[arg(long, default_value_t = 0x00A7_E2A0)]
    layout_seed: u64,
    /// Arena cell size in world units
    #[arg(long, default_value_t = 5.0)]
    cell_size: f32,
    /// Optional level settings TOML file
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PlacementRow {
    attempt: u32,
    position: [f32; 3],
    yaw: f32,
    speed: u32,
}

#[derive(Serialize)]
struct ReplaySummary {
    level: LevelIndex,
    seed: u64,
    target: u32,
    placed: u32,
    attempts: u32,
    max_attempts: u32,
    outcome: String,
    fingerprint: String,
    retry_matches: bool,
    placements: Vec<PlacementRow>,
}

impl ReplaySummary {
    fn new(level: LevelIndex, report: &PopulationReport, retry_matches: bool) -> Self {
        Self {
            level,
            seed: report.seed,
            target: report.target,
            placed: report.placed(),
            attempts: report.attempts,
            max_attempts: report.max_attempts,
            outcome: format!("{:?}", report.outcome),
            fingerprint: format_fingerprint(report.fingerprint()),
            retry_matches,
            placements: report
                .placements
                .iter()
                .map(|entity| PlacementRow {
                    attempt: entity.attempt,
                    position: entity.position.to_array(),
                    yaw: entity.yaw,
                    speed: entity.speed,
                })
                .collect(),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();

    let settings = match &args.settings {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
            LevelSettings::from_toml_str(&raw).context("Invalid level settings")?
        }
        None => LevelSettings::default(),
    };
    if !(0.0..=1.0).contains(&args.coverage) {
        bail!("coverage must be between 0 and 1, got {}", args.coverage);
    }
    let arena = Heightfield::patchy(
        settings.generator.spawn_bounds,
        args.cell_size,
        args.coverage,
        args.layout_seed,
    )
    .context("Invalid arena")?;
    let mut levels = LevelManager::from_settings(&settings, CounterSeedSource::new(args.seed));

    levels.load_level_with_seed(args.level, args.seed);
    let first = levels.populate(PopulationContext::ready(&arena)).context("First pass")?;
    levels.retry_current_level();
    let retry = levels.populate(PopulationContext::ready(&arena)).context("Retry pass")?;
    let retry_matches = first == retry;

    let summary = ReplaySummary::new(args.level, &first, retry_matches);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Level {} seed {}", summary.level, summary.seed);
        println!(
            "Placed {}/{} in {} of {} attempts ({})",
            summary.placed, summary.target, summary.attempts, summary.max_attempts, summary.outcome
        );
        println!("Fingerprint: {}", summary.fingerprint);
        for row in &summary.placements {
            let [x, y, z] = row.position;
            println!(
                "  #{:<3} ({x:8.3}, {y:7.3}, {z:8.3}) yaw {:7.4} speed {}",
                row.attempt, row.yaw, row.speed
            );
        }
        println!("Retry reproduces: {}", if retry_matches { "yes" } else { "NO" });
    }

    if !retry_matches {
        bail!(
            "retry diverged: {} vs {}",
            format_fingerprint(first.fingerprint()),
            format_fingerprint(retry.fingerprint())
        );
    }
    Ok(())
}
