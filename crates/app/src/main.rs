use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use glam::Vec3;
use level_app::last_run_file::LastRunFile;
use level_app::seed::{RuntimeSeedSource, resolve_seed_from_args};
use level_app::session::Session;
use level_app::{format_seed, settings_file};
use level_core::{Heightfield, LevelManager, Topology, format_fingerprint};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const ARENA_CELL_SIZE: f32 = 5.0;
const ARENA_COVERAGE: f32 = 0.75;
const ARENA_LAYOUT_SEED: u64 = 0x00A7_E2A0;

fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let chosen_seed = resolve_seed_from_args(&args).map_err(|err| anyhow!(err))?;

    let settings_path = settings_file::get_default_path();
    let settings = settings_file::load_or_default(settings_path.as_deref())
        .with_context(|| format!("failed to load level settings from {settings_path:?}"))?;
    let arena = Heightfield::patchy(
        settings.generator.spawn_bounds,
        ARENA_CELL_SIZE,
        ARENA_COVERAGE,
        ARENA_LAYOUT_SEED,
    )?;

    let levels = LevelManager::from_settings(&settings, RuntimeSeedSource);
    let mut session = Session::new(levels, Vec3::ZERO);
    match chosen_seed {
        Some(seed) => session.start_with_seed(seed),
        None => session.start_new_level(),
    };
    let first = session.populate_if_pending(&arena).context("first population pass")?;

    let prompt = session.player_died();
    info!(seed = ?prompt.seed.map(format_seed), "player died; retrying");
    session.retry();
    let replay = session.populate_if_pending(&arena).context("retry population pass")?;
    if let (Some(first), Some(replay)) = (&first, &replay)
        && replay.fingerprint() != first.fingerprint()
    {
        warn!(
            first = %format_fingerprint(first.fingerprint()),
            replay = %format_fingerprint(replay.fingerprint()),
            "retry did not reproduce the level"
        );
    }

    let levels = session.levels();
    let Some(replay) = replay else {
        info!(index = levels.current_index(), "starting level is not procedural; no run to record");
        return Ok(());
    };
    let topology = levels.current_topology().cloned().unwrap_or(Topology::Procedural);
    let updated_at_unix_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis() as u64);
    let last_run =
        LastRunFile::from_report(levels.current_index(), &topology, &replay, updated_at_unix_ms);
    println!("{}", serde_json::to_string_pretty(&last_run)?);

    if let Some(path) = LastRunFile::get_default_path() {
        last_run
            .write_atomic(&path)
            .with_context(|| format!("failed to write last run to {}", path.display()))?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();
}
