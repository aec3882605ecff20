use glam::{Vec2, Vec3};
use level_app::session::{DeathPrompt, FULL_HEALTH, Session, SessionMode};
use level_core::{
    CounterSeedSource, FixedLevelEntry, FlatGround, LevelManager, LevelSettings, LevelState,
    SpawnBounds, Topology,
};

fn settings() -> LevelSettings {
    let mut settings = LevelSettings::default();
    settings.procedural_spawn_point = Some(Vec3::new(2.0, 1.0, -3.0));
    settings.fixed_levels.push(FixedLevelEntry {
        index: 2,
        scene: "Vault".to_string(),
        spawn_point: Some(Vec3::new(9.0, 0.0, 9.0)),
    });
    settings
}

fn session() -> Session {
    let levels = LevelManager::from_settings(&settings(), CounterSeedSource::new(404));
    Session::new(levels, Vec3::new(100.0, 0.0, 100.0))
}

fn ground() -> FlatGround {
    FlatGround::new(0.0, SpawnBounds::new(Vec2::splat(-60.0), Vec2::splat(60.0)))
}

#[test]
fn test_new_level_moves_player_to_spawn_and_populates() {
    let mut session = session();

    assert_eq!(session.start_new_level(), LevelState::Instantiating);
    assert_eq!(session.player_position(), Vec3::new(2.0, 1.0, -3.0));

    let report = session.populate(&ground()).expect("population pending");
    assert_eq!(report.placed(), 10);
    assert_eq!(session.levels().current_index(), 1);
}

#[test]
fn test_death_prompt_reports_seed_and_retry_replays_it() {
    let mut session = session();
    let ground = ground();
    session.start_new_level();
    let first = session.populate(&ground).expect("population pending");

    let prompt = session.player_died();
    assert_eq!(prompt, DeathPrompt { seed: Some(first.seed) });
    assert_eq!(session.mode(), SessionMode::Dead(prompt));
    assert_eq!(session.vitals().health, 0);

    session.retry();
    let replay = session.populate(&ground).expect("population pending");

    assert_eq!(first, replay);
    assert_eq!(session.mode(), SessionMode::Playing);
    assert_eq!(session.vitals().health, FULL_HEALTH);
}

#[test]
fn test_new_level_after_death_draws_a_different_seed() {
    let mut session = session();
    let ground = ground();
    session.start_new_level();
    let first = session.populate(&ground).expect("population pending");

    session.player_died();
    session.new_level();
    let second = session.populate(&ground).expect("population pending");

    assert_ne!(first.seed, second.seed);
    assert_eq!(session.levels().current_index(), 1);
}

#[test]
fn test_chosen_seed_is_reproduced_by_a_second_session() {
    let ground = ground();
    let mut left = session();
    let mut right = session();

    left.start_with_seed(42);
    right.start_with_seed(42);

    let left_report = left.populate(&ground).expect("population pending");
    let right_report = right.populate(&ground).expect("population pending");
    assert_eq!(left_report.fingerprint(), right_report.fingerprint());
}

#[test]
fn test_advancing_into_a_fixed_level_relocates_without_population() {
    let mut session = session();
    session.start_new_level();
    session.populate(&ground()).expect("population pending");

    assert_eq!(session.advance_to_next_level(), LevelState::Ready);

    assert_eq!(session.levels().current_topology(), Some(&Topology::Fixed("Vault".to_string())));
    assert_eq!(session.player_position(), Vec3::new(9.0, 0.0, 9.0));
    assert!(session.populate(&ground()).is_err());
}

#[test]
fn test_encounters_face_the_player_at_spawn() {
    let mut session = session();
    session.start_new_level();
    let report = session.populate(&ground()).expect("population pending");
    let player = session.player_position();
    let jitter = LevelSettings::default().generator.yaw_jitter;

    for entity in &report.placements {
        let toward = Vec3::new(player.x - entity.position.x, 0.0, player.z - entity.position.z);
        if toward.length_squared() == 0.0 {
            continue;
        }
        let cos = entity.forward().dot(toward.normalize());
        assert!(cos >= jitter.cos() - 1e-4, "entity should roughly face the player");
    }
}

#[test]
fn test_fixed_starting_level_has_nothing_to_populate() {
    let mut settings = LevelSettings::default();
    settings.fixed_levels = vec![FixedLevelEntry {
        index: 1,
        scene: "Arena".to_string(),
        spawn_point: Some(Vec3::new(0.0, 2.0, 0.0)),
    }];
    let levels = LevelManager::from_settings(&settings, CounterSeedSource::new(404));
    let mut session = Session::new(levels, Vec3::ZERO);
    let ground = ground();

    assert_eq!(session.start_new_level(), LevelState::Ready);
    assert_eq!(session.populate_if_pending(&ground), Ok(None));
    assert_eq!(session.player_position(), Vec3::new(0.0, 2.0, 0.0));

    session.player_died();
    assert_eq!(session.retry(), LevelState::Ready);
    assert_eq!(session.populate_if_pending(&ground), Ok(None));
    assert_eq!(session.levels().current_topology(), Some(&Topology::Fixed("Arena".to_string())));
}

#[test]
fn test_populate_if_pending_runs_a_procedural_pass() {
    let mut session = session();
    session.start_with_seed(31);

    let report = session.populate_if_pending(&ground()).expect("pass should run");
    assert_eq!(report.map(|report| report.seed), Some(31));
    assert_eq!(session.populate_if_pending(&ground()), Ok(None));
}
