use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use level_core::{GenerationSeed, SeedSource, mix_seed};

static GENERATED_SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn generate_runtime_seed() -> GenerationSeed {
    let now_nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0_u128, |duration| duration.as_nanos());
    let pid = u64::from(std::process::id());
    let counter = GENERATED_SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let entropy = (now_nanos as u64)
        ^ ((now_nanos >> 64) as u64)
        ^ pid.rotate_left(17)
        ^ counter.rotate_left(7);

    mix_seed(entropy)
}

/// Fresh seeds from clock, process id and a process-wide counter. Not reproducible across runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuntimeSeedSource;

impl SeedSource for RuntimeSeedSource {
    fn next_seed(&mut self) -> GenerationSeed {
        generate_runtime_seed()
    }
}

/// Reads `--seed <n>` or `--seed=<n>`; `None` means the session should draw a fresh seed.
pub fn resolve_seed_from_args(args: &[String]) -> Result<Option<GenerationSeed>, String> {
    let mut selected_seed = None;
    let mut index = 1usize;

    while index < args.len() {
        let argument = args[index].as_str();

        if argument == "--seed" {
            let Some(value) = args.get(index + 1) else {
                return Err("missing value for --seed".to_string());
            };
            if selected_seed.is_some() {
                return Err("seed provided more than once".to_string());
            }
            selected_seed = Some(parse_seed_value(value)?);
            index += 2;
            continue;
        }

        if let Some(value) = argument.strip_prefix("--seed=") {
            if selected_seed.is_some() {
                return Err("seed provided more than once".to_string());
            }
            selected_seed = Some(parse_seed_value(value)?);
        }
        index += 1;
    }

    Ok(selected_seed)
}

fn parse_seed_value(raw_value: &str) -> Result<GenerationSeed, String> {
    raw_value.parse::<u64>().map_err(|_| format!("seed value '{raw_value}' must be a number"))
}
