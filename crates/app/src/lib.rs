pub mod last_run_file;
pub mod seed;
pub mod session;
pub mod settings_file;

pub const APP_NAME: &str = "Levelwright";

/// Format a seed as an exact decimal string with no prefix or suffix.
pub fn format_seed(seed: u64) -> String {
    seed.to_string()
}
