//! Level settings stored as TOML next to the other app data.

use directories::ProjectDirs;
use level_core::LevelSettings;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::APP_NAME;

pub fn get_default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| {
        let mut path = proj_dirs.config_dir().to_path_buf();
        path.push("levels.toml");
        path
    })
}

pub fn load(path: &Path) -> io::Result<LevelSettings> {
    let content = fs::read_to_string(path)?;
    LevelSettings::from_toml_str(&content)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Missing files fall back to the built-in settings; unreadable or invalid ones are errors.
pub fn load_or_default(path: Option<&Path>) -> io::Result<LevelSettings> {
    let Some(path) = path else {
        return Ok(LevelSettings::default());
    };
    match load(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(LevelSettings::default()),
        other => other,
    }
}

pub fn write_atomic(settings: &LevelSettings, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    let raw = toml::to_string_pretty(settings).map_err(io::Error::other)?;
    fs::write(&tmp_path, raw)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
