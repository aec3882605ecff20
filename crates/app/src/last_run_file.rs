use directories::ProjectDirs;
use level_core::{LevelIndex, PopulationReport, Topology, format_fingerprint};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::APP_NAME;

pub const LAST_RUN_FORMAT_VERSION: u32 = 1;

/// Seed and outcome of the most recent populated level, kept for reproducing a run by hand.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LastRunFile {
    pub format_version: u32,
    pub level_index: LevelIndex,
    pub topology: String,
    pub seed: u64,
    pub placed: u32,
    pub target: u32,
    pub fingerprint_hex: String,
    pub updated_at_unix_ms: u64,
}

impl LastRunFile {
    pub fn from_report(
        level_index: LevelIndex,
        topology: &Topology,
        report: &PopulationReport,
        updated_at_unix_ms: u64,
    ) -> Self {
        Self {
            format_version: LAST_RUN_FORMAT_VERSION,
            level_index,
            topology: topology.label().to_string(),
            seed: report.seed,
            placed: report.placed(),
            target: report.target,
            fingerprint_hex: format_fingerprint(report.fingerprint()),
            updated_at_unix_ms,
        }
    }

    pub fn get_default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| {
            let mut path = proj_dirs.data_dir().to_path_buf();
            path.push("last_run.json");
            path
        })
    }

    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;

        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let state: Self = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(state)
    }
}
