//! User configuration (`config.toml`).

use directories::ProjectDirs;
use gridfill_core::model::{MIN_COLS, MIN_ROWS};
use gridfill_core::session::DEFAULT_STORAGE_KEY;
use gridfill_core::storage::DEFAULT_QUOTA_BYTES;
use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB
pub const DEFAULT_COL_WIDTH: usize = 10;
pub const MIN_COL_WIDTH: usize = 4;
pub const MAX_COL_WIDTH: usize = 50;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    storage_dir: Option<PathBuf>,
    storage_key: Option<String>,
    storage_quota_bytes: Option<usize>,
    min_rows: Option<usize>,
    min_cols: Option<usize>,
    col_width: Option<usize>,
    log_level: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// `None` means the platform data directory.
    pub storage_dir: Option<PathBuf>,
    pub storage_key: String,
    /// `None` disables the quota (`storage_quota_bytes = 0`).
    pub storage_quota: Option<usize>,
    pub min_rows: usize,
    pub min_cols: usize,
    pub col_width: usize,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_dir: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_quota: Some(DEFAULT_QUOTA_BYTES),
            min_rows: MIN_ROWS,
            min_cols: MIN_COLS,
            col_width: DEFAULT_COL_WIDTH,
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    /// Directory holding the stored grid and the log file.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.storage_dir
            .clone()
            .or_else(|| project_dirs().map(|p| p.data_dir().to_path_buf()))
    }

    fn apply(&mut self, file: ConfigFile, warnings: &mut Vec<String>) {
        if let Some(dir) = file.storage_dir {
            self.storage_dir = Some(dir);
        }
        if let Some(key) = file.storage_key {
            self.storage_key = key;
        }
        if let Some(quota) = file.storage_quota_bytes {
            self.storage_quota = (quota > 0).then_some(quota);
        }
        if let Some(rows) = file.min_rows {
            self.min_rows = rows.max(1);
        }
        if let Some(cols) = file.min_cols {
            self.min_cols = cols.max(1);
        }
        if let Some(width) = file.col_width {
            self.col_width = width.clamp(MIN_COL_WIDTH, MAX_COL_WIDTH);
        }
        if let Some(level) = file.log_level {
            match LevelFilter::from_str(level.trim()) {
                Ok(level) => self.log_level = level,
                Err(_) => warnings.push(format!("Unknown log_level '{}', using 'info'", level)),
            }
        }
    }
}

/// Load configuration from `path`, or from the user config file when no
/// path is given. Problems are returned as warnings and defaults are used.
pub fn load_config(path: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let mut config = Config::default();
    let explicit = path.is_some();
    let Some(path) = path.map(Path::to_path_buf).or_else(user_config_path) else {
        return (config, warnings);
    };

    if !path.exists() {
        if explicit {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (config, warnings);
    }

    match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
        }
        Ok(_) => match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<ConfigFile>(&content) {
                Ok(file) => config.apply(file, &mut warnings),
                Err(err) => warnings.push(format!("Failed to parse {}: {}", path.display(), err)),
            },
            Err(err) => warnings.push(format!("Failed to read {}: {}", path.display(), err)),
        },
        Err(err) => warnings.push(format!(
            "Failed to read metadata for {}: {}",
            path.display(),
            err
        )),
    }

    (config, warnings)
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "gridfill")
}

fn user_config_path() -> Option<PathBuf> {
    let mut path = project_dirs()?.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
