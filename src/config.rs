use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::{PROJECT_URL_STORAGE_KEY, SimulatedImporter};

const CONFIG_FILE_NAME: &str = "config.toml";
const STORAGE_FILE_NAME: &str = "storage.db";

/// Application settings loaded from `config.toml` in the platform config
/// directory. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Key the imported repository URL is stored under.
    pub storage_key: String,
    /// Storage file; defaults to `storage.db` in the platform data directory.
    pub storage_path: Option<PathBuf>,
    /// Pre-filled value of the import form.
    pub default_repo_url: String,
    /// Simulated import latency in milliseconds.
    pub import_delay_ms: u64,
    /// How long the success message is shown before switching views.
    pub confirmation_delay_ms: u64,
    /// Chance that a simulated import succeeds, between 0 and 1.
    pub success_probability: f64,
    /// How often to look for changes made by other windows.
    pub poll_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: PROJECT_URL_STORAGE_KEY.to_string(),
            storage_path: None,
            default_repo_url: "https://github.com/shadcn-ui/ui".to_string(),
            import_delay_ms: SimulatedImporter::DEFAULT_LATENCY.as_millis() as u64,
            confirmation_delay_ms: 1000,
            success_probability: SimulatedImporter::DEFAULT_SUCCESS_PROBABILITY,
            poll_interval_ms: 500,
        }
    }
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "repoimport")
}

/// Path of the default config file, if a config directory exists.
pub fn config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

impl AppConfig {
    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match config_path() {
                Some(path) if path.is_file() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {:?}", path))?;
        tracing::debug!(?path, "Loaded configuration");
        Ok(config)
    }

    /// Where the storage medium lives.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage_path.clone().or_else(|| {
            project_dirs().map(|dirs| dirs.data_dir().join(STORAGE_FILE_NAME))
        })
    }

    pub fn import_delay(&self) -> Duration {
        Duration::from_millis(self.import_delay_ms)
    }

    pub fn confirmation_delay(&self) -> Duration {
        Duration::from_millis(self.confirmation_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn importer(&self) -> SimulatedImporter {
        SimulatedImporter::new(self.import_delay(), self.success_probability)
    }
}
