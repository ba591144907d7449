use crate::error::ConfigError;
use crate::models::settings::Settings;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};

/// Key-value persistence for the settings blob
pub trait SettingsStore: Send + Sync {
    /// Stored settings merged over defaults; defaults when nothing is stored
    fn load(&self) -> Result<Settings, ConfigError>;

    fn save(&self, settings: &Settings) -> Result<(), ConfigError>;
}

/// JSON file store under the platform config directory
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager instance
    ///
    /// This will create the config directory if it doesn't exist.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("vision-lens");

        fs::create_dir_all(&config_dir)?;

        Ok(Self::in_dir(config_dir))
    }

    /// Store rooted at an explicit directory (created lazily on save)
    pub fn in_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let config_path = config_dir.join("settings.json");
        Self {
            config_dir,
            config_path,
        }
    }

    /// Get the settings file path
    pub fn config_file_path(&self) -> &Path {
        &self.config_path
    }

    /// Check if settings file exists
    pub fn config_exists(&self) -> bool {
        self.config_path.exists()
    }
}

impl SettingsStore for ConfigManager {
    fn load(&self) -> Result<Settings, ConfigError> {
        if !self.config_exists() {
            tracing::debug!(path = %self.config_path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.config_path)?;
        let settings: Settings = serde_json::from_str(&content)?;

        tracing::info!(provider = settings.provider.as_str(), "settings loaded");
        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        fs::create_dir_all(&self.config_dir)?;

        // Pretty print for human readability
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, json)?;

        tracing::info!(provider = settings.provider.as_str(), "settings saved");
        Ok(())
    }
}

/// In-memory store for tests and embedders without a filesystem
#[derive(Default)]
pub struct MemorySettingsStore {
    stored: Mutex<Option<String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw JSON blob, as if written by an older version
    pub fn with_raw(json: impl Into<String>) -> Self {
        Self {
            stored: Mutex::new(Some(json.into())),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings, ConfigError> {
        match self.stored.lock().as_deref() {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Settings::default()),
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        let json = serde_json::to_string(settings)?;
        *self.stored.lock() = Some(json);
        Ok(())
    }
}
