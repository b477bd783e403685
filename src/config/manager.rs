use super::{data::DataConfig, training::RunConfig, traits::ConfigSection};
use crate::error::GepError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::RwLock;

/// Prefix of environment overrides, e.g. `GEPREG_TRAINING__POPSIZE=200`.
pub const ENV_PREFIX: &str = "GEPREG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub training: RunConfig,
    pub data: DataConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), GepError> {
        self.training.validate()?;
        self.data.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: RwLock<AppConfig>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: RwLock::new(AppConfig::default()),
        }
    }

    /// Load a TOML or JSON file (by extension), apply environment overrides, validate.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), GepError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| GepError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| GepError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        log::debug!(
            "Loaded [{}] and [{}] from {}",
            RunConfig::section_name(),
            DataConfig::section_name(),
            path.as_ref().display()
        );

        *self.write_lock()? = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), GepError> {
        let config = self.get()?;
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| GepError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| GepError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> Result<AppConfig, GepError> {
        self.config
            .read()
            .map(|c| c.clone())
            .map_err(|_| GepError::Configuration("Config lock poisoned".to_string()))
    }

    /// Apply `f` and keep the result only if it still validates.
    pub fn update<F>(&self, f: F) -> Result<(), GepError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = self.write_lock()?;
        let mut candidate = guard.clone();
        f(&mut candidate);
        candidate.validate()?;
        *guard = candidate;
        Ok(())
    }

    fn write_lock(&self) -> Result<std::sync::RwLockWriteGuard<'_, AppConfig>, GepError> {
        self.config
            .write()
            .map_err(|_| GepError::Configuration("Config lock poisoned".to_string()))
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
