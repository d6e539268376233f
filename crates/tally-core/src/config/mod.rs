use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL, DEFAULT_MAX_ITERATIONS};
use crate::error::{CoreError, CoreResult};


#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub recurrence: RecurrenceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceConfig {
    /// Cap on stepping iterations for one expansion call.
    pub max_iterations: u32,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional
    /// `config.toml` into a `Settings`.
    ///
    /// Environment variables use the `TALLY_` prefix and `__` between nested
    /// keys, e.g. `TALLY_RECURRENCE__MAX_ITERATIONS`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it, or
    /// validating it fails.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("recurrence.max_iterations", DEFAULT_MAX_ITERATIONS)?
            .set_default("logging.level", DEFAULT_LOG_LEVEL)?
            .add_source(
                config::Environment::with_prefix("TALLY")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .add_source(config::File::with_name(CONFIG_FILE_NAME).required(false))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        tracing::debug!(settings = ?settings, "Settings loaded");
        Ok(settings)
    }

    /// ## Summary
    /// Checks values that deserialize fine but cannot be used.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if the iteration cap is zero or the log
    /// level is blank.
    pub fn validate(&self) -> CoreResult<()> {
        if self.recurrence.max_iterations == 0 {
            return Err(CoreError::ConfigError(
                "recurrence.max_iterations must be positive".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(CoreError::ConfigError(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
