use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{AppError, Config, ConfigError, ValidationResult};

/// Application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
    config_path: PathBuf,
    validation: ValidationResult,
}

impl App {
    /// Create a new application instance from the default config location
    pub fn new() -> Result<Self, AppError> {
        let path = Config::config_path()?;
        Self::with_config_path(&path)
    }

    /// Create a new application instance from the config file at `path`
    pub fn with_config_path(path: &Path) -> Result<Self, AppError> {
        let (config, validation) = Config::load_validated_from(path).map_err(classify)?;

        Ok(Self {
            config: Arc::new(config),
            config_path: path.to_path_buf(),
            validation,
        })
    }

    /// Log anything validation flagged. Call after logging is initialized.
    pub fn report_config_warnings(&self) {
        tracing::debug!("Loaded configuration from {}", self.config_path.display());
        for warning in &self.validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) {
        tracing::info!("Shutting down application");
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Surface typed config failures; everything else stays opaque.
fn classify(err: anyhow::Error) -> AppError {
    match err.downcast::<ConfigError>() {
        Ok(config_err) => AppError::Config(config_err),
        Err(other) => AppError::Other(other),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_app_loads_config_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[location]\nlatitude = 40.0\nlongitude = -75.0\n").unwrap();

        let app = App::with_config_path(&path).unwrap();

        assert_eq!(app.config().location.position(), Some((40.0, -75.0)));
        assert_eq!(app.config_path(), path.as_path());
        assert!(app.validation.warnings.is_empty());
    }

    #[test]
    fn test_invalid_config_maps_to_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[weather]\nuser_agent = \"\"\n").unwrap();

        let err = App::with_config_path(&path).err().unwrap();

        assert!(matches!(err, AppError::Config(ConfigError::Invalid(_))));
        assert_eq!(
            err.user_message(),
            "Invalid configuration. Check your settings."
        );
    }

    #[test]
    fn test_missing_config_is_written_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("localcast").join("config.toml");

        let app = App::with_config_path(&path).unwrap();

        assert!(path.exists());
        assert_eq!(app.config().weather.timeout_secs, 10);
        assert_eq!(app.config().location.position(), None);
    }

    #[test]
    fn test_unreadable_config_is_not_a_config_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = App::with_config_path(dir.path()).err().unwrap();

        assert!(matches!(err, AppError::Other(_)));
        assert_eq!(
            err.user_message(),
            "An unexpected error occurred. Please try again."
        );
    }
}
