//! reel.toml handling

use anyhow::{Context, Result};
use reel_controls::ControllerConfig;
use reel_recorder::replay::ReplayerConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Name of the config file picked up from the working directory
pub const CONFIG_FILE: &str = "reel.toml";

/// Top-level Reel configuration (reel.toml)
#[derive(Debug, Default, Deserialize)]
pub struct ReelConfig {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub replayer: ReplayerConfig,
}

impl ReelConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("No config found at {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: ReelConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Load `path` if given, otherwise `reel.toml` from the working
    /// directory when present, otherwise the defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).is_file() => Self::load(Path::new(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides for the initial speed and skip-inactive.
    pub fn override_with(&mut self, speed: Option<f64>, skip_inactive: Option<bool>) {
        if let Some(speed) = speed {
            let options = &mut self.controller.speed_options;
            options.retain(|option| *option != speed);
            options.insert(0, speed);
            self.replayer.speed = speed;
        }
        if let Some(skip_inactive) = skip_inactive {
            self.controller.skip_inactive = skip_inactive;
            self.replayer.skip_inactive = skip_inactive;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_are_optional() {
        let config: ReelConfig = toml::from_str("").unwrap();
        assert_eq!(config.controller, ControllerConfig::default());
        assert_eq!(config.replayer, ReplayerConfig::default());
    }

    #[test]
    fn parses_both_sections() {
        let config: ReelConfig = toml::from_str(
            r#"
            [controller]
            speed_options = [2.0, 4.0]
            auto_play = false

            [controller.tags]
            checkout = "red"

            [replayer]
            inactive_threshold_ms = 3000
            "#,
        )
        .unwrap();

        assert_eq!(config.controller.initial_speed(), 2.0);
        assert!(!config.controller.auto_play);
        assert_eq!(config.controller.tags["checkout"], "red");
        assert_eq!(config.replayer.inactive_threshold_ms, 3_000);
        assert_eq!(config.replayer.skip_interval_ms, 5_000);
    }

    #[test]
    fn overrides_put_speed_first() {
        let mut config = ReelConfig::default();
        config.override_with(Some(4.0), Some(false));

        assert_eq!(config.controller.speed_options, vec![4.0, 1.0, 2.0, 8.0]);
        assert_eq!(config.replayer.speed, 4.0);
        assert!(!config.controller.skip_inactive);
        assert!(!config.replayer.skip_inactive);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ReelConfig::load(Path::new("/nonexistent/reel.toml")).unwrap_err();
        assert!(err.to_string().contains("No config found"));
    }
}
