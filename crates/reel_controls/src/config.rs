//! Controller configuration

use crate::ControlsError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for the playback controls
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Speeds offered as buttons; the first one is the initial speed
    #[serde(default = "default_speed_options")]
    pub speed_options: Vec<f64>,
    /// Start playing as soon as the controls mount
    #[serde(default = "default_true")]
    pub auto_play: bool,
    /// Initial state of the skip-inactive switch
    #[serde(default = "default_true")]
    pub skip_inactive: bool,
    /// Whether the host should draw the controls at all
    #[serde(default = "default_true")]
    pub show_controller: bool,
    /// Marker color per custom-event tag
    #[serde(default)]
    pub tags: FxHashMap<String, String>,
}

fn default_speed_options() -> Vec<f64> {
    vec![1.0, 2.0, 4.0, 8.0]
}

fn default_true() -> bool {
    true
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            speed_options: default_speed_options(),
            auto_play: true,
            skip_inactive: true,
            show_controller: true,
            tags: FxHashMap::default(),
        }
    }
}

impl ControllerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ControlsError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ControlsError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Speed the controls start at
    pub fn initial_speed(&self) -> f64 {
        self.speed_options.first().copied().unwrap_or(1.0)
    }

    pub fn with_auto_play(mut self, auto_play: bool) -> Self {
        self.auto_play = auto_play;
        self
    }

    pub fn with_skip_inactive(mut self, skip_inactive: bool) -> Self {
        self.skip_inactive = skip_inactive;
        self
    }

    pub fn with_speed_options(mut self, speed_options: Vec<f64>) -> Self {
        self.speed_options = speed_options;
        self
    }

    /// Color markers for `tag` with `color`
    pub fn with_tag(mut self, tag: impl Into<String>, color: impl Into<String>) -> Self {
        self.tags.insert(tag.into(), color.into());
        self
    }
}
