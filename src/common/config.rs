use std::path::{Path, PathBuf};
use std::{fs, io};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use super::activator::{Activator, ActivatorParseError, Modifiers};
use crate::model::{Layer, Layers, Rect};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: OverviewSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverviewSettings {
    /// Key combination that toggles overview.
    pub activate: Activator,
    /// Where the workspace wall is painted and what gets damaged each frame.
    pub overlay_rect: Rect,
    pub damage: DamagePolicy,
    /// Layers whose windows get mirrored.
    pub layers: Vec<Layer>,
}

impl Default for OverviewSettings {
    fn default() -> Self {
        Self {
            activate: Activator::default(),
            overlay_rect: Rect::new(0, 0, 300, 600),
            damage: DamagePolicy::default(),
            layers: vec![Layer::Workspace, Layer::Fullscreen],
        }
    }
}

impl OverviewSettings {
    pub fn layers(&self) -> Layers { self.layers.iter().copied().collect() }
}

/// When the pre-frame hook damages the overlay rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DamagePolicy {
    /// Every frame while the overlay is active.
    #[default]
    Always,
    /// Only on frames that already have damage scheduled.
    WhenScheduled,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wf-overview").join("config.toml"))
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn read(path: &Path) -> Result<Config, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Config::default());
            }
            Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
        };
        Config::parse(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn parse(text: &str) -> Result<Config, toml::de::Error> { toml::from_str(text) }
}
