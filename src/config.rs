//! Session configuration loaded from YAML.
//!
//! ```yaml
//! key: Eb            # or an integer offset in fifths, e.g. -3
//! bpm: 140
//! beats: 2
//! bgcolor: "#ffffff"
//! color: "#88ccee"
//! release-tail-ms: 100
//! velocity: 110
//! ```
//!
//! Every field is optional; missing fields take the defaults shown by
//! [`SessionConfig::default`].

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::error::ChordError;
use crate::keys::parse_key;
use crate::playback::DEFAULT_RELEASE_TAIL;
use crate::propagate::SessionDefaults;

pub const DEFAULT_BGCOLOR: &str = "#ffffff";
pub const DEFAULT_COLOR: &str = "#88ccee";
pub const DEFAULT_VELOCITY: u8 = 127;

/// Key as written in the file: a number or a label.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum RawKey {
    Offset(i64),
    Label(String),
}

/// Raw config for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    key: Option<RawKey>,
    bpm: Option<f64>,
    beats: Option<f64>,
    bgcolor: Option<String>,
    color: Option<String>,
    release_tail_ms: Option<u64>,
    velocity: Option<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub defaults: SessionDefaults,
    pub bgcolor: String,
    pub color: String,
    /// Extra time notes ring after their chord ends.
    pub release_tail: Duration,
    /// Note-on velocity for MIDI export.
    pub velocity: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            defaults: SessionDefaults::default(),
            bgcolor: DEFAULT_BGCOLOR.to_string(),
            color: DEFAULT_COLOR.to_string(),
            release_tail: DEFAULT_RELEASE_TAIL,
            velocity: DEFAULT_VELOCITY,
        }
    }
}

impl SessionConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ChordError> {
        // An empty document is a valid, all-defaults config
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ChordError::ConfigError(e.to_string()))?
        };

        let mut config = SessionConfig::default();

        if let Some(key) = raw.key {
            config.defaults.initial_key = match key {
                RawKey::Offset(n) => i8::try_from(n)
                    .map_err(|_| ChordError::ConfigError(format!("Invalid key: {}", n)))?,
                RawKey::Label(label) => parse_key(&label)
                    .ok_or_else(|| ChordError::ConfigError(format!("Invalid key: {}", label)))?,
            };
        }

        if let Some(bpm) = raw.bpm {
            if !(bpm > 0.0 && bpm <= u16::MAX as f64) {
                return Err(ChordError::ConfigError(format!("bpm must be greater than 0, got {}", bpm)));
            }
            config.defaults.initial_bpm = bpm.round().max(1.0) as u16;
        }

        if let Some(beats) = raw.beats {
            if !beats.is_finite() || beats < 0.0 {
                return Err(ChordError::ConfigError(format!("beats must not be negative, got {}", beats)));
            }
            config.defaults.default_beats = beats;
        }

        if let Some(bgcolor) = raw.bgcolor {
            config.bgcolor = bgcolor;
        }
        if let Some(color) = raw.color {
            config.color = color;
        }
        if let Some(ms) = raw.release_tail_ms {
            config.release_tail = Duration::from_millis(ms);
        }

        if let Some(velocity) = raw.velocity {
            config.velocity = u8::try_from(velocity)
                .ok()
                .filter(|v| *v <= 127)
                .ok_or_else(|| ChordError::ConfigError(format!("velocity must be at most 127, got {}", velocity)))?;
        }

        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ChordError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }
}
