//! Trainer configuration, loadable from JSON.
//!
//! ```json
//! {
//!   "instrument": "guitar",
//!   "root_pitch": 45,
//!   "chord_kind": "triad",
//!   "volume_db": -6.0,
//!   "tone": { "duration": 0.8 }
//! }
//! ```
//!
//! Every field is optional; `{}` yields [`TrainerConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::synth::{ChordOptions, ToneOptions};
use crate::theory::{ChordKind, Pitch};
use crate::trainer::Instrument;

/// Lowest root the widget offers (E2 on the slider).
pub const MIN_ROOT_PITCH: Pitch = 40;
/// Highest root the widget offers (E4 on the slider).
pub const MAX_ROOT_PITCH: Pitch = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TrainerConfig {
    pub instrument: Instrument,
    pub root_pitch: Pitch,
    pub chord_kind: ChordKind,
    /// Output volume in decibels; 0 dB is unity gain.
    pub volume_db: f32,
    /// Build each degree's chord on its own scale step instead of on the root.
    pub transpose_to_degree: bool,
    /// Oldest playback is cut off once more than this many are sounding.
    pub max_live_playbacks: usize,
    /// Number of note buttons offered above the root.
    pub note_count: usize,
    pub tone: ToneOptions,
    pub chord: ChordOptions,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            instrument: Instrument::Piano,
            root_pitch: MIN_ROOT_PITCH,
            chord_kind: ChordKind::Seventh,
            volume_db: 0.0,
            transpose_to_degree: false,
            max_live_playbacks: 32,
            note_count: 24,
            tone: ToneOptions::default(),
            chord: ChordOptions::default(),
        }
    }
}

impl TrainerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_root(self.root_pitch)?;
        if !self.volume_db.is_finite() && self.volume_db != f32::NEG_INFINITY {
            return Err(ConfigError::InvalidOption {
                field: "volume_db",
                reason: format!("must be a number of decibels, got {}", self.volume_db),
            });
        }
        if self.max_live_playbacks == 0 {
            return Err(ConfigError::InvalidOption {
                field: "max_live_playbacks",
                reason: "must allow at least one playback".to_string(),
            });
        }
        self.tone.validate()?;
        self.chord.validate()?;
        Ok(())
    }
}

pub(crate) fn check_root(pitch: Pitch) -> Result<(), ConfigError> {
    if (MIN_ROOT_PITCH..=MAX_ROOT_PITCH).contains(&pitch) {
        Ok(())
    } else {
        Err(ConfigError::RootOutOfRange {
            pitch,
            min: MIN_ROOT_PITCH,
            max: MAX_ROOT_PITCH,
        })
    }
}

/// Convert decibels to a linear gain factor.
pub fn db_to_gain(db: f32) -> f32 {
    if db == f32::NEG_INFINITY {
        0.0
    } else {
        10f32.powf(db / 20.0)
    }
}
