//! Typed synthesis options with their defaults.
//!
//! Every field is optional in serialized form; missing fields take the
//! defaults below. Call `validate()` before scheduling.

use serde::{Deserialize, Serialize};

use super::waveform::Waveform;
use crate::error::ConfigError;

/// Fixed decay window between the attack peak and the sustain level.
pub const DECAY_SECONDS: f64 = 0.15;
/// Lowest value an exponential ramp starts from or returns to.
pub const EXPONENTIAL_FLOOR: f32 = 0.0001;
/// Chord voices reach their peak this long after the chord starts.
pub const CHORD_ATTACK_SECONDS: f64 = 0.01;
/// Oscillators keep running this long after their envelope reaches zero.
pub const STOP_TAIL_SECONDS: f64 = 0.02;

/// Amplitude envelope used for single tones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeShape {
    /// Exponential attack/decay/fade, the plucked default.
    #[default]
    ExponentialPluck,
    /// Linear attack, hold at the peak, linear release ending at `duration`.
    LinearAdsr,
}

/// Options for a single played note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ToneOptions {
    pub duration: f64,
    pub waveform: Waveform,
    pub attack: f64,
    pub release: f64,
    pub peak_gain: f32,
    pub sustain_gain: f32,
    pub shape: EnvelopeShape,
}

impl Default for ToneOptions {
    fn default() -> Self {
        Self {
            duration: 0.6,
            waveform: Waveform::Sawtooth,
            attack: 0.01,
            release: 0.12,
            peak_gain: 1.0,
            sustain_gain: 0.25,
            shape: EnvelopeShape::ExponentialPluck,
        }
    }
}

impl ToneOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("duration", self.duration)?;
        non_negative("attack", self.attack)?;
        non_negative("release", self.release)?;
        match self.shape {
            EnvelopeShape::ExponentialPluck => {
                positive_gain("peak_gain", self.peak_gain)?;
                positive_gain("sustain_gain", self.sustain_gain)?;
                if self.attack + DECAY_SECONDS > self.duration {
                    return Err(ConfigError::InvalidOption {
                        field: "duration",
                        reason: format!(
                            "must cover attack + {}s decay ({}s), got {}s",
                            DECAY_SECONDS,
                            self.attack + DECAY_SECONDS,
                            self.duration
                        ),
                    });
                }
            }
            EnvelopeShape::LinearAdsr => {
                non_negative_gain("peak_gain", self.peak_gain)?;
                if self.attack > self.duration {
                    return Err(ConfigError::InvalidOption {
                        field: "attack",
                        reason: format!("longer than duration ({}s)", self.duration),
                    });
                }
            }
        }
        Ok(())
    }

    /// Seconds from the call until the oscillator stops.
    pub fn stop_offset(&self) -> f64 {
        match self.shape {
            EnvelopeShape::ExponentialPluck => self.duration + self.release,
            EnvelopeShape::LinearAdsr => self.duration + STOP_TAIL_SECONDS,
        }
    }
}

/// Options for a played chord.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ChordOptions {
    pub duration: f64,
    pub waveform: Waveform,
    pub peak_gain: f32,
}

impl Default for ChordOptions {
    fn default() -> Self {
        Self {
            duration: 0.8,
            waveform: Waveform::Sine,
            peak_gain: 0.18,
        }
    }
}

impl ChordOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("duration", self.duration)?;
        non_negative_gain("peak_gain", self.peak_gain)?;
        if self.duration < CHORD_ATTACK_SECONDS {
            return Err(ConfigError::InvalidOption {
                field: "duration",
                reason: format!("shorter than the {}s chord attack", CHORD_ATTACK_SECONDS),
            });
        }
        Ok(())
    }

    pub fn stop_offset(&self) -> f64 {
        self.duration + STOP_TAIL_SECONDS
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidOption {
            field,
            reason: format!("must be a positive number of seconds, got {}", value),
        })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidOption {
            field,
            reason: format!("must be zero or more seconds, got {}", value),
        })
    }
}

fn positive_gain(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidOption {
            field,
            reason: format!("exponential envelopes need a gain above zero, got {}", value),
        })
    }
}

fn non_negative_gain(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidOption {
            field,
            reason: format!("must be zero or more, got {}", value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ToneOptions::default().validate().is_ok());
        assert!(ChordOptions::default().validate().is_ok());
        assert!((ToneOptions::default().stop_offset() - 0.72).abs() < 1e-12);
        assert!((ChordOptions::default().stop_offset() - 0.82).abs() < 1e-12);
    }

    #[test]
    fn pluck_rejects_zero_sustain() {
        let options = ToneOptions {
            sustain_gain: 0.0,
            ..ToneOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::InvalidOption { field: "sustain_gain", .. })
        ));

        // The linear envelope never ramps exponentially, so zero is fine there.
        let linear = ToneOptions {
            sustain_gain: 0.0,
            shape: EnvelopeShape::LinearAdsr,
            ..ToneOptions::default()
        };
        assert!(linear.validate().is_ok());
    }

    #[test]
    fn pluck_duration_must_cover_decay() {
        let options = ToneOptions {
            duration: 0.1,
            ..ToneOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let options: ToneOptions = serde_json::from_str(r#"{ "waveform": "triangle" }"#).unwrap();
        assert_eq!(options.waveform, Waveform::Triangle);
        assert_eq!(options.duration, 0.6);

        let chord: ChordOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(chord, ChordOptions::default());
    }
}
