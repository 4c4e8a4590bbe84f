use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::synth::prelude::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleDirection {
    Forward,
    Backward,
}

impl Waveform {
    /// Sample the waveform at `phase` radians. Output is in -1.0..=1.0.
    pub fn evaluate(self, phase: f64) -> f32 {
        let value = match self {
            Waveform::Sine => phase.sin(),
            Waveform::Square => {
                if phase.sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => {
                let cycles = phase / (2.0 * PI);
                2.0 * (cycles - (cycles + 0.5).floor())
            }
            // TODO: asin() is the expensive path here; a phase-accumulator triangle would do
            Waveform::Triangle => (2.0 / PI) * phase.sin().asin(),
        };
        value as f32
    }

    pub fn cycled(self, direction: CycleDirection) -> Self {
        match direction {
            CycleDirection::Forward => match self {
                Waveform::Sine => Waveform::Square,
                Waveform::Square => Waveform::Sawtooth,
                Waveform::Sawtooth => Waveform::Triangle,
                Waveform::Triangle => Waveform::Sine,
            },
            CycleDirection::Backward => match self {
                Waveform::Sine => Waveform::Triangle,
                Waveform::Square => Waveform::Sine,
                Waveform::Sawtooth => Waveform::Square,
                Waveform::Triangle => Waveform::Sawtooth,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Waveform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(Waveform::Sine),
            "square" => Ok(Waveform::Square),
            "sawtooth" | "saw" => Ok(Waveform::Sawtooth),
            "triangle" => Ok(Waveform::Triangle),
            _ => Err(ConfigError::UnknownWaveform(s.to_string())),
        }
    }
}
