use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::synth::Waveform;

/// Instrument choice offered by the widget. The synthesizer has no samples,
/// so an instrument only picks the oscillator waveforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    #[default]
    Piano,
    Guitar,
}

impl Instrument {
    pub const ALL: [Instrument; 2] = [Instrument::Piano, Instrument::Guitar];

    pub fn tone_waveform(self) -> Waveform {
        match self {
            Instrument::Piano => Waveform::Sawtooth,
            Instrument::Guitar => Waveform::Triangle,
        }
    }

    pub fn chord_waveform(self) -> Waveform {
        match self {
            Instrument::Piano => Waveform::Sine,
            Instrument::Guitar => Waveform::Triangle,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Instrument::Piano => "piano",
            Instrument::Guitar => "guitar",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Instrument::Piano => Instrument::Guitar,
            Instrument::Guitar => Instrument::Piano,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Instrument {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|instrument| instrument.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownInstrument(s.to_string()))
    }
}
