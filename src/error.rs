//! Error types shared across the crate.
//!
//! - [`ParseError`] - malformed note names handed to [`crate::theory::name_to_pitch`]
//! - [`ConfigError`] - synthesis options or trainer configuration that fail validation
//! - [`PlaybackError`] - failures reported by the audio graph / output device

use thiserror::Error;

use crate::synth::graph::NodeId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unknown note name '{0}'")]
    UnknownNote(String),

    #[error("Note '{0}' has no octave number")]
    MissingOctave(String),

    #[error("Invalid octave '{octave}' in note '{note}'")]
    InvalidOctave { note: String, octave: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    /// A numeric option is outside its accepted range.
    #[error("Invalid option '{field}': {reason}")]
    InvalidOption { field: &'static str, reason: String },

    #[error("Unknown instrument '{0}'")]
    UnknownInstrument(String),

    #[error("Unknown waveform '{0}'")]
    UnknownWaveform(String),

    #[error("Root pitch {pitch} outside of {min}..={max}")]
    RootOutOfRange { pitch: i32, min: i32, max: i32 },

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Invalid synthesis options: {0}")]
    InvalidOptions(String),

    #[error("Audio node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("Audio node {node} is not a {expected} node")]
    NodeKind { node: NodeId, expected: &'static str },

    #[error("Exponential ramp target must be positive, got {0}")]
    InvalidRampTarget(f32),

    #[error("Invalid schedule time {0}")]
    InvalidTime(f64),

    #[error("Invalid oscillator frequency {0} Hz")]
    InvalidFrequency(f64),

    /// The output device or host audio stream failed.
    #[error("Audio device error: {0}")]
    Device(String),
}

impl From<ConfigError> for PlaybackError {
    fn from(err: ConfigError) -> Self {
        PlaybackError::InvalidOptions(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("No MIDI input ports found")]
    NoMidiPorts,

    #[error("MIDI error: {0}")]
    Midi(String),
}
