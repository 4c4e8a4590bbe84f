//! Ear-training kernel: MIDI note arithmetic, the diatonic chord table and a
//! small oscillator/envelope synthesizer that plays notes and chords on an
//! explicit audio graph.

pub mod audio;
pub mod config;
pub mod error;
#[cfg(feature = "native")]
pub mod input;
pub mod runtime;
pub mod synth;
pub mod theory;
pub mod trainer;

pub use config::TrainerConfig;
pub use error::{ConfigError, InputError, ParseError, PlaybackError};
pub use synth::{AudioEngine, AudioGraph, PlaybackHandle, PlaybackResult};
pub use trainer::{Instrument, Selection, Trainer, TrainerEvent};
