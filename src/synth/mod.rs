//! Tone synthesis: the audio graph boundary, the software engine that
//! implements it, and the note/chord scheduling built on top.

pub mod engine;
pub mod envelope;
pub mod graph;
pub mod handle;
pub mod options;
pub mod prelude;
pub mod tone;
pub mod voice;
pub mod waveform;

pub use engine::{AudioEngine, VoiceSnapshot};
pub use graph::{AudioGraph, Destination, NodeId};
pub use handle::{PlaybackHandle, PlaybackResult};
pub use options::{ChordOptions, EnvelopeShape, ToneOptions};
pub use tone::{play_chord_tones, play_single_tone};
pub use waveform::{CycleDirection, Waveform};
