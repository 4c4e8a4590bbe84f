use crate::synth::waveform::CycleDirection;
use crate::theory::{ChordKind, Pitch, ScaleDegree};

use super::Instrument;

/// Requests coming from an input device or UI toward the trainer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TrainerEvent {
    /// Play one note at an absolute pitch.
    PlayNote(Pitch),
    /// Play the n-th note button above the current root.
    PlayNoteOffset(usize),
    PlayDegree(ScaleDegree),
    SetChordKind(ChordKind),
    ToggleChordKind,
    /// Move the root by some semitones, clamped to the allowed range.
    ShiftRoot(i32),
    SetInstrument(Instrument),
    CycleInstrument,
    SetVolumeDb(f32),
    CycleWaveform(CycleDirection),
    StopAll,
}
