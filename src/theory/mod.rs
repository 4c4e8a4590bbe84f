//! Music theory helpers: MIDI pitch arithmetic and the diatonic chord table.

mod chord;
mod note;

pub use chord::{
    diatonic_chord, resolve_chord_pitches, ChordKind, ChordQuality, DiatonicChord, ScaleDegree,
    IONIAN_TABLE,
};
pub use note::{
    chromatic_name, name_to_pitch, octave, pitch_to_frequency_hz, pitch_to_name, Pitch,
    CHROMATIC_NAMES,
};
