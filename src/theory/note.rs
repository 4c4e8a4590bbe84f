//! MIDI pitch <-> note name <-> frequency conversions.

use crate::error::ParseError;

/// MIDI-like note index. 60 is middle C, one unit per semitone.
/// No range is enforced here; callers constrain what they pass in.
pub type Pitch = i32;

/// Chromatic names indexed by `pitch mod 12`.
pub const CHROMATIC_NAMES: [&str; 12] = [
    "C", "#C", "D", "#D", "E", "F", "#F", "G", "#G", "A", "#A", "B",
];

const A4_PITCH: Pitch = 69;
const A4_FREQUENCY_HZ: f64 = 440.0;

/// Chromatic name of a pitch. Negative pitches wrap like positive ones.
pub fn chromatic_name(pitch: Pitch) -> &'static str {
    CHROMATIC_NAMES[pitch.rem_euclid(12) as usize]
}

/// Octave number of a pitch: `floor(pitch / 12) + 1`.
pub fn octave(pitch: Pitch) -> i32 {
    pitch.div_euclid(12) + 1
}

/// Render a pitch as `"<name><octave>"`, e.g. `69 -> "A6"`, `40 -> "E4"`.
pub fn pitch_to_name(pitch: Pitch) -> String {
    format!("{}{}", chromatic_name(pitch), octave(pitch))
}

/// Parse a name produced by [`pitch_to_name`] back into a pitch.
///
/// The octave is the trailing run of digits, optionally prefixed by `-` for
/// pitches below zero. Everything before it must be one of [`CHROMATIC_NAMES`].
pub fn name_to_pitch(name: &str) -> Result<Pitch, ParseError> {
    let split = name
        .find(|c: char| c.is_ascii_digit() || c == '-')
        .ok_or_else(|| ParseError::MissingOctave(name.to_string()))?;
    let (note, octave_str) = name.split_at(split);

    let semitone = CHROMATIC_NAMES
        .iter()
        .position(|candidate| *candidate == note)
        .ok_or_else(|| ParseError::UnknownNote(note.to_string()))?;

    let digits = octave_str.strip_prefix('-').unwrap_or(octave_str);
    let invalid_octave = || ParseError::InvalidOctave {
        note: name.to_string(),
        octave: octave_str.to_string(),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid_octave());
    }
    // i64 so the lowest octave still reaches `Pitch::MIN` once the semitone is added.
    let octave: i64 = octave_str.parse().map_err(|_| invalid_octave())?;

    octave
        .checked_sub(1)
        .and_then(|o| o.checked_mul(12))
        .and_then(|base| base.checked_add(semitone as i64))
        .and_then(|pitch| Pitch::try_from(pitch).ok())
        .ok_or_else(invalid_octave)
}

/// Equal-tempered frequency with pitch 69 tuned to 440 Hz.
pub fn pitch_to_frequency_hz(pitch: Pitch) -> f64 {
    A4_FREQUENCY_HZ * 2f64.powf((f64::from(pitch) - f64::from(A4_PITCH)) / 12.0)
}
