//! Chord interval sets and the diatonic (Ionian) chord table.
//!
//! Intervals are semitone offsets from the chord root, kept in voicing order.
//! The table maps each scale degree of a major scale to its conventional triad
//! and seventh chord:
//!
//! | Degree | Triad      | Seventh                  |
//! |--------|------------|--------------------------|
//! | I      | major      | major seventh            |
//! | ii     | minor      | minor seventh            |
//! | iii    | minor      | minor seventh            |
//! | IV     | major      | major seventh            |
//! | V      | major      | dominant seventh         |
//! | vi     | minor      | minor seventh            |
//! | vii°   | diminished | half-diminished seventh  |

use serde::{Deserialize, Serialize};

use super::note::Pitch;

/// Named chord qualities and their interval sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    DominantSeventh,
    MajorSeventh,
    MinorSeventh,
    Diminished,
    HalfDiminishedSeventh,
    DiminishedSeventh,
}

impl ChordQuality {
    pub const ALL: [ChordQuality; 8] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::DominantSeventh,
        ChordQuality::MajorSeventh,
        ChordQuality::MinorSeventh,
        ChordQuality::Diminished,
        ChordQuality::HalfDiminishedSeventh,
        ChordQuality::DiminishedSeventh,
    ];

    /// Semitone offsets from the root, in voicing order.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::DominantSeventh => &[0, 4, 7, 10],
            ChordQuality::MajorSeventh => &[0, 4, 7, 11],
            ChordQuality::MinorSeventh => &[0, 3, 7, 10],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::HalfDiminishedSeventh => &[0, 3, 6, 10],
            ChordQuality::DiminishedSeventh => &[0, 3, 6, 9],
        }
    }

    /// Short chord symbol suffix (`M`, `m`, `D7`, ...).
    pub fn symbol(self) -> &'static str {
        match self {
            ChordQuality::Major => "M",
            ChordQuality::Minor => "m",
            ChordQuality::DominantSeventh => "D7",
            ChordQuality::MajorSeventh => "M7",
            ChordQuality::MinorSeventh => "m7",
            ChordQuality::Diminished => "dim",
            ChordQuality::HalfDiminishedSeventh => "m7b5",
            ChordQuality::DiminishedSeventh => "dim7",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|quality| quality.symbol() == symbol)
    }

    /// Pitches of this chord built on `root`.
    pub fn pitches(self, root: Pitch) -> Vec<Pitch> {
        resolve_chord_pitches(root, self.intervals())
    }
}

/// Which of the two diatonic voicings to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChordKind {
    /// Stacked thirds: three notes.
    Triad,
    /// Triad plus the seventh: four notes.
    #[default]
    Seventh,
}

impl ChordKind {
    /// Map the 0/1 selector used by the chord-type radio group.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ChordKind::Triad),
            1 => Some(ChordKind::Seventh),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            ChordKind::Triad => 0,
            ChordKind::Seventh => 1,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ChordKind::Triad => ChordKind::Seventh,
            ChordKind::Seventh => ChordKind::Triad,
        }
    }
}

/// Triad and seventh chord for one scale degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiatonicChord {
    pub triad: ChordQuality,
    pub seventh: ChordQuality,
}

impl DiatonicChord {
    pub fn quality(&self, kind: ChordKind) -> ChordQuality {
        match kind {
            ChordKind::Triad => self.triad,
            ChordKind::Seventh => self.seventh,
        }
    }
}

/// Ionian chord qualities indexed by scale degree 0..=6.
pub const IONIAN_TABLE: [DiatonicChord; 7] = [
    DiatonicChord { triad: ChordQuality::Major, seventh: ChordQuality::MajorSeventh },
    DiatonicChord { triad: ChordQuality::Minor, seventh: ChordQuality::MinorSeventh },
    DiatonicChord { triad: ChordQuality::Minor, seventh: ChordQuality::MinorSeventh },
    DiatonicChord { triad: ChordQuality::Major, seventh: ChordQuality::MajorSeventh },
    DiatonicChord { triad: ChordQuality::Major, seventh: ChordQuality::DominantSeventh },
    DiatonicChord { triad: ChordQuality::Minor, seventh: ChordQuality::MinorSeventh },
    DiatonicChord { triad: ChordQuality::Diminished, seventh: ChordQuality::HalfDiminishedSeventh },
];

/// Table lookup by degree index; `None` past the seventh degree.
pub fn diatonic_chord(degree: usize) -> Option<DiatonicChord> {
    IONIAN_TABLE.get(degree).copied()
}

/// Add every interval to `root`, keeping the interval order.
///
/// Pitches saturate at `Pitch::MAX` rather than wrapping, so a chord rooted
/// at the very top of the range collapses onto its highest pitch.
pub fn resolve_chord_pitches(root: Pitch, intervals: &[u8]) -> Vec<Pitch> {
    intervals
        .iter()
        .map(|&offset| root.saturating_add(Pitch::from(offset)))
        .collect()
}

/// The seven degrees of the major scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleDegree {
    Tonic,
    Supertonic,
    Mediant,
    Subdominant,
    Dominant,
    Submediant,
    LeadingTone,
}

impl ScaleDegree {
    pub const ALL: [ScaleDegree; 7] = [
        ScaleDegree::Tonic,
        ScaleDegree::Supertonic,
        ScaleDegree::Mediant,
        ScaleDegree::Subdominant,
        ScaleDegree::Dominant,
        ScaleDegree::Submediant,
        ScaleDegree::LeadingTone,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ScaleDegree::Tonic => "Tonic",
            ScaleDegree::Supertonic => "Supertonic",
            ScaleDegree::Mediant => "Mediant",
            ScaleDegree::Subdominant => "Subdominant",
            ScaleDegree::Dominant => "Dominant",
            ScaleDegree::Submediant => "Submediant",
            ScaleDegree::LeadingTone => "Leading-tone",
        }
    }

    pub fn roman(self) -> &'static str {
        match self {
            ScaleDegree::Tonic => "I",
            ScaleDegree::Supertonic => "ii",
            ScaleDegree::Mediant => "iii",
            ScaleDegree::Subdominant => "IV",
            ScaleDegree::Dominant => "V",
            ScaleDegree::Submediant => "vi",
            ScaleDegree::LeadingTone => "vii°",
        }
    }

    /// Distance in semitones from the tonic in a major scale.
    pub fn semitones(self) -> u8 {
        const IONIAN_STEPS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
        IONIAN_STEPS[self.index()]
    }

    pub fn chord(self) -> DiatonicChord {
        IONIAN_TABLE[self.index()]
    }
}
