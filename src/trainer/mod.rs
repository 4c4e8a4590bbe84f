//! The widget-facing facade.
//!
//! A [`Trainer`] holds what the widget lets the user pick (instrument, root,
//! chord kind, volume) together with the audio graph it plays on. Selections
//! become pitches through the theory tables and are handed to the tone
//! synthesizer; the pitches that actually sounded come back for display.

mod event;
mod instrument;

use std::collections::VecDeque;

use log::{debug, error, info, warn};

pub use event::TrainerEvent;
pub use instrument::Instrument;

use crate::config::{check_root, db_to_gain, TrainerConfig, MAX_ROOT_PITCH, MIN_ROOT_PITCH};
use crate::error::{ConfigError, PlaybackError};
use crate::synth::{
    play_chord_tones, play_single_tone, AudioGraph, CycleDirection, PlaybackHandle,
    PlaybackResult,
};
use crate::theory::{pitch_to_name, resolve_chord_pitches, ChordKind, Pitch, ScaleDegree};

/// What a chord button asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// One of the seven diatonic chords.
    Degree(ScaleDegree),
    /// Free notes picked by the user, sounded together as one chord.
    Custom(Vec<Pitch>),
}

impl Selection {
    /// Map the widget's degree index; anything past the seventh degree is `None`.
    pub fn from_index(index: usize) -> Option<Self> {
        ScaleDegree::from_index(index).map(Selection::Degree)
    }
}

pub struct Trainer<G: AudioGraph> {
    graph: G,
    config: TrainerConfig,
    live: VecDeque<PlaybackHandle>,
    last_played: Option<PlaybackResult>,
}

impl<G: AudioGraph> Trainer<G> {
    pub fn new(mut graph: G, config: TrainerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        graph.set_output_gain(db_to_gain(config.volume_db));
        info!(
            "Trainer ready: {} at root {}, {:?} chords",
            config.instrument,
            pitch_to_name(config.root_pitch),
            config.chord_kind
        );
        Ok(Self {
            graph,
            config,
            live: VecDeque::new(),
            last_played: None,
        })
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn root_pitch(&self) -> Pitch {
        self.config.root_pitch
    }

    pub fn last_played(&self) -> Option<&PlaybackResult> {
        self.last_played.as_ref()
    }

    /// Playbacks still sounding, after dropping the ones that have finished.
    pub fn live_playbacks(&mut self) -> usize {
        self.prune_finished();
        self.live.len()
    }

    pub fn set_instrument(&mut self, instrument: Instrument) {
        self.config.instrument = instrument;
        self.config.tone.waveform = instrument.tone_waveform();
        self.config.chord.waveform = instrument.chord_waveform();
        debug!("Instrument set to {}", instrument);
    }

    pub fn set_root_pitch(&mut self, pitch: Pitch) -> Result<(), ConfigError> {
        check_root(pitch)?;
        self.config.root_pitch = pitch;
        Ok(())
    }

    /// Move the root, clamped to the allowed range. Returns the new root.
    pub fn shift_root(&mut self, semitones: i32) -> Pitch {
        self.config.root_pitch = self
            .config
            .root_pitch
            .saturating_add(semitones)
            .clamp(MIN_ROOT_PITCH, MAX_ROOT_PITCH);
        debug!("Root is now {}", pitch_to_name(self.config.root_pitch));
        self.config.root_pitch
    }

    pub fn set_chord_kind(&mut self, kind: ChordKind) {
        self.config.chord_kind = kind;
    }

    pub fn set_volume_db(&mut self, db: f32) {
        self.config.volume_db = db;
        self.graph.set_output_gain(db_to_gain(db));
    }

    pub fn cycle_tone_waveform(&mut self, direction: CycleDirection) {
        self.config.tone.waveform = self.config.tone.waveform.cycled(direction);
        debug!("Note waveform is now {}", self.config.tone.waveform);
    }

    /// Pitches of the note buttons, starting at the root.
    pub fn note_pitches(&self) -> Vec<Pitch> {
        (0..self.config.note_count as Pitch)
            .map(|offset| self.config.root_pitch + offset)
            .collect()
    }

    /// Pitches a degree's chord resolves to with the current settings.
    pub fn degree_pitches(&self, degree: ScaleDegree) -> Vec<Pitch> {
        let quality = degree.chord().quality(self.config.chord_kind);
        resolve_chord_pitches(self.degree_root(degree), quality.intervals())
    }

    pub fn play_note(&mut self, pitch: Pitch) -> Result<PlaybackResult, PlaybackError> {
        let handle = play_single_tone(&mut self.graph, pitch, &self.config.tone)?;
        Ok(self.track(handle))
    }

    pub fn play_degree(&mut self, degree: ScaleDegree) -> Result<PlaybackResult, PlaybackError> {
        let quality = degree.chord().quality(self.config.chord_kind);
        let root = self.degree_root(degree);
        debug!(
            "{} ({}{}) on {}",
            degree.name(),
            degree.roman(),
            quality.symbol(),
            pitch_to_name(root)
        );
        let handle =
            play_chord_tones(&mut self.graph, root, quality.intervals(), &self.config.chord)?;
        Ok(self.track(handle))
    }

    pub fn play_selection(&mut self, selection: &Selection) -> Result<PlaybackResult, PlaybackError> {
        match selection {
            Selection::Degree(degree) => self.play_degree(*degree),
            Selection::Custom(pitches) => self.play_custom(pitches),
        }
    }

    /// Apply an input event. Playback failures are logged and swallowed so a
    /// bad device does not take the rest of the trainer down with it.
    pub fn handle_event(&mut self, event: TrainerEvent) -> Option<PlaybackResult> {
        let played = match event {
            TrainerEvent::PlayNote(pitch) => self.play_note(pitch),
            TrainerEvent::PlayNoteOffset(index) => {
                let pitch = self.note_pitches().get(index).copied()?;
                self.play_note(pitch)
            }
            TrainerEvent::PlayDegree(degree) => self.play_degree(degree),
            TrainerEvent::SetChordKind(kind) => {
                self.set_chord_kind(kind);
                return None;
            }
            TrainerEvent::ToggleChordKind => {
                self.set_chord_kind(self.config.chord_kind.toggled());
                info!("Chord kind: {:?}", self.config.chord_kind);
                return None;
            }
            TrainerEvent::ShiftRoot(semitones) => {
                let root = self.shift_root(semitones);
                info!("Root: {}", pitch_to_name(root));
                return None;
            }
            TrainerEvent::SetInstrument(instrument) => {
                self.set_instrument(instrument);
                return None;
            }
            TrainerEvent::CycleInstrument => {
                self.set_instrument(self.config.instrument.next());
                info!("Instrument: {}", self.config.instrument);
                return None;
            }
            TrainerEvent::SetVolumeDb(db) => {
                self.set_volume_db(db);
                return None;
            }
            TrainerEvent::CycleWaveform(direction) => {
                self.cycle_tone_waveform(direction);
                return None;
            }
            TrainerEvent::StopAll => {
                self.stop_all();
                return None;
            }
        };

        match played {
            Ok(result) => {
                info!("Played {}", result.names().join(" "));
                Some(result)
            }
            Err(err) => {
                error!("Playback failed: {}", err);
                None
            }
        }
    }

    /// Cut off everything still sounding.
    pub fn stop_all(&mut self) {
        while let Some(mut handle) = self.live.pop_front() {
            if let Err(err) = handle.stop(&mut self.graph) {
                warn!("Failed to stop playback: {}", err);
            }
        }
    }

    fn play_custom(&mut self, pitches: &[Pitch]) -> Result<PlaybackResult, PlaybackError> {
        let Some(&root) = pitches.iter().min() else {
            return Ok(PlaybackResult::default());
        };
        let intervals = pitches
            .iter()
            .map(|&pitch| {
                pitch
                    .checked_sub(root)
                    .and_then(|interval| u8::try_from(interval).ok())
                    .ok_or_else(|| {
                        PlaybackError::InvalidOptions(format!(
                            "note {} is too far above {}",
                            pitch_to_name(pitch),
                            pitch_to_name(root)
                        ))
                    })
            })
            .collect::<Result<Vec<u8>, _>>()?;
        let handle = play_chord_tones(&mut self.graph, root, &intervals, &self.config.chord)?;
        Ok(self.track(handle))
    }

    fn degree_root(&self, degree: ScaleDegree) -> Pitch {
        if self.config.transpose_to_degree {
            self.config.root_pitch + Pitch::from(degree.semitones())
        } else {
            self.config.root_pitch
        }
    }

    fn prune_finished(&mut self) {
        let graph = &self.graph;
        self.live.retain(|handle| !handle.is_finished(graph));
    }

    /// Keep the handle for later teardown, stealing the oldest playback when
    /// too many are live.
    fn track(&mut self, handle: PlaybackHandle) -> PlaybackResult {
        let result = handle.played().clone();
        self.prune_finished();
        self.live.push_back(handle);

        while self.live.len() > self.config.max_live_playbacks {
            if let Some(mut oldest) = self.live.pop_front() {
                warn!("Too many live playbacks, stopping {:?}", oldest.played().pitches);
                if let Err(err) = oldest.stop(&mut self.graph) {
                    warn!("Failed to stop playback: {}", err);
                }
            }
        }

        self.last_played = Some(result.clone());
        result
    }
}
