use crate::synth::CycleDirection;
use crate::theory::ScaleDegree;
use crate::trainer::TrainerEvent;
use device_query::{DeviceQuery, DeviceState, Keycode};
use log::warn;
use std::collections::HashMap;
use std::sync::mpsc::Sender;

/// Polls the computer keyboard and turns key presses into trainer events.
///
/// - `1`..`7` play the diatonic chords
/// - the home row (with the row above for sharps) plays notes above the root
/// - `Tab` toggles triads/sevenths, `Up`/`Down` move the root by a semitone
/// - `I` switches instrument, `,`/`.` cycle the note waveform
/// - `Space` stops everything, `Escape` quits
pub struct KeyboardHandler {
    device_state: DeviceState,
    key_states: HashMap<Keycode, bool>,
    key_to_event: HashMap<Keycode, TrainerEvent>,
    event_sender: Sender<TrainerEvent>,
}

impl KeyboardHandler {
    pub fn new(event_sender: Sender<TrainerEvent>) -> Self {
        let degree_keys = [
            Keycode::Key1,
            Keycode::Key2,
            Keycode::Key3,
            Keycode::Key4,
            Keycode::Key5,
            Keycode::Key6,
            Keycode::Key7,
        ];
        // Piano layout: home row for naturals, row above for the black keys.
        let note_keys = [
            (Keycode::A, 0),
            (Keycode::W, 1),
            (Keycode::S, 2),
            (Keycode::E, 3),
            (Keycode::D, 4),
            (Keycode::F, 5),
            (Keycode::T, 6),
            (Keycode::G, 7),
            (Keycode::Y, 8),
            (Keycode::H, 9),
            (Keycode::U, 10),
            (Keycode::J, 11),
            (Keycode::K, 12),
            (Keycode::O, 13),
            (Keycode::L, 14),
            (Keycode::P, 15),
            (Keycode::Semicolon, 16),
        ];

        let mut key_to_event: HashMap<Keycode, TrainerEvent> = degree_keys
            .into_iter()
            .zip(ScaleDegree::ALL)
            .map(|(key, degree)| (key, TrainerEvent::PlayDegree(degree)))
            .chain(
                note_keys
                    .into_iter()
                    .map(|(key, offset)| (key, TrainerEvent::PlayNoteOffset(offset))),
            )
            .collect();
        key_to_event.extend([
            (Keycode::Tab, TrainerEvent::ToggleChordKind),
            (Keycode::Up, TrainerEvent::ShiftRoot(1)),
            (Keycode::Down, TrainerEvent::ShiftRoot(-1)),
            (Keycode::I, TrainerEvent::CycleInstrument),
            (
                Keycode::Comma,
                TrainerEvent::CycleWaveform(CycleDirection::Backward),
            ),
            (
                Keycode::Dot,
                TrainerEvent::CycleWaveform(CycleDirection::Forward),
            ),
            (Keycode::Space, TrainerEvent::StopAll),
        ]);

        // Initialize all keys as not pressed
        let key_states = key_to_event.keys().map(|key| (*key, false)).collect();

        Self {
            device_state: DeviceState::new(),
            key_states,
            key_to_event,
            event_sender,
        }
    }

    /// Send an event for every key pressed since the last poll.
    /// Returns `false` once Escape is held.
    pub fn update(&mut self) -> bool {
        let keys: Vec<Keycode> = self.device_state.get_keys();
        if keys.contains(&Keycode::Escape) {
            return false;
        }

        for (key, event) in &self.key_to_event {
            let is_pressed = keys.contains(key);
            let was_pressed = self.key_states.get(key).copied().unwrap_or(false);

            if is_pressed && !was_pressed {
                if let Err(e) = self.event_sender.send(*event) {
                    warn!("Error sending {:?} for key {:?}: {}", event, key, e);
                }
            }
            self.key_states.insert(*key, is_pressed);
        }
        true
    }
}
