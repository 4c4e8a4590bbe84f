use crate::error::InputError;
use crate::theory::Pitch;
use crate::trainer::TrainerEvent;
use log::{info, warn};
use midir::{MidiInput, MidiInputConnection, MidiInputPort};
use std::sync::mpsc::Sender;
use std::sync::mpsc::{self, Receiver};

/// Turns note-on messages from a MIDI keyboard into single-note playbacks.
pub struct MidiHandler {
    /// Holds the connection to keep it alive
    #[allow(dead_code)]
    connection: Option<MidiInputConnection<()>>,
    receiver: Option<Receiver<(u8, u8, u8)>>, // (status, data1, data2)
    event_sender: Sender<TrainerEvent>,
}

impl MidiHandler {
    pub fn new(event_sender: Sender<TrainerEvent>) -> Self {
        match Self::try_new(event_sender.clone()) {
            Ok(handler) => handler,
            Err(e) => {
                warn!("MIDI input disabled: {}", e);
                Self {
                    connection: None,
                    receiver: None,
                    event_sender,
                }
            }
        }
    }

    fn try_new(event_sender: Sender<TrainerEvent>) -> Result<Self, InputError> {
        let midi_in = MidiInput::new("chordear input").map_err(|e| InputError::Midi(e.to_string()))?;
        let port = Self::select_input_port(&midi_in)?;
        let port_name = midi_in
            .port_name(&port)
            .map_err(|e| InputError::Midi(e.to_string()))?;

        let (sender, receiver) = mpsc::channel();

        let connection = midi_in
            .connect(
                &port,
                "chordear-read-input",
                move |_, message, _| {
                    if message.len() >= 3 {
                        let _ = sender.send((message[0], message[1], message[2]));
                    }
                },
                (),
            )
            .map_err(|e| InputError::Midi(e.to_string()))?;

        info!("Opened MIDI port: {}", port_name);

        Ok(Self {
            connection: Some(connection),
            receiver: Some(receiver),
            event_sender,
        })
    }

    /// First available port; the rest are listed in the log.
    fn select_input_port(midi_in: &MidiInput) -> Result<MidiInputPort, InputError> {
        let in_ports = midi_in.ports();
        for (i, port) in in_ports.iter().enumerate() {
            info!(
                "MIDI input {}: {}",
                i,
                midi_in.port_name(port).unwrap_or_default()
            );
        }
        in_ports.into_iter().next().ok_or(InputError::NoMidiPorts)
    }

    pub fn update(&mut self) {
        if let Some(receiver) = &self.receiver {
            while let Ok((status, data1, data2)) = receiver.try_recv() {
                if let Some(event) = note_on_event(status, data1, data2) {
                    if let Err(e) = self.event_sender.send(event) {
                        warn!("Failed to forward MIDI note: {}", e);
                    }
                }
            }
        }
    }
}

/// Note-on with non-zero velocity plays the note; everything else is ignored
/// because trainer notes end on their own.
fn note_on_event(status: u8, data1: u8, data2: u8) -> Option<TrainerEvent> {
    if status & 0xF0 == 0x90 && data2 > 0 {
        Some(TrainerEvent::PlayNote(Pitch::from(data1)))
    } else {
        None
    }
}
