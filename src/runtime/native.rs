use crate::audio::{AudioBackend, CpalBackend};
use crate::config::TrainerConfig;
use crate::error::{ConfigError, PlaybackError};
use crate::input::{KeyboardHandler, MidiHandler};
use crate::synth::AudioEngine;
use crate::trainer::{Trainer, TrainerEvent};
use log::{info, warn};
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Native runtime synth: the trainer plus the queue of input events it drains
/// at the start of every audio block.
pub struct NativeSynth {
    trainer: Trainer<AudioEngine>,
    event_receiver: Receiver<TrainerEvent>,
}

impl NativeSynth {
    pub fn new(
        config: TrainerConfig,
        event_receiver: Receiver<TrainerEvent>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            trainer: Trainer::new(AudioEngine::new(), config)?,
            event_receiver,
        })
    }

    pub fn process(&mut self, output: &mut [f32], sample_rate: f32) {
        self.process_events();
        self.trainer.graph_mut().process(output, sample_rate);
    }

    fn process_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.trainer.handle_event(event);
        }
    }

    pub fn trainer(&self) -> &Trainer<AudioEngine> {
        &self.trainer
    }

    pub fn trainer_mut(&mut self) -> &mut Trainer<AudioEngine> {
        &mut self.trainer
    }
}

/// Run the trainer on the default output device until Escape is pressed.
pub fn start(config: TrainerConfig) -> Result<(), PlaybackError> {
    let (event_tx, event_rx) = channel();

    let synth = Arc::new(Mutex::new(NativeSynth::new(config, event_rx)?));

    let mut audio_backend = CpalBackend::new(synth.clone());
    audio_backend.start()?;

    let mut keyboard_handler = KeyboardHandler::new(event_tx.clone());
    let mut midi_handler = MidiHandler::new(event_tx);

    info!("Keys 1-7 play degrees, A..; play notes, Tab toggles 7ths, arrows move the root, Esc quits");

    while keyboard_handler.update() {
        midi_handler.update();
        std::thread::sleep(Duration::from_millis(10));
    }

    if let Ok(mut synth) = synth.lock() {
        synth.trainer_mut().stop_all();
    }
    if let Err(err) = audio_backend.stop() {
        warn!("Failed to stop output stream: {}", err);
    }
    Ok(())
}
