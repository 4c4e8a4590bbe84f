use crate::config::TrainerConfig;
use crate::synth::{AudioEngine, AudioGraph};
use crate::theory::{pitch_to_name, ChordKind, ScaleDegree};
use crate::trainer::{Instrument, Trainer};
use js_sys::Float32Array;
use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::prelude::*;

/// Forwards `log` records to the browser console.
struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = JsValue::from_str(&format!("[{}] {}", record.level(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&message),
            Level::Warn => web_sys::console::warn_1(&message),
            _ => web_sys::console::log_1(&message),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn init_logging() {
    // Already installed when a second trainer is created; that is fine.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM trainer runtime (no threads, no channels, direct API).
///
/// The page drives the clock by calling `render` from its audio callback and
/// calls the `play_*` methods from UI events; each returns the played pitches.
#[wasm_bindgen]
pub struct WasmTrainer {
    trainer: Trainer<AudioEngine>,
    temp_buffer: Vec<f32>,
}

impl WasmTrainer {
    fn from_config(config: TrainerConfig) -> Result<WasmTrainer, JsValue> {
        Ok(WasmTrainer {
            trainer: Trainer::new(AudioEngine::new(), config).map_err(js_error)?,
            temp_buffer: Vec::new(),
        })
    }
}

#[wasm_bindgen]
impl WasmTrainer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmTrainer, JsValue> {
        init_logging();
        Self::from_config(TrainerConfig::default())
    }

    /// Build from a plain JS object shaped like the JSON config.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<WasmTrainer, JsValue> {
        init_logging();
        let config: TrainerConfig = serde_wasm_bindgen::from_value(config)?;
        Self::from_config(config)
    }

    /// Render audio buffer into a JS-friendly Float32Array
    #[wasm_bindgen]
    pub fn render(&mut self, length: usize, sample_rate: f32) -> Float32Array {
        if self.temp_buffer.len() != length {
            self.temp_buffer = vec![0.0; length];
        }
        self.trainer
            .graph_mut()
            .process(&mut self.temp_buffer, sample_rate);
        Float32Array::from(self.temp_buffer.as_slice())
    }

    #[wasm_bindgen(js_name = currentTime)]
    pub fn current_time(&self) -> f64 {
        self.trainer.graph().current_time()
    }

    #[wasm_bindgen(js_name = playNote)]
    pub fn play_note(&mut self, pitch: i32) -> Result<Vec<i32>, JsValue> {
        let result = self.trainer.play_note(pitch).map_err(js_error)?;
        Ok(result.pitches)
    }

    /// `degree` is 0..=6, `chord_kind` is 0 for triads and 1 for sevenths.
    #[wasm_bindgen(js_name = playDegree)]
    pub fn play_degree(&mut self, degree: usize, chord_kind: usize) -> Result<Vec<i32>, JsValue> {
        let degree = ScaleDegree::from_index(degree)
            .ok_or_else(|| js_error(format!("No scale degree {}", degree)))?;
        let kind = ChordKind::from_index(chord_kind)
            .ok_or_else(|| js_error(format!("No chord kind {}", chord_kind)))?;
        self.trainer.set_chord_kind(kind);
        let result = self.trainer.play_degree(degree).map_err(js_error)?;
        Ok(result.pitches)
    }

    #[wasm_bindgen(js_name = setRoot)]
    pub fn set_root(&mut self, pitch: i32) -> Result<(), JsValue> {
        self.trainer.set_root_pitch(pitch).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setInstrument)]
    pub fn set_instrument(&mut self, name: &str) -> Result<(), JsValue> {
        let instrument: Instrument = name.parse().map_err(js_error)?;
        self.trainer.set_instrument(instrument);
        Ok(())
    }

    #[wasm_bindgen(js_name = setVolumeDb)]
    pub fn set_volume_db(&mut self, db: f32) {
        self.trainer.set_volume_db(db);
    }

    #[wasm_bindgen(js_name = notePitches)]
    pub fn note_pitches(&self) -> Vec<i32> {
        self.trainer.note_pitches()
    }

    #[wasm_bindgen(js_name = stopAll)]
    pub fn stop_all(&mut self) {
        self.trainer.stop_all();
    }

    #[wasm_bindgen]
    pub fn config(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(self.trainer.config())?)
    }

    #[wasm_bindgen(js_name = pitchName)]
    pub fn pitch_name(pitch: i32) -> String {
        pitch_to_name(pitch)
    }
}
