use super::graph::Destination;
use super::prelude::TAU;
use super::waveform::Waveform;

/// One oscillator in the engine's node arena.
///
/// A voice is silent until its start time, sounds until its stop time and is
/// released by the engine once the clock has moved past the stop time.
#[derive(Debug, Clone)]
pub struct Voice {
    pub waveform: Waveform,
    pub frequency_hz: f64,
    pub start_time: Option<f64>,
    pub stop_time: Option<f64>,
    pub output: Option<Destination>,
}

impl Voice {
    pub fn new(waveform: Waveform, frequency_hz: f64) -> Self {
        Self {
            waveform,
            frequency_hz,
            start_time: None,
            stop_time: None,
            output: None,
        }
    }

    pub fn is_sounding(&self, time: f64) -> bool {
        match self.start_time {
            Some(start) => time >= start && self.stop_time.map_or(true, |stop| time < stop),
            None => false,
        }
    }

    /// Raw oscillator output at `time`, or `None` while the voice is silent.
    /// Phase is measured from the start time so every voice begins at phase 0.
    pub fn sample_at(&self, time: f64) -> Option<f32> {
        if !self.is_sounding(time) {
            return None;
        }
        let start = self.start_time?;
        let phase = TAU * self.frequency_hz * (time - start);
        Some(self.waveform.evaluate(phase))
    }

    /// Checks if the voice has played out completely by `time`.
    pub fn is_finished(&self, time: f64) -> bool {
        self.stop_time.is_some_and(|stop| time >= stop)
    }
}
