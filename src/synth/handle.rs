use log::{debug, warn};
use serde::Serialize;

use super::graph::{AudioGraph, NodeId};
use crate::error::PlaybackError;
use crate::theory::{pitch_to_name, Pitch};

/// The pitches a play call actually sounded, in scheduling order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaybackResult {
    pub pitches: Vec<Pitch>,
}

impl PlaybackResult {
    /// Note names for display, e.g. `["C6", "E6", "G6"]`.
    pub fn names(&self) -> Vec<String> {
        self.pitches.iter().map(|&pitch| pitch_to_name(pitch)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }
}

/// Ownership of the nodes scheduled by one play call.
///
/// Dropping the handle leaves the voices to play out and release themselves.
/// `stop()` cuts them off at the graph's current time and unhooks them from
/// the output so the graph can release them on its next block.
#[derive(Debug)]
pub struct PlaybackHandle {
    result: PlaybackResult,
    oscillators: Vec<NodeId>,
    gains: Vec<NodeId>,
    start_time: f64,
    stop_time: f64,
    stopped: bool,
}

impl PlaybackHandle {
    pub(crate) fn new(start_time: f64, stop_time: f64) -> Self {
        Self {
            result: PlaybackResult::default(),
            oscillators: Vec::new(),
            gains: Vec::new(),
            start_time,
            stop_time,
            stopped: false,
        }
    }

    pub(crate) fn push_voice(&mut self, pitch: Pitch, oscillator: NodeId, gain: NodeId) {
        self.result.pitches.push(pitch);
        self.oscillators.push(oscillator);
        self.gains.push(gain);
    }

    pub(crate) fn push_gain(&mut self, gain: NodeId) {
        self.gains.push(gain);
    }

    pub fn played(&self) -> &PlaybackResult {
        &self.result
    }

    pub fn into_result(self) -> PlaybackResult {
        self.result
    }

    pub fn oscillators(&self) -> &[NodeId] {
        &self.oscillators
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Clock time at which the last voice of this call stops on its own.
    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    pub fn is_finished(&self, graph: &impl AudioGraph) -> bool {
        self.stopped
            || graph.current_time() >= self.stop_time
            || !self.oscillators.iter().any(|&id| graph.contains(id))
    }

    /// Stop every voice now, clear pending automation and disconnect all nodes.
    ///
    /// Each node is torn down independently; the first failure is returned
    /// after the rest have been attempted. Stopping twice is a no-op.
    pub fn stop(&mut self, graph: &mut impl AudioGraph) -> Result<(), PlaybackError> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;

        let now = graph.current_time();
        let mut first_error = None;
        let mut record = |result: Result<(), PlaybackError>| {
            if let Err(err) = result {
                warn!("Failed to tear down voice: {}", err);
                first_error.get_or_insert(err);
            }
        };

        for &oscillator in &self.oscillators {
            if graph.contains(oscillator) {
                record(graph.stop(oscillator, now));
                record(graph.disconnect(oscillator));
            }
        }
        for &gain in &self.gains {
            if graph.contains(gain) {
                record(graph.cancel_scheduled_values(gain, now));
                record(graph.disconnect(gain));
            }
        }

        debug!(
            "Stopped playback of {:?} at {:.3}s",
            self.result.pitches, now
        );
        first_error.map_or(Ok(()), Err)
    }

    /// Consume the handle, stopping anything still sounding.
    pub fn dispose(mut self, graph: &mut impl AudioGraph) -> Result<PlaybackResult, PlaybackError> {
        self.stop(graph)?;
        Ok(self.result)
    }
}
