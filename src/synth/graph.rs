//! The host audio boundary.
//!
//! Synthesis never touches a device directly. It asks an [`AudioGraph`] for
//! oscillator and gain nodes, schedules gain automation on the graph's clock,
//! wires nodes together and schedules start/stop times. [`crate::synth::AudioEngine`]
//! is the in-crate implementation; tests and other hosts can provide their own.

use std::fmt;

use crate::error::PlaybackError;
use crate::synth::waveform::Waveform;

/// Opaque handle to a node owned by an [`AudioGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a node sends its signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// The graph's output, mixed additively with everything else connected to it.
    Output,
    /// The input of a gain node.
    Node(NodeId),
}

pub trait AudioGraph {
    /// Monotonic clock time in seconds.
    fn current_time(&self) -> f64;

    fn create_oscillator(
        &mut self,
        waveform: Waveform,
        frequency_hz: f64,
    ) -> Result<NodeId, PlaybackError>;

    /// A gain node whose value is `value` until automation says otherwise.
    fn create_gain(&mut self, value: f32) -> Result<NodeId, PlaybackError>;

    fn set_value_at_time(&mut self, gain: NodeId, value: f32, time: f64)
        -> Result<(), PlaybackError>;

    fn linear_ramp_to_value_at_time(
        &mut self,
        gain: NodeId,
        value: f32,
        time: f64,
    ) -> Result<(), PlaybackError>;

    /// Fails with [`PlaybackError::InvalidRampTarget`] unless `value > 0`.
    fn exponential_ramp_to_value_at_time(
        &mut self,
        gain: NodeId,
        value: f32,
        time: f64,
    ) -> Result<(), PlaybackError>;

    fn cancel_scheduled_values(&mut self, gain: NodeId, time: f64) -> Result<(), PlaybackError>;

    fn connect(&mut self, node: NodeId, destination: Destination) -> Result<(), PlaybackError>;

    fn disconnect(&mut self, node: NodeId) -> Result<(), PlaybackError>;

    fn start(&mut self, oscillator: NodeId, time: f64) -> Result<(), PlaybackError>;

    fn stop(&mut self, oscillator: NodeId, time: f64) -> Result<(), PlaybackError>;

    /// Linear gain applied to the mixed output.
    fn set_output_gain(&mut self, gain: f32);

    /// Whether `node` is still alive in the graph. Nodes are released once
    /// their oscillator has stopped and the graph has moved past the stop time,
    /// or once an oscillator has been left disconnected through a rendered block.
    fn contains(&self, node: NodeId) -> bool;
}

pub(crate) fn check_time(time: f64) -> Result<f64, PlaybackError> {
    if time.is_finite() && time >= 0.0 {
        Ok(time)
    } else {
        Err(PlaybackError::InvalidTime(time))
    }
}
