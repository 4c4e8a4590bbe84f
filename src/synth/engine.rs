use log::{debug, trace};

use super::envelope::GainEnvelope;
use super::graph::{check_time, AudioGraph, Destination, NodeId};
use super::prelude::HashMap;
use super::voice::Voice;
use super::waveform::Waveform;
use crate::error::PlaybackError;

const LIMITER_THRESHOLD: f32 = 0.9;

#[derive(Debug, Clone)]
struct GainNode {
    envelope: GainEnvelope,
    output: Option<Destination>,
}

#[derive(Debug, Clone)]
enum Node {
    Oscillator(Voice),
    Gain(GainNode),
}

/// A scheduled oscillator as seen from outside the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSnapshot {
    pub id: NodeId,
    pub waveform: Waveform,
    pub frequency_hz: f64,
    pub start_time: Option<f64>,
    pub stop_time: Option<f64>,
}

/// Software audio graph: owns every node, keeps the clock and renders the mix.
///
/// The clock only moves when [`AudioEngine::process`] renders samples, so the
/// engine's notion of "now" is exactly the start of the next output block.
pub struct AudioEngine {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
    current_time: f64,
    output_gain: f32,
    current_gain: f32, // Track the current gain for smooth transitions
}

impl AudioEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the next block into `output`, advancing the clock by
    /// `output.len() / sample_rate` seconds.
    pub fn process(&mut self, output: &mut [f32], sample_rate: f32) {
        if output.is_empty() || sample_rate <= 0.0 {
            return;
        }
        let block_start = self.current_time;
        let step = 1.0 / f64::from(sample_rate);

        for (i, sample) in output.iter_mut().enumerate() {
            *sample = self.mix_at(block_start + i as f64 * step);
        }

        let target_gain = self.output_gain;
        self.apply_gain(output, target_gain, sample_rate);
        Self::apply_limiter(output);

        self.current_time = block_start + output.len() as f64 * step;
        self.release_finished();
    }

    /// Every oscillator still owned by the engine, ordered by creation.
    pub fn voices(&self) -> Vec<VoiceSnapshot> {
        let mut voices: Vec<VoiceSnapshot> = self
            .nodes
            .iter()
            .filter_map(|(id, node)| match node {
                Node::Oscillator(voice) => Some(VoiceSnapshot {
                    id: *id,
                    waveform: voice.waveform,
                    frequency_hz: voice.frequency_hz,
                    start_time: voice.start_time,
                    stop_time: voice.stop_time,
                }),
                Node::Gain(_) => None,
            })
            .collect();
        voices.sort_by_key(|voice| voice.id);
        voices
    }

    /// Number of oscillators sounding at the current clock time.
    pub fn active_voice_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|node| matches!(node, Node::Oscillator(v) if v.is_sounding(self.current_time)))
            .count()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Current value of a gain node's automation.
    pub fn gain_value(&self, gain: NodeId, time: f64) -> Result<f32, PlaybackError> {
        Ok(self.gain_node(gain)?.envelope.value_at(time))
    }

    pub fn output_gain(&self) -> f32 {
        self.output_gain
    }

    /// Sum of every sounding oscillator routed to the output at `time`.
    fn mix_at(&self, time: f64) -> f32 {
        self.nodes
            .values()
            .filter_map(|node| match node {
                Node::Oscillator(voice) => {
                    let raw = voice.sample_at(time)?;
                    let gain = self.route_gain(voice.output, time)?;
                    Some(raw * gain)
                }
                Node::Gain(_) => None,
            })
            .sum()
    }

    /// Product of the gains along the chain from `destination` to the output,
    /// or `None` when the chain ends in a disconnected node.
    fn route_gain(&self, mut destination: Option<Destination>, time: f64) -> Option<f32> {
        let mut gain = 1.0;
        // A chain can visit each node at most once; anything longer is a cycle.
        for _ in 0..=self.nodes.len() {
            match destination? {
                Destination::Output => return Some(gain),
                Destination::Node(id) => match self.nodes.get(&id)? {
                    Node::Gain(node) => {
                        gain *= node.envelope.value_at(time);
                        destination = node.output;
                    }
                    Node::Oscillator(_) => return None,
                },
            }
        }
        None
    }

    /// Apply the output gain, crossfading from the previous block's gain.
    fn apply_gain(&mut self, output: &mut [f32], target_gain: f32, sample_rate: f32) {
        let buffer_len = output.len();
        let crossfade_samples = ((0.005 * sample_rate).round() as usize).min(buffer_len);
        let inv_crossfade_len = if crossfade_samples > 0 {
            1.0 / crossfade_samples as f32
        } else {
            0.0
        };

        for (i, sample) in output.iter_mut().enumerate() {
            let gain = if i < crossfade_samples && self.current_gain != target_gain {
                let t = (i + 1) as f32 * inv_crossfade_len;
                let smooth_t = t * t * (3.0 - 2.0 * t); // Cubic ease-in-out curve
                self.current_gain
                    .mul_add(1.0 - smooth_t, target_gain * smooth_t)
            } else {
                target_gain
            };
            *sample *= gain;
        }

        self.current_gain = target_gain;
    }

    /// Soft knee above the threshold, approaching but never reaching 1.0.
    fn apply_limiter(output: &mut [f32]) {
        let headroom = 1.0 - LIMITER_THRESHOLD;
        for sample in output.iter_mut() {
            let abs_sample = sample.abs();
            if abs_sample > LIMITER_THRESHOLD {
                let over = abs_sample - LIMITER_THRESHOLD;
                let limited = LIMITER_THRESHOLD + headroom * over / (over + headroom);
                *sample = limited.copysign(*sample);
            }
        }
    }

    /// Drop oscillators past their stop time or left without an output, then
    /// any gain node nothing feeds.
    fn release_finished(&mut self) {
        let now = self.current_time;
        let before = self.nodes.len();
        self.nodes.retain(|_, node| match node {
            Node::Oscillator(voice) => !(voice.is_finished(now) || voice.output.is_none()),
            Node::Gain(_) => true,
        });

        loop {
            let fed: Vec<NodeId> = self
                .nodes
                .values()
                .filter_map(|node| match node {
                    Node::Oscillator(Voice {
                        output: Some(Destination::Node(id)),
                        ..
                    }) => Some(*id),
                    Node::Gain(GainNode {
                        output: Some(Destination::Node(id)),
                        ..
                    }) => Some(*id),
                    _ => None,
                })
                .collect();
            let count = self.nodes.len();
            self.nodes
                .retain(|id, node| matches!(node, Node::Oscillator(_)) || fed.contains(id));
            if self.nodes.len() == count {
                break;
            }
        }

        if self.nodes.len() != before {
            trace!(
                "Released {} nodes at {:.3}s, {} remaining",
                before - self.nodes.len(),
                now,
                self.nodes.len()
            );
        }
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, PlaybackError> {
        self.nodes.get_mut(&id).ok_or(PlaybackError::UnknownNode(id))
    }

    fn gain_node(&self, id: NodeId) -> Result<&GainNode, PlaybackError> {
        match self.nodes.get(&id) {
            Some(Node::Gain(gain)) => Ok(gain),
            Some(Node::Oscillator(_)) => Err(PlaybackError::NodeKind {
                node: id,
                expected: "gain",
            }),
            None => Err(PlaybackError::UnknownNode(id)),
        }
    }

    fn envelope_mut(&mut self, id: NodeId) -> Result<&mut GainEnvelope, PlaybackError> {
        match self.node_mut(id)? {
            Node::Gain(gain) => Ok(&mut gain.envelope),
            Node::Oscillator(_) => Err(PlaybackError::NodeKind {
                node: id,
                expected: "gain",
            }),
        }
    }

    fn voice_mut(&mut self, id: NodeId) -> Result<&mut Voice, PlaybackError> {
        match self.node_mut(id)? {
            Node::Oscillator(voice) => Ok(voice),
            Node::Gain(_) => Err(PlaybackError::NodeKind {
                node: id,
                expected: "oscillator",
            }),
        }
    }
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 0,
            current_time: 0.0,
            output_gain: 1.0,
            current_gain: 1.0,
        }
    }
}

impl AudioGraph for AudioEngine {
    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn create_oscillator(
        &mut self,
        waveform: Waveform,
        frequency_hz: f64,
    ) -> Result<NodeId, PlaybackError> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(PlaybackError::InvalidFrequency(frequency_hz));
        }
        let id = self.insert(Node::Oscillator(Voice::new(waveform, frequency_hz)));
        debug!("Created {} oscillator {} at {:.2} Hz", waveform, id, frequency_hz);
        Ok(id)
    }

    fn create_gain(&mut self, value: f32) -> Result<NodeId, PlaybackError> {
        Ok(self.insert(Node::Gain(GainNode {
            envelope: GainEnvelope::new(value),
            output: None,
        })))
    }

    fn set_value_at_time(
        &mut self,
        gain: NodeId,
        value: f32,
        time: f64,
    ) -> Result<(), PlaybackError> {
        let time = check_time(time)?;
        self.envelope_mut(gain)?.set_value_at_time(value, time);
        Ok(())
    }

    fn linear_ramp_to_value_at_time(
        &mut self,
        gain: NodeId,
        value: f32,
        time: f64,
    ) -> Result<(), PlaybackError> {
        let time = check_time(time)?;
        self.envelope_mut(gain)?
            .linear_ramp_to_value_at_time(value, time);
        Ok(())
    }

    fn exponential_ramp_to_value_at_time(
        &mut self,
        gain: NodeId,
        value: f32,
        time: f64,
    ) -> Result<(), PlaybackError> {
        if value <= 0.0 || !value.is_finite() {
            return Err(PlaybackError::InvalidRampTarget(value));
        }
        let time = check_time(time)?;
        self.envelope_mut(gain)?
            .exponential_ramp_to_value_at_time(value, time);
        Ok(())
    }

    fn cancel_scheduled_values(&mut self, gain: NodeId, time: f64) -> Result<(), PlaybackError> {
        let time = check_time(time)?;
        self.envelope_mut(gain)?.cancel_scheduled_values(time);
        Ok(())
    }

    fn connect(&mut self, node: NodeId, destination: Destination) -> Result<(), PlaybackError> {
        if let Destination::Node(target) = destination {
            self.gain_node(target)?;
            if target == node {
                return Err(PlaybackError::NodeKind {
                    node,
                    expected: "distinct destination",
                });
            }
        }
        match self.node_mut(node)? {
            Node::Oscillator(voice) => voice.output = Some(destination),
            Node::Gain(gain) => gain.output = Some(destination),
        }
        Ok(())
    }

    fn disconnect(&mut self, node: NodeId) -> Result<(), PlaybackError> {
        match self.node_mut(node)? {
            Node::Oscillator(voice) => voice.output = None,
            Node::Gain(gain) => gain.output = None,
        }
        Ok(())
    }

    fn start(&mut self, oscillator: NodeId, time: f64) -> Result<(), PlaybackError> {
        let time = check_time(time)?;
        self.voice_mut(oscillator)?.start_time = Some(time);
        Ok(())
    }

    fn stop(&mut self, oscillator: NodeId, time: f64) -> Result<(), PlaybackError> {
        let time = check_time(time)?;
        self.voice_mut(oscillator)?.stop_time = Some(time);
        Ok(())
    }

    fn set_output_gain(&mut self, gain: f32) {
        self.output_gain = if gain.is_finite() { gain.max(0.0) } else { 0.0 };
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }
}
