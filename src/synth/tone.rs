//! Scheduling of single notes and chords on an [`AudioGraph`].
//!
//! Single notes use exponential ramps for a plucked attack; chords use linear
//! ramps so the stacked oscillators blend smoothly. Both calls return as soon
//! as everything is scheduled.

use log::{debug, warn};

use super::graph::{AudioGraph, Destination, NodeId};
use super::handle::PlaybackHandle;
use super::options::{
    ChordOptions, EnvelopeShape, ToneOptions, CHORD_ATTACK_SECONDS, DECAY_SECONDS,
    EXPONENTIAL_FLOOR,
};
use crate::error::PlaybackError;
use crate::theory::{pitch_to_frequency_hz, Pitch};

/// Play one note through its own oscillator and gain envelope.
pub fn play_single_tone<G: AudioGraph>(
    graph: &mut G,
    pitch: Pitch,
    options: &ToneOptions,
) -> Result<PlaybackHandle, PlaybackError> {
    options.validate()?;

    let now = graph.current_time();
    let stop_time = now + options.stop_offset();
    let frequency = pitch_to_frequency_hz(pitch);

    let oscillator = graph.create_oscillator(options.waveform, frequency)?;
    let gain = match graph.create_gain(1.0) {
        Ok(gain) => gain,
        Err(err) => {
            discard(graph, oscillator, None);
            return Err(err);
        }
    };

    let scheduled = match options.shape {
        EnvelopeShape::ExponentialPluck => schedule_pluck(graph, gain, now, options),
        EnvelopeShape::LinearAdsr => schedule_linear_adsr(graph, gain, now, options),
    }
    .and_then(|()| wire_voice(graph, oscillator, gain, Destination::Output, now, stop_time));
    if let Err(err) = scheduled {
        discard(graph, oscillator, Some(gain));
        return Err(err);
    }

    debug!(
        "Note {} ({:.2} Hz, {}) from {:.3}s to {:.3}s",
        pitch, frequency, options.waveform, now, stop_time
    );

    let mut handle = PlaybackHandle::new(now, stop_time);
    handle.push_voice(pitch, oscillator, gain);
    Ok(handle)
}

/// Play every interval above `root` together through a shared bus.
///
/// Voices are scheduled independently: one that fails is logged and left out
/// of the result while the rest still play. The call only fails when the bus
/// cannot be created or no voice could be scheduled at all.
pub fn play_chord_tones<G: AudioGraph>(
    graph: &mut G,
    root: Pitch,
    intervals: &[u8],
    options: &ChordOptions,
) -> Result<PlaybackHandle, PlaybackError> {
    options.validate()?;

    let bus = graph.create_gain(1.0)?;
    graph.connect(bus, Destination::Output)?;

    let t0 = graph.current_time();
    let t1 = t0 + options.duration;
    let stop_time = t0 + options.stop_offset();

    let mut handle = PlaybackHandle::new(t0, stop_time);
    handle.push_gain(bus);
    let mut first_error = None;

    for &offset in intervals {
        let pitch = root.saturating_add(Pitch::from(offset));
        match schedule_chord_voice(graph, bus, pitch, t0, t1, stop_time, options) {
            Ok((oscillator, gain)) => handle.push_voice(pitch, oscillator, gain),
            Err(err) => {
                warn!("Skipping chord voice {}: {}", pitch, err);
                first_error.get_or_insert(err);
            }
        }
    }

    if handle.played().is_empty() {
        if let Some(err) = first_error {
            graph.disconnect(bus)?;
            return Err(err);
        }
    }

    debug!(
        "Chord {:?} ({}) from {:.3}s to {:.3}s",
        handle.played().pitches,
        options.waveform,
        t0,
        stop_time
    );
    Ok(handle)
}

fn schedule_chord_voice<G: AudioGraph>(
    graph: &mut G,
    bus: NodeId,
    pitch: Pitch,
    t0: f64,
    t1: f64,
    stop_time: f64,
    options: &ChordOptions,
) -> Result<(NodeId, NodeId), PlaybackError> {
    let oscillator = graph.create_oscillator(options.waveform, pitch_to_frequency_hz(pitch))?;
    let gain = match graph.create_gain(1.0) {
        Ok(gain) => gain,
        Err(err) => {
            discard(graph, oscillator, None);
            return Err(err);
        }
    };

    let scheduled = graph
        .set_value_at_time(gain, 0.0, t0)
        .and_then(|()| {
            graph.linear_ramp_to_value_at_time(gain, options.peak_gain, t0 + CHORD_ATTACK_SECONDS)
        })
        .and_then(|()| graph.linear_ramp_to_value_at_time(gain, 0.0, t1))
        .and_then(|()| wire_voice(graph, oscillator, gain, Destination::Node(bus), t0, stop_time));
    match scheduled {
        Ok(()) => Ok((oscillator, gain)),
        Err(err) => {
            discard(graph, oscillator, Some(gain));
            Err(err)
        }
    }
}

/// Route oscillator -> gain -> `destination` and schedule the oscillator's run.
fn wire_voice<G: AudioGraph>(
    graph: &mut G,
    oscillator: NodeId,
    gain: NodeId,
    destination: Destination,
    start_time: f64,
    stop_time: f64,
) -> Result<(), PlaybackError> {
    graph.connect(oscillator, Destination::Node(gain))?;
    graph.connect(gain, destination)?;
    graph.start(oscillator, start_time)?;
    graph.stop(oscillator, stop_time)?;
    Ok(())
}

/// Tear down the nodes of a voice that failed part-way through scheduling.
///
/// A disconnected oscillator is released by the graph even when it could not
/// be stopped, so every step is attempted and failures are only logged.
fn discard<G: AudioGraph>(graph: &mut G, oscillator: NodeId, gain: Option<NodeId>) {
    let now = graph.current_time();
    if let Err(err) = graph.stop(oscillator, now) {
        debug!("Could not stop discarded oscillator {}: {}", oscillator, err);
    }
    if let Err(err) = graph.disconnect(oscillator) {
        warn!("Could not disconnect discarded oscillator {}: {}", oscillator, err);
    }
    if let Some(gain) = gain {
        if let Err(err) = graph.disconnect(gain) {
            warn!("Could not disconnect discarded gain {}: {}", gain, err);
        }
    }
}

/// Floor, exponential rise to the peak, decay to sustain, fade back to the floor.
fn schedule_pluck<G: AudioGraph>(
    graph: &mut G,
    gain: NodeId,
    now: f64,
    options: &ToneOptions,
) -> Result<(), PlaybackError> {
    graph.set_value_at_time(gain, EXPONENTIAL_FLOOR, now)?;
    graph.exponential_ramp_to_value_at_time(gain, options.peak_gain, now + options.attack)?;
    graph.exponential_ramp_to_value_at_time(
        gain,
        options.sustain_gain,
        now + options.attack + DECAY_SECONDS,
    )?;
    graph.exponential_ramp_to_value_at_time(gain, EXPONENTIAL_FLOOR, now + options.duration)?;
    Ok(())
}

/// Linear rise, hold at the peak, linear release that ends at `duration`.
fn schedule_linear_adsr<G: AudioGraph>(
    graph: &mut G,
    gain: NodeId,
    now: f64,
    options: &ToneOptions,
) -> Result<(), PlaybackError> {
    let attack_end = now + options.attack;
    let end = now + options.duration;

    graph.set_value_at_time(gain, 0.0, now)?;
    graph.linear_ramp_to_value_at_time(gain, options.peak_gain, attack_end)?;
    graph.set_value_at_time(
        gain,
        options.peak_gain,
        attack_end.max(end - options.release),
    )?;
    graph.linear_ramp_to_value_at_time(gain, 0.0, end)?;
    Ok(())
}
