use chordear::synth::{
    play_chord_tones, play_single_tone, ChordOptions, Destination, EnvelopeShape, NodeId,
    ToneOptions, Waveform,
};
use chordear::{AudioEngine, AudioGraph, PlaybackError};
use pretty_assertions::assert_eq;

const SAMPLE_RATE: f32 = 1000.0;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// Render `seconds` of audio at the test sample rate.
fn render(engine: &mut AudioEngine, seconds: f64) -> Vec<f32> {
    let mut buffer = vec![0.0; (seconds * f64::from(SAMPLE_RATE)).round() as usize];
    engine.process(&mut buffer, SAMPLE_RATE);
    buffer
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Set(NodeId, f32, f64),
    Linear(NodeId, f32, f64),
    Exponential(NodeId, f32, f64),
    Connect(NodeId, Destination),
    Start(NodeId, f64),
    Stop(NodeId, f64),
}

/// Wraps the engine, records every automation call, refuses oscillators
/// above `max_frequency_hz` and refuses to stop oscillators above
/// `max_stoppable_hz`.
struct RecordingGraph {
    inner: AudioEngine,
    calls: Vec<Call>,
    max_frequency_hz: f64,
    max_stoppable_hz: f64,
}

impl RecordingGraph {
    fn new() -> Self {
        Self {
            inner: AudioEngine::new(),
            calls: Vec::new(),
            max_frequency_hz: f64::INFINITY,
            max_stoppable_hz: f64::INFINITY,
        }
    }

    fn rejecting_above(max_frequency_hz: f64) -> Self {
        Self {
            max_frequency_hz,
            ..Self::new()
        }
    }

    fn unstoppable_above(max_stoppable_hz: f64) -> Self {
        Self {
            max_stoppable_hz,
            ..Self::new()
        }
    }

    fn automation(&self, gain: NodeId) -> Vec<Call> {
        self.calls
            .iter()
            .filter(|call| {
                matches!(call,
                    Call::Set(id, ..) | Call::Linear(id, ..) | Call::Exponential(id, ..)
                    if *id == gain)
            })
            .cloned()
            .collect()
    }

    fn destination_of(&self, node: NodeId) -> Option<Destination> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::Connect(id, destination) if *id == node => Some(*destination),
            _ => None,
        })
    }
}

impl AudioGraph for RecordingGraph {
    fn current_time(&self) -> f64 {
        self.inner.current_time()
    }

    fn create_oscillator(
        &mut self,
        waveform: Waveform,
        frequency_hz: f64,
    ) -> Result<NodeId, PlaybackError> {
        if frequency_hz > self.max_frequency_hz {
            return Err(PlaybackError::InvalidFrequency(frequency_hz));
        }
        self.inner.create_oscillator(waveform, frequency_hz)
    }

    fn create_gain(&mut self, value: f32) -> Result<NodeId, PlaybackError> {
        self.inner.create_gain(value)
    }

    fn set_value_at_time(
        &mut self,
        gain: NodeId,
        value: f32,
        time: f64,
    ) -> Result<(), PlaybackError> {
        self.calls.push(Call::Set(gain, value, time));
        self.inner.set_value_at_time(gain, value, time)
    }

    fn linear_ramp_to_value_at_time(
        &mut self,
        gain: NodeId,
        value: f32,
        time: f64,
    ) -> Result<(), PlaybackError> {
        self.calls.push(Call::Linear(gain, value, time));
        self.inner.linear_ramp_to_value_at_time(gain, value, time)
    }

    fn exponential_ramp_to_value_at_time(
        &mut self,
        gain: NodeId,
        value: f32,
        time: f64,
    ) -> Result<(), PlaybackError> {
        self.calls.push(Call::Exponential(gain, value, time));
        self.inner.exponential_ramp_to_value_at_time(gain, value, time)
    }

    fn cancel_scheduled_values(&mut self, gain: NodeId, time: f64) -> Result<(), PlaybackError> {
        self.inner.cancel_scheduled_values(gain, time)
    }

    fn connect(&mut self, node: NodeId, destination: Destination) -> Result<(), PlaybackError> {
        self.calls.push(Call::Connect(node, destination));
        self.inner.connect(node, destination)
    }

    fn disconnect(&mut self, node: NodeId) -> Result<(), PlaybackError> {
        self.inner.disconnect(node)
    }

    fn start(&mut self, oscillator: NodeId, time: f64) -> Result<(), PlaybackError> {
        self.calls.push(Call::Start(oscillator, time));
        self.inner.start(oscillator, time)
    }

    fn stop(&mut self, oscillator: NodeId, time: f64) -> Result<(), PlaybackError> {
        let frequency_hz = self
            .inner
            .voices()
            .iter()
            .find(|voice| voice.id == oscillator)
            .map_or(0.0, |voice| voice.frequency_hz);
        if frequency_hz > self.max_stoppable_hz {
            return Err(PlaybackError::Device(format!(
                "cannot stop {} Hz oscillator",
                frequency_hz
            )));
        }
        self.calls.push(Call::Stop(oscillator, time));
        self.inner.stop(oscillator, time)
    }

    fn set_output_gain(&mut self, gain: f32) {
        self.inner.set_output_gain(gain);
    }

    fn contains(&self, node: NodeId) -> bool {
        self.inner.contains(node)
    }
}

#[test]
fn single_tone_is_one_voice_at_the_note_frequency() {
    let mut engine = AudioEngine::new();
    let handle = play_single_tone(&mut engine, 69, &ToneOptions::default()).unwrap();

    assert_eq!(handle.played().pitches, vec![69]);
    let voices = engine.voices();
    assert_eq!(voices.len(), 1);
    assert_eq!(voices[0].frequency_hz, 440.0);
    assert_eq!(voices[0].waveform, Waveform::Sawtooth);
    assert_eq!(voices[0].start_time, Some(0.0));
    assert_close(voices[0].stop_time.unwrap(), 0.72);
    assert_close(handle.stop_time(), 0.72);
}

#[test]
fn single_tone_envelope_is_a_pluck() {
    let mut graph = RecordingGraph::new();
    let handle = play_single_tone(&mut graph, 60, &ToneOptions::default()).unwrap();
    let oscillator = handle.oscillators()[0];
    let Some(Destination::Node(gain)) = graph.destination_of(oscillator) else {
        panic!("oscillator is not routed through a gain node");
    };

    let automation = graph.automation(gain);
    assert_eq!(automation.len(), 4);
    assert_eq!(automation[0], Call::Set(gain, 0.0001, 0.0));
    assert_eq!(automation[1], Call::Exponential(gain, 1.0, 0.01));
    match automation[2] {
        Call::Exponential(_, value, time) => {
            assert_eq!(value, 0.25);
            assert_close(time, 0.16);
        }
        ref other => panic!("expected a decay ramp, got {:?}", other),
    }
    assert_eq!(automation[3], Call::Exponential(gain, 0.0001, 0.6));
    assert_eq!(graph.destination_of(gain), Some(Destination::Output));

    let gain_at = |time| graph.inner.gain_value(gain, time).unwrap();
    assert!((gain_at(0.005) - 0.01).abs() < 1e-5);
    assert!((gain_at(0.01) - 1.0).abs() < 1e-5);
    assert!(gain_at(0.6) < 0.001);
}

#[test]
fn linear_adsr_tone_holds_then_releases() {
    let options = ToneOptions {
        shape: EnvelopeShape::LinearAdsr,
        ..ToneOptions::default()
    };
    let mut graph = RecordingGraph::new();
    let handle = play_single_tone(&mut graph, 57, &options).unwrap();
    let oscillator = handle.oscillators()[0];
    let Some(Destination::Node(gain)) = graph.destination_of(oscillator) else {
        panic!("oscillator is not routed through a gain node");
    };

    let automation = graph.automation(gain);
    assert_eq!(automation.len(), 4);
    assert_eq!(automation[0], Call::Set(gain, 0.0, 0.0));
    assert_eq!(automation[1], Call::Linear(gain, 1.0, 0.01));
    match automation[2] {
        Call::Set(_, value, time) => {
            assert_eq!(value, 1.0);
            assert_close(time, 0.48);
        }
        ref other => panic!("expected the hold point, got {:?}", other),
    }
    assert_eq!(automation[3], Call::Linear(gain, 0.0, 0.6));

    let stops: Vec<f64> = graph
        .calls
        .iter()
        .filter_map(|call| match call {
            Call::Stop(id, time) if *id == oscillator => Some(*time),
            _ => None,
        })
        .collect();
    assert_eq!(stops.len(), 1);
    assert_close(stops[0], 0.62);
    assert_close(handle.stop_time(), 0.62);
}

#[test]
fn linear_adsr_hold_never_precedes_the_attack() {
    let options = ToneOptions {
        shape: EnvelopeShape::LinearAdsr,
        duration: 0.1,
        attack: 0.05,
        release: 0.08,
        ..ToneOptions::default()
    };
    let mut graph = RecordingGraph::new();
    let handle = play_single_tone(&mut graph, 60, &options).unwrap();
    let Some(Destination::Node(gain)) = graph.destination_of(handle.oscillators()[0]) else {
        panic!("oscillator is not routed through a gain node");
    };
    assert_eq!(graph.automation(gain)[2], Call::Set(gain, 1.0, 0.05));
}

#[test]
fn chord_voices_share_start_and_stop() {
    let mut engine = AudioEngine::new();
    let handle = play_chord_tones(&mut engine, 60, &[0, 4, 7], &ChordOptions::default()).unwrap();

    assert_eq!(handle.played().pitches, vec![60, 64, 67]);
    assert_eq!(handle.played().names(), vec!["C6", "E6", "G6"]);

    let voices = engine.voices();
    assert_eq!(voices.len(), 3);
    for voice in &voices {
        assert_eq!(voice.waveform, Waveform::Sine);
        assert_eq!(voice.start_time, Some(0.0));
        assert_close(voice.stop_time.unwrap(), 0.82);
    }
    assert!(voices[0].frequency_hz < voices[1].frequency_hz);
    assert!(voices[1].frequency_hz < voices[2].frequency_hz);
}

#[test]
fn chord_envelopes_are_linear() {
    let mut graph = RecordingGraph::new();
    let handle = play_chord_tones(&mut graph, 48, &[0, 3, 7, 10], &ChordOptions::default()).unwrap();
    assert_eq!(handle.oscillators().len(), 4);

    let mut bus = None;
    for &oscillator in handle.oscillators() {
        let Some(Destination::Node(gain)) = graph.destination_of(oscillator) else {
            panic!("chord voice {} has no gain", oscillator);
        };
        assert_eq!(
            graph.automation(gain),
            vec![
                Call::Set(gain, 0.0, 0.0),
                Call::Linear(gain, 0.18, 0.01),
                Call::Linear(gain, 0.0, 0.8),
            ]
        );
        let voice_bus = graph.destination_of(gain);
        assert!(matches!(voice_bus, Some(Destination::Node(_))));
        assert!(bus.is_none() || bus == voice_bus, "voices use different buses");
        bus = voice_bus;
    }

    let Some(Destination::Node(bus)) = bus else {
        unreachable!()
    };
    assert_eq!(graph.destination_of(bus), Some(Destination::Output));
}

#[test]
fn scheduling_follows_the_clock() {
    let mut engine = AudioEngine::new();
    render(&mut engine, 0.5);
    let now = engine.current_time();
    assert_close(now, 0.5);

    let handle = play_chord_tones(&mut engine, 60, &[0, 4, 7], &ChordOptions::default()).unwrap();
    assert_close(handle.start_time(), now);
    assert_close(handle.stop_time(), now + 0.82);
    for voice in engine.voices() {
        assert_eq!(voice.start_time, Some(now));
    }

    let tone = play_single_tone(&mut engine, 40, &ToneOptions::default()).unwrap();
    assert_close(tone.stop_time(), now + 0.72);
}

#[test]
fn empty_interval_list_plays_nothing() {
    let mut engine = AudioEngine::new();
    let handle = play_chord_tones(&mut engine, 60, &[], &ChordOptions::default()).unwrap();
    assert!(handle.played().is_empty());
    assert!(engine.voices().is_empty());
}

#[test]
fn rendering_produces_sound_and_releases_finished_voices() {
    let mut engine = AudioEngine::new();
    let handle = play_chord_tones(&mut engine, 60, &[0, 4, 7], &ChordOptions::default()).unwrap();
    play_single_tone(&mut engine, 72, &ToneOptions::default()).unwrap();
    assert_eq!(engine.active_voice_count(), 4);

    let block = render(&mut engine, 0.3);
    assert!(block.iter().any(|sample| sample.abs() > 0.01));
    assert!(block.iter().all(|sample| sample.abs() < 1.0));
    assert!(!handle.is_finished(&engine));

    render(&mut engine, 0.6);
    assert!(handle.is_finished(&engine));
    assert_eq!(engine.voices().len(), 0);
    assert_eq!(engine.node_count(), 0);

    let silence = render(&mut engine, 0.1);
    assert!(silence.iter().all(|&sample| sample == 0.0));
}

#[test]
fn stopping_a_handle_silences_its_voices() {
    let mut engine = AudioEngine::new();
    let mut chord =
        play_chord_tones(&mut engine, 60, &[0, 4, 7], &ChordOptions::default()).unwrap();
    let note = play_single_tone(&mut engine, 84, &ToneOptions::default()).unwrap();
    render(&mut engine, 0.1);

    chord.stop(&mut engine).unwrap();
    assert!(chord.is_finished(&engine));
    // Stopping twice is harmless.
    chord.stop(&mut engine).unwrap();

    render(&mut engine, 0.01);
    let remaining: Vec<NodeId> = engine.voices().iter().map(|voice| voice.id).collect();
    assert_eq!(remaining, note.oscillators().to_vec());

    let result = note.dispose(&mut engine).unwrap();
    assert_eq!(result.pitches, vec![84]);
    render(&mut engine, 0.01);
    assert_eq!(engine.node_count(), 0);
}

#[test]
fn chord_skips_voices_the_graph_rejects() {
    // A6 (pitch 69) is 440 Hz; everything above it is refused.
    let mut graph = RecordingGraph::rejecting_above(440.0);
    let handle = play_chord_tones(&mut graph, 62, &[0, 4, 7, 11], &ChordOptions::default()).unwrap();

    assert_eq!(handle.played().pitches, vec![62, 66, 69]);
    assert_eq!(graph.inner.voices().len(), 3);
}

#[test]
fn voices_that_cannot_be_stopped_are_still_released() {
    // Only C6 (261.6 Hz) can be stopped; E6 and G6 fail after being created.
    let mut graph = RecordingGraph::unstoppable_above(300.0);
    let handle = play_chord_tones(&mut graph, 60, &[0, 4, 7], &ChordOptions::default()).unwrap();
    assert_eq!(handle.into_result().pitches, vec![60]);

    render(&mut graph.inner, 0.01);
    assert_eq!(graph.inner.voices().len(), 1);

    render(&mut graph.inner, 5.0);
    assert!(graph.inner.voices().is_empty());
    assert_eq!(graph.inner.node_count(), 0);
}

#[test]
fn failed_single_tone_leaves_nothing_behind() {
    let mut graph = RecordingGraph::unstoppable_above(300.0);
    let err = play_single_tone(&mut graph, 69, &ToneOptions::default()).unwrap_err();
    assert!(matches!(err, PlaybackError::Device(_)));

    let block = render(&mut graph.inner, 0.01);
    assert!(block.iter().all(|&sample| sample == 0.0));
    assert_eq!(graph.inner.node_count(), 0);
}

#[test]
fn extreme_pitches_fail_without_panicking() {
    let mut engine = AudioEngine::new();
    assert!(matches!(
        play_single_tone(&mut engine, i32::MAX, &ToneOptions::default()),
        Err(PlaybackError::InvalidFrequency(_))
    ));
    assert!(matches!(
        play_chord_tones(&mut engine, i32::MAX, &[0, 4, 7], &ChordOptions::default()),
        Err(PlaybackError::InvalidFrequency(_))
    ));
    render(&mut engine, 0.01);
    assert_eq!(engine.node_count(), 0);
}

#[test]
fn chord_fails_when_no_voice_can_play() {
    let mut graph = RecordingGraph::rejecting_above(100.0);
    let err = play_chord_tones(&mut graph, 60, &[0, 4, 7], &ChordOptions::default()).unwrap_err();

    assert!(matches!(err, PlaybackError::InvalidFrequency(_)));
    assert!(graph.inner.voices().is_empty());
    render(&mut graph.inner, 0.01);
    assert_eq!(graph.inner.node_count(), 0);
}

#[test]
fn invalid_options_are_rejected_before_scheduling() {
    let mut engine = AudioEngine::new();
    let options = ToneOptions {
        duration: 0.05,
        ..ToneOptions::default()
    };
    assert!(matches!(
        play_single_tone(&mut engine, 60, &options),
        Err(PlaybackError::InvalidOptions(_))
    ));

    let options = ChordOptions {
        duration: 0.0,
        ..ChordOptions::default()
    };
    assert!(matches!(
        play_chord_tones(&mut engine, 60, &[0, 4, 7], &options),
        Err(PlaybackError::InvalidOptions(_))
    ));
    assert_eq!(engine.node_count(), 0);
}
