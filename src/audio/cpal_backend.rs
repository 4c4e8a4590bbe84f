use crate::audio::AudioBackend;
use crate::error::PlaybackError;
use crate::runtime::NativeSynth;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use log::{error, info};
use std::sync::{Arc, Mutex};

fn device_error(err: impl std::fmt::Display) -> PlaybackError {
    PlaybackError::Device(err.to_string())
}

pub struct CpalBackend {
    stream: Option<Stream>,
    synth: Arc<Mutex<NativeSynth>>,
}

impl CpalBackend {
    pub fn new(synth: Arc<Mutex<NativeSynth>>) -> Self {
        Self {
            stream: None,
            synth,
        }
    }

    fn select_output_device(&self, host: &cpal::Host) -> Result<cpal::Device, PlaybackError> {
        if cfg!(target_os = "linux") {
            if let Some(device) = self.select_linux_output_device(host)? {
                return Ok(device);
            }
        }
        host.default_output_device()
            .ok_or_else(|| PlaybackError::Device("No output device available".to_string()))
    }

    /// Prefer the ALSA "default" or PipeWire device over raw hardware devices.
    fn select_linux_output_device(
        &self,
        host: &cpal::Host,
    ) -> Result<Option<cpal::Device>, PlaybackError> {
        let devices = host.output_devices().map_err(device_error)?;
        for device in devices {
            let name = device.name().unwrap_or_default().to_lowercase();
            if name.starts_with("default") || name.contains("pipewire") {
                return Ok(Some(device));
            }
        }
        Ok(None)
    }

    fn build_stream(&mut self) -> Result<Stream, PlaybackError> {
        let host = cpal::default_host();
        let device = self.select_output_device(&host)?;
        info!("Selected device: {}", device.name().unwrap_or_default());

        let supported_config = device.default_output_config().map_err(device_error)?;
        let stream_config: cpal::StreamConfig = supported_config.clone().into();

        let sample_rate = stream_config.sample_rate.0;
        let channels = stream_config.channels as usize;
        let synth = self.synth.clone();
        let mut buffer: Vec<f32> = Vec::new();

        info!("Output stream: {} Hz, {} channels", sample_rate, channels);

        let stream = match supported_config.sample_format() {
            SampleFormat::F32 => device
                .build_output_stream(
                    &stream_config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        let frames = data.len() / channels;
                        buffer.resize(frames, 0.0);

                        match synth.lock() {
                            Ok(mut synth) => synth.process(&mut buffer, sample_rate as f32),
                            Err(_) => buffer.fill(0.0),
                        }

                        for (i, frame) in data.chunks_mut(channels).enumerate() {
                            for sample in frame.iter_mut() {
                                *sample = buffer[i];
                            }
                        }
                    },
                    |err| error!("Stream error: {}", err),
                    None,
                )
                .map_err(device_error)?,
            format => {
                return Err(PlaybackError::Device(format!(
                    "Unsupported sample format {:?}",
                    format
                )))
            }
        };

        Ok(stream)
    }
}

impl AudioBackend for CpalBackend {
    fn start(&mut self) -> Result<(), PlaybackError> {
        let stream = self.build_stream()?;
        stream.play().map_err(device_error)?;
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlaybackError> {
        if let Some(stream) = self.stream.take() {
            stream.pause().map_err(device_error)?;
            info!("Output stream stopped");
        }
        Ok(())
    }
}
