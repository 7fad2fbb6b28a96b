//! Raw-PCM bridge for the wearable's multi-channel array microphone.
//!
//! The array only records at a fixed set of rates. Hardware is opened on
//! `start`, never on `create`, and every chunk is stamped with the
//! monotonic clock before it reaches the encoder.

use std::sync::Arc;

use crate::audio::clock::monotonic_micros;
use crate::models::error::StreamError;
use crate::traits::audio_capture::{AudioCapture, AudioInputParams, PcmFrame, PcmFrameSink};
use crate::traits::audio_record::{
    AudioInput, AudioRecordBackend, AudioRecordHandle, MultiChannelInput, OutputChannel,
    RawPcmCallback, RecordRequest,
};

/// PCM bytes the array delivers per chunk at the minimum rate.
pub const BUFFER_SIZE_IN_BYTES: usize = 1920;

/// Sample rates the array microphone records at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArraySampleRate {
    Hz16000,
    Hz32000,
    Hz48000,
}

impl ArraySampleRate {
    pub const MIN_HZ: u32 = 16_000;

    pub fn from_hz(hz: u32) -> Option<Self> {
        match hz {
            16_000 => Some(Self::Hz16000),
            32_000 => Some(Self::Hz32000),
            48_000 => Some(Self::Hz48000),
            _ => None,
        }
    }

    pub fn hz(self) -> u32 {
        match self {
            Self::Hz16000 => 16_000,
            Self::Hz32000 => 32_000,
            Self::Hz48000 => 48_000,
        }
    }
}

/// Multi-channel microphone source. Holds a hardware handle only while running.
pub struct MultiChannelMicrophone {
    backend: Arc<dyn AudioRecordBackend>,
    input: MultiChannelInput,
    params: Option<AudioInputParams>,
    recording: Option<Box<dyn AudioRecordHandle>>,
}

impl MultiChannelMicrophone {
    pub fn new(backend: Arc<dyn AudioRecordBackend>, input: MultiChannelInput) -> Self {
        Self {
            backend,
            input,
            params: None,
            recording: None,
        }
    }

    pub fn input(&self) -> MultiChannelInput {
        self.input
    }

    fn sample_rate(&self) -> u32 {
        self.params
            .map(|p| p.sample_rate)
            .unwrap_or(ArraySampleRate::MIN_HZ)
    }
}

impl AudioCapture for MultiChannelMicrophone {
    // Nothing can be checked before the hardware is opened.
    fn create(&mut self, params: AudioInputParams) -> bool {
        self.params = Some(params);
        true
    }

    fn start(&mut self, sink: PcmFrameSink) -> Result<(), StreamError> {
        let params = self
            .params
            .ok_or_else(|| StreamError::InvalidState("audio source not created".into()))?;

        let rate = ArraySampleRate::from_hz(params.sample_rate).ok_or_else(|| {
            log::debug!("Unsupported sample rate: {}", params.sample_rate);
            StreamError::UnsupportedParameter(format!(
                "sample rate {} Hz is not supported by the {}-channel microphone",
                params.sample_rate,
                self.input.channel_count()
            ))
        })?;

        if self.recording.is_some() {
            self.stop();
        }

        let request = RecordRequest {
            input: AudioInput::MultiChannel(self.input),
            sample_rate: rate.hz(),
            output: if params.stereo {
                OutputChannel::Stereo
            } else {
                OutputChannel::Mono
            },
            echo_canceler: params.echo_canceler,
            noise_suppressor: false,
        };

        let callback: RawPcmCallback = Arc::new(move |pcm: &[u8]| {
            sink(PcmFrame {
                data: pcm.to_vec(),
                timestamp_us: monotonic_micros(),
            });
        });

        let recording = self.backend.open(&request, callback).map_err(|e| {
            log::error!("Failed to open multi-channel recording: {}", e);
            match e {
                StreamError::HardwareUnavailable(_) => e,
                other => StreamError::HardwareUnavailable(other.to_string()),
            }
        })?;

        log::info!(
            "Multi-channel microphone started ({} ch in, {} ch out, {} Hz)",
            self.input.channel_count(),
            request.output.count(),
            request.sample_rate
        );
        self.recording = Some(recording);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut recording) = self.recording.take() {
            recording.stop();
            log::info!("Multi-channel microphone stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.recording.is_some()
    }

    fn max_input_size(&self) -> usize {
        BUFFER_SIZE_IN_BYTES * (self.sample_rate() / ArraySampleRate::MIN_HZ) as usize
    }
}

impl Drop for MultiChannelMicrophone {
    fn drop(&mut self) {
        self.stop();
    }
}
