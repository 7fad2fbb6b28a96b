use std::sync::Arc;

use crate::audio::clock::monotonic_micros;
use crate::models::error::StreamError;
use crate::traits::audio_capture::{AudioCapture, AudioInputParams, PcmFrame, PcmFrameSink};
use crate::traits::audio_record::{
    AudioInput, AudioRecordBackend, AudioRecordHandle, OutputChannel, RawPcmCallback,
    RecordRequest,
};

/// Chunk size the platform microphone is read with.
pub const HOST_MAX_INPUT_SIZE: usize = 4096;

/// The platform's standard microphone.
///
/// Unlike the array microphone, parameters are checked against the backend
/// at `create` time so an unusable configuration fails while preparing.
pub struct HostMicrophone {
    backend: Arc<dyn AudioRecordBackend>,
    request: Option<RecordRequest>,
    recording: Option<Box<dyn AudioRecordHandle>>,
}

impl HostMicrophone {
    pub fn new(backend: Arc<dyn AudioRecordBackend>) -> Self {
        Self {
            backend,
            request: None,
            recording: None,
        }
    }
}

impl AudioCapture for HostMicrophone {
    fn create(&mut self, params: AudioInputParams) -> bool {
        let request = RecordRequest {
            input: AudioInput::Host,
            sample_rate: params.sample_rate,
            output: if params.stereo {
                OutputChannel::Stereo
            } else {
                OutputChannel::Mono
            },
            echo_canceler: params.echo_canceler,
            noise_suppressor: params.noise_suppressor,
        };
        if !self.backend.supports(&request) {
            log::warn!(
                "Host microphone rejected {} Hz / {} ch",
                request.sample_rate,
                request.output.count()
            );
            self.request = None;
            return false;
        }
        self.request = Some(request);
        true
    }

    fn start(&mut self, sink: PcmFrameSink) -> Result<(), StreamError> {
        let request = self
            .request
            .ok_or_else(|| StreamError::InvalidState("audio source not created".into()))?;

        if self.recording.is_some() {
            self.stop();
        }

        let callback: RawPcmCallback = Arc::new(move |pcm: &[u8]| {
            sink(PcmFrame {
                data: pcm.to_vec(),
                timestamp_us: monotonic_micros(),
            });
        });
        let recording = self.backend.open(&request, callback)?;
        self.recording = Some(recording);
        log::info!("Host microphone started ({} Hz)", request.sample_rate);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut recording) = self.recording.take() {
            recording.stop();
            log::info!("Host microphone stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.recording.is_some()
    }

    fn max_input_size(&self) -> usize {
        HOST_MAX_INPUT_SIZE
    }
}

impl Drop for HostMicrophone {
    fn drop(&mut self) {
        self.stop();
    }
}
