//! Microphone sources feeding the encoder.
//!
//! `MicrophoneSource` is a closed set selected by [`MicMode`]: the host
//! microphone or the five/six-channel array microphone.

pub mod clock;
pub mod host;
pub mod multi_channel;

use std::sync::Arc;

pub use host::HostMicrophone;
pub use multi_channel::{ArraySampleRate, MultiChannelMicrophone};

use crate::models::config::MicMode;
use crate::models::error::StreamError;
use crate::traits::audio_capture::{AudioCapture, AudioInputParams, PcmFrameSink};
use crate::traits::audio_record::{AudioRecordBackend, MultiChannelInput};

pub enum MicrophoneSource {
    Host(HostMicrophone),
    MultiChannel(MultiChannelMicrophone),
}

impl MicrophoneSource {
    pub fn for_mode(mode: MicMode, backend: Arc<dyn AudioRecordBackend>) -> Self {
        match mode {
            MicMode::Host => Self::Host(HostMicrophone::new(backend)),
            MicMode::MultiChannel5 => {
                Self::MultiChannel(MultiChannelMicrophone::new(backend, MultiChannelInput::Five))
            }
            MicMode::MultiChannel6 => {
                Self::MultiChannel(MultiChannelMicrophone::new(backend, MultiChannelInput::Six))
            }
        }
    }

    /// Whether the microphone selected by `mode` can record at `hz`.
    ///
    /// The array microphone only knows its fixed rate table; the host
    /// microphone is checked against the backend when created.
    pub fn supports_sample_rate(mode: MicMode, hz: u32) -> bool {
        match mode {
            MicMode::Host => true,
            MicMode::MultiChannel5 | MicMode::MultiChannel6 => {
                ArraySampleRate::from_hz(hz).is_some()
            }
        }
    }

    pub fn mic_mode(&self) -> MicMode {
        match self {
            Self::Host(_) => MicMode::Host,
            Self::MultiChannel(mic) => match mic.input() {
                MultiChannelInput::Five => MicMode::MultiChannel5,
                MultiChannelInput::Six => MicMode::MultiChannel6,
            },
        }
    }

    fn inner(&self) -> &dyn AudioCapture {
        match self {
            Self::Host(mic) => mic,
            Self::MultiChannel(mic) => mic,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn AudioCapture {
        match self {
            Self::Host(mic) => mic,
            Self::MultiChannel(mic) => mic,
        }
    }
}

impl AudioCapture for MicrophoneSource {
    fn create(&mut self, params: AudioInputParams) -> bool {
        self.inner_mut().create(params)
    }

    fn start(&mut self, sink: PcmFrameSink) -> Result<(), StreamError> {
        self.inner_mut().start(sink)
    }

    fn stop(&mut self) {
        self.inner_mut().stop();
    }

    fn is_running(&self) -> bool {
        self.inner().is_running()
    }

    fn release(&mut self) {
        self.inner_mut().release();
    }

    fn max_input_size(&self) -> usize {
        self.inner().max_input_size()
    }
}
