use std::sync::Arc;

use crate::models::error::StreamError;

/// Callback receiving raw PCM bytes from an open recording.
///
/// Fires on the recorder's own thread.
pub type RawPcmCallback = Arc<dyn Fn(&[u8]) + Send + Sync + 'static>;

/// Physical microphone input to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioInput {
    /// The platform's standard microphone.
    Host,
    /// Array microphone exposing this many raw channels.
    MultiChannel(MultiChannelInput),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiChannelInput {
    Five,
    Six,
}

impl MultiChannelInput {
    pub fn channel_count(self) -> u16 {
        match self {
            Self::Five => 5,
            Self::Six => 6,
        }
    }
}

/// Channel layout the recorder downmixes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputChannel {
    Mono,
    Stereo,
}

impl OutputChannel {
    pub fn count(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

/// What to open on the audio hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRequest {
    pub input: AudioInput,
    pub sample_rate: u32,
    pub output: OutputChannel,
    pub echo_canceler: bool,
    pub noise_suppressor: bool,
}

/// An open hardware recording. Dropping it without `stop` must also release
/// the device.
pub trait AudioRecordHandle: Send {
    fn stop(&mut self);
}

/// Platform audio-record capability.
pub trait AudioRecordBackend: Send + Sync {
    /// Whether `request` could be opened on this device.
    fn supports(&self, request: &RecordRequest) -> bool {
        let _ = request;
        true
    }

    /// Open the input and start delivering PCM to `callback`.
    fn open(
        &self,
        request: &RecordRequest,
        callback: RawPcmCallback,
    ) -> Result<Box<dyn AudioRecordHandle>, StreamError>;
}
