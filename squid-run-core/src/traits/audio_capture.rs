use std::sync::Arc;

use crate::models::error::StreamError;

/// A raw PCM chunk with its capture time on the monotonic clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmFrame {
    pub data: Vec<u8>,
    pub timestamp_us: u64,
}

/// Encoder-side sink receiving PCM frames.
///
/// Invoked on the hardware capture thread; keep processing minimal.
pub type PcmFrameSink = Arc<dyn Fn(PcmFrame) + Send + Sync + 'static>;

/// Parameters the encoder requests from an audio source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInputParams {
    pub sample_rate: u32,
    pub stereo: bool,
    pub echo_canceler: bool,
    pub noise_suppressor: bool,
}

/// Capture contract shared by every microphone variant.
///
/// The publisher drives these calls: `create` while preparing audio,
/// `start`/`stop` around publishing or preview, `release` on teardown.
pub trait AudioCapture: Send {
    /// Record the requested parameters. Returns `false` if they cannot be
    /// honoured by this source.
    fn create(&mut self, params: AudioInputParams) -> bool;

    /// Open the hardware and deliver frames to `sink`.
    fn start(&mut self, sink: PcmFrameSink) -> Result<(), StreamError>;

    /// Release the hardware. Safe to call when not running.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    fn release(&mut self) {
        self.stop();
    }

    /// Largest PCM chunk, in bytes, the encoder must accept.
    fn max_input_size(&self) -> usize;
}
