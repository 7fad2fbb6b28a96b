//! # squid-run-core
//!
//! Live-streaming session core for a head-mounted wearable camera.
//!
//! Builds an RTMP publisher from the device camera and microphone, fits the
//! sensor frame to the configured output size, and reports connection
//! progress as a bounded telemetry feed. The media library, camera and
//! audio hardware sit behind traits so the core runs anywhere.
//!
//! ## Architecture
//!
//! ```text
//! squid-run-core (this crate)
//! ├── traits/       ← MediaPublisher, PublisherFactory, DeviceEnvironment, AudioCapture, AudioRecordBackend
//! ├── models/       ← StreamConfiguration, StreamError, SessionState, ConnectionEvent, geometry
//! ├── audio/        ← MicrophoneSource: host and multi-channel array microphones
//! ├── processing/   ← crop resolution, telemetry broadcast
//! └── session/      ← StreamSessionController, preview binding, state watch
//! ```

pub mod audio;
pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

#[cfg(test)]
mod test_support;

// Re-export key types at crate root for convenience.
pub use audio::{ArraySampleRate, HostMicrophone, MicrophoneSource, MultiChannelMicrophone};
pub use models::config::{AudioChannel, MicMode, OutputSize, StreamConfiguration, StreamDestination};
pub use models::error::StreamError;
pub use models::event::{ConnectionEvent, StreamingEvent};
pub use models::geometry::{CropGeometry, Orientation, Resolution};
pub use models::permission::Permission;
pub use models::state::SessionState;
pub use processing::crop_resolver::resolve_crop;
pub use processing::telemetry::{EventTelemetryBuffer, TelemetrySubscription, TelemetryView};
pub use session::connection::ConnectionEventSink;
pub use session::controller::{OperatorAlert, StreamSessionController};
pub use session::preview::{PreviewRequest, PreviewStatus};
pub use session::state_watch::SessionStateView;
pub use traits::audio_capture::{AudioCapture, AudioInputParams, PcmFrame, PcmFrameSink};
pub use traits::audio_record::{AudioRecordBackend, AudioRecordHandle, RawPcmCallback, RecordRequest};
pub use traits::environment::{CameraInfo, DeviceEnvironment};
pub use traits::publisher::{
    AudioParams, MediaPublisher, PublisherComponents, PublisherFactory, RenderFilter,
    RenderInterface, SurfaceHandle, VideoParams,
};
