use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use uuid::Uuid;

use crate::audio::MicrophoneSource;
use crate::models::config::StreamConfiguration;
use crate::models::error::StreamError;
use crate::models::event::StreamingEvent;
use crate::models::geometry::{Orientation, Resolution};
use crate::models::state::SessionState;
use crate::processing::crop_resolver::resolve_crop;
use crate::processing::telemetry::{EventTelemetryBuffer, TelemetryView};
use crate::session::connection::{connection_channel, ConnectionEventSink};
use crate::session::preview::{PreviewRequest, PreviewStatus, PreviewTask};
use crate::session::state_watch::{SessionStateView, SessionStateWatch};
use crate::traits::audio_record::AudioRecordBackend;
use crate::traits::environment::DeviceEnvironment;
use crate::traits::publisher::{
    AudioParams, MediaPublisher, PublisherComponents, PublisherFactory, RenderFilter,
    RenderInterface, SurfaceHandle, VideoParams,
};

/// Conditions the wearer is told about through a haptic pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorAlert {
    /// A required permission is missing at launch.
    PermissionMissing,
    /// Stream URL or key is missing at launch.
    DestinationMissing,
    /// The shutter key could not start publishing.
    StartFailed,
}

impl OperatorAlert {
    /// Number of short vibration pulses signalling this alert.
    pub fn pulse_count(self) -> u8 {
        match self {
            Self::PermissionMissing | Self::StartFailed => 2,
            Self::DestinationMissing => 3,
        }
    }
}

struct ActivePublisher {
    id: Uuid,
    publisher: Box<dyn MediaPublisher>,
}

/// The publisher exists exactly when the session is not idle.
enum Session {
    Idle,
    Prepared(ActivePublisher),
    Streaming(ActivePublisher),
}

impl Session {
    fn state(&self) -> SessionState {
        match self {
            Self::Idle => SessionState::Idle,
            Self::Prepared(_) => SessionState::Prepared,
            Self::Streaming(_) => SessionState::Streaming,
        }
    }

    fn active(&self) -> Option<&ActivePublisher> {
        match self {
            Self::Prepared(active) | Self::Streaming(active) => Some(active),
            Self::Idle => None,
        }
    }

    fn active_mut(&mut self) -> Option<&mut ActivePublisher> {
        match self {
            Self::Prepared(active) | Self::Streaming(active) => Some(active),
            Self::Idle => None,
        }
    }

    fn publisher_mut(&mut self) -> Option<&mut dyn MediaPublisher> {
        match self {
            Self::Prepared(active) | Self::Streaming(active) => Some(active.publisher.as_mut()),
            Self::Idle => None,
        }
    }

    fn set_streaming(&mut self, streaming: bool) {
        *self = match std::mem::replace(self, Self::Idle) {
            Self::Prepared(active) | Self::Streaming(active) if streaming => {
                Self::Streaming(active)
            }
            Self::Prepared(active) | Self::Streaming(active) => Self::Prepared(active),
            Self::Idle => Self::Idle,
        };
    }

    fn take(&mut self) -> Option<ActivePublisher> {
        match std::mem::replace(self, Self::Idle) {
            Self::Prepared(active) | Self::Streaming(active) => Some(active),
            Self::Idle => None,
        }
    }
}

/// Owns the publisher lifecycle: prepare, publish, preview and teardown.
///
/// Every method must be called from one control thread. Connection callbacks
/// from the publisher are queued and only reach the telemetry buffer through
/// [`pump_events`](Self::pump_events), so the controller itself needs no
/// locking. Observers on other threads use [`state_view`](Self::state_view)
/// and [`telemetry`](Self::telemetry).
///
/// ```text
/// [DeviceEnvironment] ──camera/orientation──┐
/// [AudioRecordBackend] → [MicrophoneSource] ├→ [PublisherFactory] → [MediaPublisher]
/// [ConnectionEventSink] ────────────────────┘            │
///                 ↓ (queued)                              ↓ callbacks
///        pump_events → [EventTelemetryBuffer] → TelemetryView subscribers
/// ```
pub struct StreamSessionController<F: PublisherFactory> {
    config: StreamConfiguration,
    factory: F,
    environment: Arc<dyn DeviceEnvironment>,
    audio_backend: Arc<dyn AudioRecordBackend>,
    session: Session,
    state: SessionStateWatch,
    preview: PreviewTask,
    telemetry: EventTelemetryBuffer,
    connection_sink: ConnectionEventSink,
    connection_events: Receiver<StreamingEvent>,
}

impl<F: PublisherFactory> StreamSessionController<F> {
    pub fn new(
        config: StreamConfiguration,
        factory: F,
        environment: Arc<dyn DeviceEnvironment>,
        audio_backend: Arc<dyn AudioRecordBackend>,
    ) -> Self {
        let (connection_sink, connection_events) = connection_channel();
        Self {
            config,
            factory,
            environment,
            audio_backend,
            session: Session::Idle,
            state: SessionStateWatch::new(),
            preview: PreviewTask::default(),
            telemetry: EventTelemetryBuffer::new(),
            connection_sink,
            connection_events,
        }
    }

    pub fn config(&self) -> &StreamConfiguration {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_prepared(&self) -> bool {
        self.state().is_prepared()
    }

    pub fn is_streaming(&self) -> bool {
        self.state().is_streaming()
    }

    pub fn state_view(&self) -> SessionStateView {
        self.state.view()
    }

    pub fn telemetry(&self) -> TelemetryView {
        self.telemetry.view()
    }

    /// Identifier of the current publisher, if one exists.
    pub fn session_id(&self) -> Option<Uuid> {
        self.session.active().map(|active| active.id)
    }

    /// Configured orientation, falling back to how the device is held.
    pub fn orientation(&self) -> Orientation {
        self.config
            .orientation
            .unwrap_or_else(|| self.environment.orientation())
    }

    /// Size of the encoded video frame.
    pub fn output_size(&self) -> Resolution {
        self.config.output_size(self.orientation())
    }

    pub fn all_permissions_granted(&self) -> bool {
        self.environment.all_permissions_granted()
    }

    /// What keeps streaming from being possible at launch, if anything.
    pub fn launch_issue(&self) -> Option<OperatorAlert> {
        if !self.all_permissions_granted() {
            Some(OperatorAlert::PermissionMissing)
        } else if !self.config.has_destination() {
            Some(OperatorAlert::DestinationMissing)
        } else {
            None
        }
    }

    /// Build and configure the publisher.
    ///
    /// Reuses the existing publisher when already prepared. On failure any
    /// partially built publisher is released and the session stays idle.
    pub fn prepare(&mut self) -> Result<(), StreamError> {
        let result = self.try_prepare();
        if let Err(ref e) = result {
            log::warn!("Prepare failed: {}", e);
        }
        result
    }

    fn try_prepare(&mut self) -> Result<(), StreamError> {
        if let Some(active) = self.session.active() {
            log::debug!("Session {} already prepared, reusing publisher", active.id);
            return Ok(());
        }
        if !self.config.has_destination() {
            return Err(StreamError::ConfigurationMissing);
        }
        if !self.all_permissions_granted() {
            return Err(StreamError::PermissionDenied);
        }
        self.config.validate()?;
        if !MicrophoneSource::supports_sample_rate(
            self.config.mic_mode,
            self.config.audio_sample_rate_hz,
        ) {
            return Err(StreamError::UnsupportedParameter(format!(
                "sample rate {} Hz is not supported by the {:?} microphone",
                self.config.audio_sample_rate_hz, self.config.mic_mode
            )));
        }

        let mut active = self.build_publisher()?;
        if let Err(e) = self.configure_encoders(active.publisher.as_mut()) {
            log::debug!("Discarding publisher {}", active.id);
            active.publisher.release();
            return Err(e);
        }

        let output = self.output_size();
        log::info!(
            "Prepared session {}: {}x{} @ {} kbps, {} Hz {} ch @ {} kbps, mic {:?}",
            active.id,
            output.width,
            output.height,
            self.config.video_bitrate_kbps(),
            self.config.audio_sample_rate_hz,
            self.config.audio_channel.count(),
            self.config.audio_bitrate_kbps(),
            self.config.mic_mode
        );
        self.session = Session::Prepared(active);
        self.state.set(SessionState::Prepared);

        if let Some(publisher) = self.session.publisher_mut() {
            self.preview.resume(publisher);
        }
        Ok(())
    }

    fn build_publisher(&self) -> Result<ActivePublisher, StreamError> {
        let orientation = self.orientation();
        let camera = self.environment.camera()?;
        let sensor = camera.max_resolution;
        log::debug!(
            "Camera {} max {}x{}, device {:?}",
            camera.id,
            sensor.width,
            sensor.height,
            orientation
        );

        let microphone =
            MicrophoneSource::for_mode(self.config.mic_mode, Arc::clone(&self.audio_backend));
        let mut publisher = self.factory.create(PublisherComponents {
            camera,
            microphone,
            connection: self.connection_sink.clone(),
        })?;

        install_filters(publisher.render_interface(), &self.config, orientation, sensor);
        Ok(ActivePublisher {
            id: Uuid::new_v4(),
            publisher,
        })
    }

    fn configure_encoders(&self, publisher: &mut dyn MediaPublisher) -> Result<(), StreamError> {
        let orientation = self.orientation();
        let frame = encoder_frame(self.config.output_size(orientation), orientation);
        let video = VideoParams {
            width: frame.width,
            height: frame.height,
            bitrate_bps: self.config.video_bitrate_bps,
            rotation: orientation.rotation_degrees(),
        };
        let audio = AudioParams {
            sample_rate: self.config.audio_sample_rate_hz,
            stereo: self.config.audio_channel.is_stereo(),
            bitrate_bps: self.config.audio_bitrate_bps,
            echo_canceler: self.config.echo_canceler,
        };

        let video_ready = publisher.prepare_video(&video);
        let audio_ready = publisher.prepare_audio(&audio);
        if !video_ready? {
            return Err(StreamError::UnsupportedParameter(format!(
                "video {}x{} @ {} bps",
                video.width, video.height, video.bitrate_bps
            )));
        }
        if !audio_ready? {
            return Err(StreamError::UnsupportedParameter(format!(
                "audio {} Hz {} ch @ {} bps",
                audio.sample_rate,
                self.config.audio_channel.count(),
                audio.bitrate_bps
            )));
        }
        Ok(())
    }

    /// Begin publishing to `url/key`.
    ///
    /// The session is streaming once the publisher accepts the request; the
    /// connection outcome arrives later as telemetry. On failure the session
    /// stays prepared.
    pub fn start_streaming(&mut self) -> Result<(), StreamError> {
        let result = self.try_start_streaming();
        if let Err(ref e) = result {
            log::warn!("Start streaming failed: {}", e);
        }
        result
    }

    fn try_start_streaming(&mut self) -> Result<(), StreamError> {
        let destination = self
            .config
            .destination
            .as_ref()
            .ok_or(StreamError::ConfigurationMissing)?;
        let active = self
            .session
            .active_mut()
            .ok_or_else(|| StreamError::InvalidState("session is not prepared".into()))?;

        if active.publisher.is_streaming() {
            log::debug!("Session {} already publishing", active.id);
        } else {
            active.publisher.start_stream(&destination.publish_url())?;
            log::info!("Session {} publishing to {}", active.id, destination.url);
        }

        self.session.set_streaming(true);
        self.state.set(SessionState::Streaming);
        Ok(())
    }

    /// Stop publishing. The publisher, preview included, stays prepared.
    pub fn stop_streaming(&mut self) {
        let was_streaming = self.session.state().is_streaming();
        let Some(active) = self.session.active_mut() else {
            log::debug!("Stop streaming ignored, nothing prepared");
            return;
        };
        if was_streaming || active.publisher.is_streaming() {
            active.publisher.stop_stream();
            log::info!("Session {} stopped publishing", active.id);
        }
        self.session.set_streaming(false);
        self.state.set(SessionState::Prepared);
    }

    /// Start when prepared, stop when streaming. Returns the resulting state.
    ///
    /// A failed start is reported to the wearer as
    /// [`OperatorAlert::StartFailed`].
    pub fn toggle_streaming(&mut self) -> Result<SessionState, StreamError> {
        if self.is_streaming() {
            self.stop_streaming();
        } else {
            self.start_streaming()?;
        }
        Ok(self.state())
    }

    /// Render the preview onto `surface`, now or once prepared.
    pub fn start_preview(&mut self, surface: SurfaceHandle, width: u32, height: u32) -> PreviewStatus {
        let request = PreviewRequest {
            surface,
            width,
            height,
        };
        self.preview.start(request, self.session.publisher_mut())
    }

    pub fn stop_preview(&mut self) {
        self.preview.stop(self.session.publisher_mut());
    }

    pub fn is_preview_attached(&self) -> bool {
        self.preview.is_attached()
    }

    /// A surface is waiting for `prepare` to succeed.
    pub fn is_preview_pending(&self) -> bool {
        self.preview.is_pending()
    }

    pub fn on_resume(&mut self) -> Result<(), StreamError> {
        self.prepare()
    }

    pub fn on_pause(&mut self) {
        self.stop_streaming();
    }

    pub fn on_surface_created(&mut self, surface: SurfaceHandle) {
        log::debug!("Surface {:?} created", surface);
    }

    /// Preview follows the surface only when enabled in the configuration.
    pub fn on_surface_changed(
        &mut self,
        surface: SurfaceHandle,
        width: u32,
        height: u32,
    ) -> Option<PreviewStatus> {
        if !self.config.preview {
            return None;
        }
        Some(self.start_preview(surface, width, height))
    }

    pub fn on_surface_destroyed(&mut self, surface: SurfaceHandle) {
        log::debug!("Surface {:?} destroyed", surface);
        if self.config.preview {
            self.stop_preview();
        }
    }

    /// Move queued connection events into telemetry. Returns how many moved.
    pub fn pump_events(&mut self) -> usize {
        let mut moved = 0;
        while let Ok(event) = self.connection_events.try_recv() {
            self.record(event);
            moved += 1;
        }
        moved
    }

    /// Like [`pump_events`](Self::pump_events), waiting up to `timeout` for
    /// the first event.
    pub fn pump_events_timeout(&mut self, timeout: Duration) -> usize {
        match self.connection_events.recv_timeout(timeout) {
            Ok(event) => {
                self.record(event);
                1 + self.pump_events()
            }
            Err(_) => 0,
        }
    }

    fn record(&mut self, event: StreamingEvent) {
        log::info!("Connection: {}", event.message());
        self.telemetry.append(event);
    }

    /// Stop everything and free the publisher. Safe to call repeatedly.
    pub fn release(&mut self) {
        self.preview.stop(self.session.publisher_mut());
        if let Some(mut active) = self.session.take() {
            if active.publisher.is_streaming() {
                active.publisher.stop_stream();
            }
            active.publisher.release();
            log::info!("Released session {}", active.id);
        }
        self.state.set(SessionState::Idle);
    }
}

impl<F: PublisherFactory> Drop for StreamSessionController<F> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Install crop and rotation so the encoded frame has the output's shape.
fn install_filters(
    render: &mut dyn RenderInterface,
    config: &StreamConfiguration,
    device: Orientation,
    sensor: Resolution,
) {
    render.clear_filters();
    render.set_auto_handle_orientation(false);
    let output = config.output_size(device);

    if config.is_crop_mode() {
        let crop = resolve_crop(sensor, output);
        log::debug!(
            "Crop filter x={:.4}% y={:.4}% w={:.4}% h={:.4}%",
            crop.offset_x_percent,
            crop.offset_y_percent,
            crop.width_percent,
            crop.height_percent
        );
        render.add_filter(RenderFilter::Crop(crop));
    }
    if let Some(degrees) = compensating_rotation(device, output.orientation()) {
        log::debug!("Rotation filter {} deg", degrees);
        render.add_filter(RenderFilter::Rotation { degrees });
    }
}

/// Frame size handed to the encoder. The encoder swaps width and height
/// itself for a portrait rotation, so that case is given pre-swapped.
fn encoder_frame(output: Resolution, device: Orientation) -> Resolution {
    match device {
        Orientation::Landscape => output,
        Orientation::Portrait => output.swapped(),
    }
}

fn compensating_rotation(device: Orientation, encoded: Orientation) -> Option<u16> {
    match (device, encoded) {
        (Orientation::Landscape, Orientation::Portrait) => Some(270),
        (Orientation::Portrait, Orientation::Landscape) => Some(90),
        _ => None,
    }
}
