use crate::audio::MicrophoneSource;
use crate::models::error::StreamError;
use crate::models::geometry::CropGeometry;
use crate::session::connection::ConnectionEventSink;
use crate::traits::environment::CameraInfo;

/// Opaque identifier of a display surface owned by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// A filter installed on the publisher's rendering pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderFilter {
    Crop(CropGeometry),
    Rotation { degrees: u16 },
}

/// Encoder video parameters.
///
/// `width` and `height` describe the frame before `rotation` is applied; the
/// publisher swaps them itself when `rotation` is 90 or 270.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoParams {
    pub width: u32,
    pub height: u32,
    pub bitrate_bps: u32,
    /// Device rotation in degrees.
    pub rotation: u16,
}

/// Encoder audio parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioParams {
    pub sample_rate: u32,
    pub stereo: bool,
    pub bitrate_bps: u32,
    pub echo_canceler: bool,
}

/// Rendering stage between camera and encoder.
pub trait RenderInterface {
    fn set_auto_handle_orientation(&mut self, enabled: bool);

    fn add_filter(&mut self, filter: RenderFilter);

    /// Remove every installed filter.
    fn clear_filters(&mut self);
}

/// Capture-encode-publish session provided by the media library.
///
/// `prepare_*` return `Ok(false)` when the encoder refuses the parameters and
/// `Err` when a source fails outright. Connection progress after
/// `start_stream` is reported only through the [`ConnectionEventSink`].
pub trait MediaPublisher: Send {
    fn render_interface(&mut self) -> &mut dyn RenderInterface;

    fn prepare_video(&mut self, params: &VideoParams) -> Result<bool, StreamError>;

    fn prepare_audio(&mut self, params: &AudioParams) -> Result<bool, StreamError>;

    /// Begin publishing to `url`. Does not wait for the connection.
    fn start_stream(&mut self, url: &str) -> Result<(), StreamError>;

    fn stop_stream(&mut self);

    fn is_streaming(&self) -> bool;

    fn start_preview(
        &mut self,
        surface: SurfaceHandle,
        width: u32,
        height: u32,
    ) -> Result<(), StreamError>;

    fn stop_preview(&mut self);

    fn is_on_preview(&self) -> bool;

    /// Free encoder, camera, microphone and network handles.
    fn release(&mut self);
}

/// Everything a new publisher is built from.
pub struct PublisherComponents {
    pub camera: CameraInfo,
    pub microphone: MicrophoneSource,
    pub connection: ConnectionEventSink,
}

/// Builds publisher instances for the session controller.
pub trait PublisherFactory {
    fn create(&self, components: PublisherComponents)
        -> Result<Box<dyn MediaPublisher>, StreamError>;
}
