//! Scriptable stand-ins for the platform side: audio backend, device
//! environment and media publisher.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::audio::MicrophoneSource;
use crate::models::config::MicMode;
use crate::models::error::StreamError;
use crate::models::geometry::{Orientation, Resolution};
use crate::models::permission::Permission;
use crate::session::connection::{connection_channel, ConnectionEventSink};
use crate::traits::audio_capture::{AudioCapture, AudioInputParams, PcmFrame};
use crate::traits::audio_record::{
    AudioRecordBackend, AudioRecordHandle, RawPcmCallback, RecordRequest,
};
use crate::traits::environment::{CameraInfo, DeviceEnvironment};
use crate::traits::publisher::{
    AudioParams, MediaPublisher, PublisherComponents, PublisherFactory, RenderFilter,
    RenderInterface, SurfaceHandle, VideoParams,
};

// ---- audio ----

/// Records what was opened and lets tests push PCM into the live callback.
#[derive(Default)]
pub struct FakeAudioBackend {
    opens: AtomicUsize,
    active: Arc<AtomicUsize>,
    fail_open: AtomicBool,
    rejected_rates: Mutex<Vec<u32>>,
    last_request: Mutex<Option<RecordRequest>>,
    callback: Arc<Mutex<Option<RawPcmCallback>>>,
}

impl FakeAudioBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RecordRequest> {
        *self.last_request.lock()
    }

    pub fn fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn reject_rate(&self, hz: u32) {
        self.rejected_rates.lock().push(hz);
    }

    /// Deliver one chunk to the open recording, if any.
    pub fn emit(&self, pcm: &[u8]) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback(pcm);
        }
    }
}

impl AudioRecordBackend for FakeAudioBackend {
    fn supports(&self, request: &RecordRequest) -> bool {
        !self.rejected_rates.lock().contains(&request.sample_rate)
    }

    fn open(
        &self,
        request: &RecordRequest,
        callback: RawPcmCallback,
    ) -> Result<Box<dyn AudioRecordHandle>, StreamError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(StreamError::HardwareUnavailable("fake recorder busy".into()));
        }
        *self.last_request.lock() = Some(*request);
        *self.callback.lock() = Some(callback);
        self.active.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeRecording {
            active: Arc::clone(&self.active),
            callback: Arc::clone(&self.callback),
            stopped: false,
        }))
    }
}

struct FakeRecording {
    active: Arc<AtomicUsize>,
    callback: Arc<Mutex<Option<RawPcmCallback>>>,
    stopped: bool,
}

impl AudioRecordHandle for FakeRecording {
    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.callback.lock().take();
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Drop for FakeRecording {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---- device ----

struct EnvironmentState {
    denied: HashSet<Permission>,
    api_level: u32,
    orientation: Orientation,
    camera: Result<CameraInfo, StreamError>,
}

/// Landscape device on API 30 with every permission granted and a
/// 1920x1080 back camera.
pub struct FakeEnvironment {
    state: Mutex<EnvironmentState>,
}

impl FakeEnvironment {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(EnvironmentState {
                denied: HashSet::new(),
                api_level: 30,
                orientation: Orientation::Landscape,
                camera: Ok(fake_camera()),
            }),
        })
    }

    pub fn deny(&self, permission: Permission) {
        self.state.lock().denied.insert(permission);
    }

    pub fn set_api_level(&self, api_level: u32) {
        self.state.lock().api_level = api_level;
    }

    pub fn set_orientation(&self, orientation: Orientation) {
        self.state.lock().orientation = orientation;
    }

    pub fn set_camera(&self, camera: Result<CameraInfo, StreamError>) {
        self.state.lock().camera = camera;
    }
}

impl DeviceEnvironment for FakeEnvironment {
    fn is_permission_granted(&self, permission: Permission) -> bool {
        !self.state.lock().denied.contains(&permission)
    }

    fn api_level(&self) -> u32 {
        self.state.lock().api_level
    }

    fn orientation(&self) -> Orientation {
        self.state.lock().orientation
    }

    fn camera(&self) -> Result<CameraInfo, StreamError> {
        self.state.lock().camera.clone()
    }
}

pub fn fake_camera() -> CameraInfo {
    CameraInfo {
        id: "0".into(),
        max_resolution: Resolution::new(1920, 1080),
    }
}

// ---- publisher ----

/// Everything a fake publisher was asked to do.
#[derive(Debug, Default)]
pub struct PublisherProbe {
    pub camera: Option<CameraInfo>,
    pub mic_mode: Option<MicMode>,
    pub auto_orientation: Option<bool>,
    pub filter_clears: usize,
    pub filters: Vec<RenderFilter>,
    pub video: Option<VideoParams>,
    pub audio: Option<AudioParams>,
    pub urls: Vec<String>,
    pub streaming: bool,
    pub stream_stops: usize,
    pub preview: Option<(SurfaceHandle, u32, u32)>,
    pub preview_starts: usize,
    pub preview_stops: usize,
    pub released: bool,
}

/// Failures a fake publisher should produce.
#[derive(Debug, Clone, Default)]
pub struct PublisherScript {
    pub fail_create: bool,
    pub reject_video: bool,
    pub reject_audio: bool,
    pub fail_start: bool,
    pub fail_preview: bool,
}

struct FakeRender {
    probe: Arc<Mutex<PublisherProbe>>,
}

impl RenderInterface for FakeRender {
    fn set_auto_handle_orientation(&mut self, enabled: bool) {
        self.probe.lock().auto_orientation = Some(enabled);
    }

    fn add_filter(&mut self, filter: RenderFilter) {
        self.probe.lock().filters.push(filter);
    }

    fn clear_filters(&mut self) {
        let mut probe = self.probe.lock();
        probe.filters.clear();
        probe.filter_clears += 1;
    }
}

pub struct FakePublisher {
    render: FakeRender,
    probe: Arc<Mutex<PublisherProbe>>,
    script: PublisherScript,
    microphone: MicrophoneSource,
    connection: ConnectionEventSink,
}

impl FakePublisher {
    pub fn new(
        components: PublisherComponents,
        script: PublisherScript,
    ) -> (Self, Arc<Mutex<PublisherProbe>>) {
        let probe = Arc::new(Mutex::new(PublisherProbe {
            camera: Some(components.camera),
            mic_mode: Some(components.microphone.mic_mode()),
            ..PublisherProbe::default()
        }));
        let publisher = Self {
            render: FakeRender {
                probe: Arc::clone(&probe),
            },
            probe: Arc::clone(&probe),
            script,
            microphone: components.microphone,
            connection: components.connection,
        };
        (publisher, probe)
    }

    /// A publisher outside any controller.
    pub fn standalone() -> (Self, Arc<Mutex<PublisherProbe>>) {
        let (connection, _events) = connection_channel();
        let components = PublisherComponents {
            camera: fake_camera(),
            microphone: MicrophoneSource::for_mode(MicMode::Host, FakeAudioBackend::new()),
            connection,
        };
        Self::new(components, PublisherScript::default())
    }

    pub fn fail_preview(&mut self, fail: bool) {
        self.script.fail_preview = fail;
    }
}

impl MediaPublisher for FakePublisher {
    fn render_interface(&mut self) -> &mut dyn RenderInterface {
        &mut self.render
    }

    fn prepare_video(&mut self, params: &VideoParams) -> Result<bool, StreamError> {
        self.probe.lock().video = Some(*params);
        Ok(!self.script.reject_video)
    }

    fn prepare_audio(&mut self, params: &AudioParams) -> Result<bool, StreamError> {
        self.probe.lock().audio = Some(*params);
        if self.script.reject_audio {
            return Ok(false);
        }
        Ok(self.microphone.create(AudioInputParams {
            sample_rate: params.sample_rate,
            stereo: params.stereo,
            echo_canceler: params.echo_canceler,
            noise_suppressor: false,
        }))
    }

    fn start_stream(&mut self, url: &str) -> Result<(), StreamError> {
        if self.script.fail_start {
            return Err(StreamError::TransportFailure("fake connect refused".into()));
        }
        self.microphone.start(Arc::new(|_: PcmFrame| {}))?;
        {
            let mut probe = self.probe.lock();
            probe.urls.push(url.to_string());
            probe.streaming = true;
        }
        self.connection.on_connection_started(url);
        Ok(())
    }

    fn stop_stream(&mut self) {
        self.microphone.stop();
        let mut probe = self.probe.lock();
        probe.streaming = false;
        probe.stream_stops += 1;
    }

    fn is_streaming(&self) -> bool {
        self.probe.lock().streaming
    }

    fn start_preview(
        &mut self,
        surface: SurfaceHandle,
        width: u32,
        height: u32,
    ) -> Result<(), StreamError> {
        if self.script.fail_preview {
            return Err(StreamError::HardwareUnavailable("fake surface invalid".into()));
        }
        let mut probe = self.probe.lock();
        probe.preview = Some((surface, width, height));
        probe.preview_starts += 1;
        Ok(())
    }

    fn stop_preview(&mut self) {
        let mut probe = self.probe.lock();
        probe.preview = None;
        probe.preview_stops += 1;
    }

    fn is_on_preview(&self) -> bool {
        self.probe.lock().preview.is_some()
    }

    fn release(&mut self) {
        if self.is_streaming() {
            self.stop_stream();
        }
        if self.is_on_preview() {
            self.stop_preview();
        }
        self.microphone.release();
        self.probe.lock().released = true;
    }
}

/// Shares its bookkeeping across clones, so a test keeps a handle while the
/// controller owns another.
#[derive(Clone, Default)]
pub struct FakePublisherFactory {
    script: Arc<Mutex<PublisherScript>>,
    probes: Arc<Mutex<Vec<Arc<Mutex<PublisherProbe>>>>>,
    connections: Arc<Mutex<Vec<ConnectionEventSink>>>,
}

impl FakePublisherFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjust the failures of publishers created from now on.
    pub fn script(&self, edit: impl FnOnce(&mut PublisherScript)) {
        edit(&mut self.script.lock());
    }

    pub fn created(&self) -> usize {
        self.probes.lock().len()
    }

    pub fn probe(&self, index: usize) -> Arc<Mutex<PublisherProbe>> {
        Arc::clone(&self.probes.lock()[index])
    }

    pub fn last(&self) -> Arc<Mutex<PublisherProbe>> {
        let probes = self.probes.lock();
        Arc::clone(probes.last().expect("no publisher created"))
    }

    /// Connection sink handed to the most recent publisher.
    pub fn connection(&self) -> ConnectionEventSink {
        let connections = self.connections.lock();
        connections.last().expect("no publisher created").clone()
    }
}

impl PublisherFactory for FakePublisherFactory {
    fn create(
        &self,
        components: PublisherComponents,
    ) -> Result<Box<dyn MediaPublisher>, StreamError> {
        let script = self.script.lock().clone();
        if script.fail_create {
            return Err(StreamError::HardwareUnavailable("fake camera busy".into()));
        }
        self.connections.lock().push(components.connection.clone());
        let (publisher, probe) = FakePublisher::new(components, script);
        self.probes.lock().push(probe);
        Ok(Box::new(publisher))
    }
}
