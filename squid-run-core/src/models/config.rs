use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::StreamError;
use super::geometry::{Orientation, Resolution};

/// Flat key/value settings document handed over by the settings loader.
pub type Settings = Map<String, Value>;

pub const DEFAULT_VIDEO_BITRATE_BPS: u32 = 4 * 1024 * 1024;
pub const DEFAULT_AUDIO_SAMPLE_RATE_HZ: u32 = 44_100;
pub const DEFAULT_AUDIO_BITRATE_BPS: u32 = 128 * 1024;
pub const DEFAULT_LONG_SIDE: u32 = 720;
pub const DEFAULT_SHORT_SIDE: u32 = 480;

/// Bitrates arrive in KB/s and are scaled by this factor.
const KILO: u32 = 1024;

/// Audio channel layout requested from the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioChannel {
    #[serde(rename = "monaural")]
    Mono,
    #[serde(rename = "stereo")]
    Stereo,
}

impl AudioChannel {
    pub fn is_stereo(self) -> bool {
        matches!(self, Self::Stereo)
    }

    pub fn count(self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

/// Which microphone feeds the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MicMode {
    /// The platform's standard microphone.
    #[serde(rename = "android")]
    Host,
    /// Five-channel array microphone bridged through raw PCM.
    #[serde(rename = "thinklet5")]
    MultiChannel5,
    /// Six-channel array microphone bridged through raw PCM.
    #[serde(rename = "thinklet6")]
    MultiChannel6,
}

/// Where the stream is published. URL and key are always present together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDestination {
    pub url: String,
    pub key: String,
}

impl StreamDestination {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
        }
    }

    /// `"{url}/{key}"`
    pub fn publish_url(&self) -> String {
        format!("{}/{}", self.url, self.key)
    }
}

/// Requested output frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputSize {
    /// Fixed output dimensions. The sensor frame is cropped to their aspect.
    Exact(Resolution),
    /// Long/short side pair laid out according to the device orientation.
    Sides { long: u32, short: u32 },
}

/// Configuration for a streaming session. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamConfiguration {
    /// Publish destination, or `None` when URL or key is missing.
    pub destination: Option<StreamDestination>,

    pub output_size: OutputSize,

    /// Forced orientation; `None` follows the device.
    pub orientation: Option<Orientation>,

    pub video_bitrate_bps: u32,

    pub audio_sample_rate_hz: u32,

    pub audio_bitrate_bps: u32,

    pub audio_channel: AudioChannel,

    pub mic_mode: MicMode,

    pub echo_canceler: bool,

    /// Whether the presentation layer shows a local preview.
    pub preview: bool,
}

impl StreamConfiguration {
    /// Parse a JSON settings object.
    pub fn from_json_str(json: &str) -> Result<Self, StreamError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| StreamError::InvalidSettings(format!("malformed settings: {}", e)))?;
        match value {
            Value::Object(settings) => Ok(Self::from_settings(&settings)),
            other => Err(StreamError::InvalidSettings(format!(
                "expected a key/value object, got {}",
                other
            ))),
        }
    }

    /// Build from a settings map. Absent or malformed values take defaults.
    pub fn from_settings(settings: &Settings) -> Self {
        let url = setting::<String>(settings, "streamUrl");
        let key = setting::<String>(settings, "streamKey");
        let destination = match (url, key) {
            (Some(url), Some(key)) => Some(StreamDestination { url, key }),
            (None, None) => None,
            (url, _) => {
                log::warn!(
                    "Ignoring incomplete stream destination (missing {})",
                    if url.is_none() { "streamUrl" } else { "streamKey" }
                );
                None
            }
        };

        let output_size = match (
            setting::<u32>(settings, "width"),
            setting::<u32>(settings, "height"),
        ) {
            (Some(width), Some(height)) => OutputSize::Exact(Resolution::new(width, height)),
            _ => OutputSize::Sides {
                long: setting(settings, "longSide").unwrap_or(DEFAULT_LONG_SIDE),
                short: setting(settings, "shortSide").unwrap_or(DEFAULT_SHORT_SIDE),
            },
        };

        Self {
            destination,
            output_size,
            orientation: setting(settings, "orientation"),
            video_bitrate_bps: setting::<u32>(settings, "videoBitrate")
                .map(|kb| kb.saturating_mul(KILO))
                .unwrap_or(DEFAULT_VIDEO_BITRATE_BPS),
            audio_sample_rate_hz: setting(settings, "audioSampleRate")
                .unwrap_or(DEFAULT_AUDIO_SAMPLE_RATE_HZ),
            audio_bitrate_bps: setting::<u32>(settings, "audioBitrate")
                .map(|kb| kb.saturating_mul(KILO))
                .unwrap_or(DEFAULT_AUDIO_BITRATE_BPS),
            audio_channel: setting(settings, "audioChannel").unwrap_or(AudioChannel::Stereo),
            mic_mode: setting(settings, "micMode").unwrap_or(MicMode::Host),
            echo_canceler: setting(settings, "echoCanceler").unwrap_or(false),
            preview: setting(settings, "preview").unwrap_or(false),
        }
    }

    /// Reject values no encoder can accept before any hardware is touched.
    pub fn validate(&self) -> Result<(), StreamError> {
        let size = self.output_size(Orientation::Landscape);
        if size.is_empty() {
            return Err(StreamError::UnsupportedParameter(format!(
                "output size {}x{}",
                size.width, size.height
            )));
        }
        if self.video_bitrate_bps == 0 {
            return Err(StreamError::UnsupportedParameter("video bitrate 0".into()));
        }
        if self.audio_bitrate_bps == 0 {
            return Err(StreamError::UnsupportedParameter("audio bitrate 0".into()));
        }
        if self.audio_sample_rate_hz == 0 {
            return Err(StreamError::UnsupportedParameter("audio sample rate 0".into()));
        }
        Ok(())
    }

    pub fn has_destination(&self) -> bool {
        self.destination.is_some()
    }

    /// Encoded frame size when the device is held in `orientation`.
    pub fn output_size(&self, orientation: Orientation) -> Resolution {
        match self.output_size {
            OutputSize::Exact(size) => size,
            OutputSize::Sides { long, short } => match orientation {
                Orientation::Landscape => Resolution::new(long, short),
                Orientation::Portrait => Resolution::new(short, long),
            },
        }
    }

    /// Whether the sensor frame must be cropped to match the output aspect.
    pub fn is_crop_mode(&self) -> bool {
        matches!(self.output_size, OutputSize::Exact(_))
    }

    /// `"width:height"`, the preview view's aspect constraint.
    pub fn dimension_ratio(&self, orientation: Orientation) -> String {
        let size = self.output_size(orientation);
        format!("{}:{}", size.width, size.height)
    }

    pub fn video_bitrate_kbps(&self) -> u32 {
        self.video_bitrate_bps / KILO
    }

    pub fn audio_bitrate_kbps(&self) -> u32 {
        self.audio_bitrate_bps / KILO
    }

    pub fn sample_rate_khz(&self) -> f32 {
        self.audio_sample_rate_hz as f32 / 1000.0
    }
}

impl Default for StreamConfiguration {
    fn default() -> Self {
        Self {
            destination: None,
            output_size: OutputSize::Sides {
                long: DEFAULT_LONG_SIDE,
                short: DEFAULT_SHORT_SIDE,
            },
            orientation: None,
            video_bitrate_bps: DEFAULT_VIDEO_BITRATE_BPS,
            audio_sample_rate_hz: DEFAULT_AUDIO_SAMPLE_RATE_HZ,
            audio_bitrate_bps: DEFAULT_AUDIO_BITRATE_BPS,
            audio_channel: AudioChannel::Stereo,
            mic_mode: MicMode::Host,
            echo_canceler: false,
            preview: false,
        }
    }
}

/// Read one typed value, falling back to `None` when absent or malformed.
fn setting<T: DeserializeOwned>(settings: &Settings, key: &str) -> Option<T> {
    let value = settings.get(key)?;
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("Ignoring setting {}={}: {}", key, value, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: Value) -> StreamConfiguration {
        match value {
            Value::Object(map) => StreamConfiguration::from_settings(&map),
            _ => unreachable!("test settings must be an object"),
        }
    }

    #[test]
    fn empty_settings_use_defaults() {
        let config = parse(json!({}));
        assert_eq!(config, StreamConfiguration::default());
        assert_eq!(config.video_bitrate_bps, 4_194_304);
        assert_eq!(config.audio_bitrate_bps, 131_072);
        assert_eq!(config.audio_sample_rate_hz, 44_100);
        assert_eq!(config.output_size(Orientation::Landscape), Resolution::new(720, 480));
    }

    #[test]
    fn bitrates_scale_from_kilobytes() {
        let config = parse(json!({ "videoBitrate": 4096, "audioBitrate": 128 }));
        assert_eq!(config.video_bitrate_bps, 4096 * 1024);
        assert_eq!(config.audio_bitrate_bps, 128 * 1024);
        assert_eq!(config.video_bitrate_kbps(), 4096);
    }

    #[test]
    fn destination_requires_both_url_and_key() {
        let full = parse(json!({ "streamUrl": "rtmp://x", "streamKey": "k" }));
        assert_eq!(full.destination.unwrap().publish_url(), "rtmp://x/k");

        assert!(parse(json!({ "streamUrl": "rtmp://x" })).destination.is_none());
        assert!(parse(json!({ "streamKey": "k" })).destination.is_none());
    }

    #[test]
    fn enum_values_use_argument_strings() {
        let config = parse(json!({
            "orientation": "portrait",
            "audioChannel": "monaural",
            "micMode": "thinklet6",
            "echoCanceler": true,
            "preview": true,
        }));
        assert_eq!(config.orientation, Some(Orientation::Portrait));
        assert_eq!(config.audio_channel, AudioChannel::Mono);
        assert_eq!(config.mic_mode, MicMode::MultiChannel6);
        assert!(config.echo_canceler);
        assert!(config.preview);
    }

    #[test]
    fn unknown_values_fall_back_to_defaults() {
        let config = parse(json!({
            "orientation": "diagonal",
            "audioChannel": "surround",
            "micMode": "thinklet7",
            "audioSampleRate": "fast",
            "unrelated": 42,
        }));
        assert_eq!(config.orientation, None);
        assert_eq!(config.audio_channel, AudioChannel::Stereo);
        assert_eq!(config.mic_mode, MicMode::Host);
        assert_eq!(config.audio_sample_rate_hz, DEFAULT_AUDIO_SAMPLE_RATE_HZ);
    }

    #[test]
    fn sides_follow_orientation() {
        let config = parse(json!({ "longSide": 1280, "shortSide": 720 }));
        assert!(!config.is_crop_mode());
        assert_eq!(config.output_size(Orientation::Landscape), Resolution::new(1280, 720));
        assert_eq!(config.output_size(Orientation::Portrait), Resolution::new(720, 1280));
        assert_eq!(config.dimension_ratio(Orientation::Portrait), "720:1280");
    }

    #[test]
    fn explicit_size_selects_crop_mode() {
        let config = parse(json!({ "width": 480, "height": 720 }));
        assert!(config.is_crop_mode());
        assert_eq!(config.output_size(Orientation::Landscape), Resolution::new(480, 720));
    }

    #[test]
    fn validate_rejects_zero_values() {
        assert!(StreamConfiguration::default().validate().is_ok());
        let config = parse(json!({ "videoBitrate": 0 }));
        assert!(matches!(config.validate(), Err(StreamError::UnsupportedParameter(_))));
        let config = parse(json!({ "width": 0, "height": 480 }));
        assert!(matches!(config.validate(), Err(StreamError::UnsupportedParameter(_))));
    }

    #[test]
    fn json_must_be_an_object() {
        assert!(StreamConfiguration::from_json_str(r#"{"streamUrl":"rtmp://x"}"#).is_ok());
        assert!(matches!(
            StreamConfiguration::from_json_str("[1, 2]"),
            Err(StreamError::InvalidSettings(_))
        ));
        assert!(matches!(
            StreamConfiguration::from_json_str("{"),
            Err(StreamError::InvalidSettings(_))
        ));
    }
}
