use thiserror::Error;

/// Errors produced while preparing, starting, or driving a streaming session.
///
/// Every controller operation returns these as values; nothing escapes the
/// controller boundary as a panic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Stream URL or stream key is absent.
    #[error("stream destination is not configured")]
    ConfigurationMissing,

    #[error("required permission not granted")]
    PermissionDenied,

    /// Bitrate, sample rate, or dimension combination rejected by the
    /// encoder or by the microphone's fixed rate table.
    #[error("unsupported parameter: {0}")]
    UnsupportedParameter(String),

    #[error("hardware unavailable: {0}")]
    HardwareUnavailable(String),

    #[error("transport failure: {0}")]
    TransportFailure(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}
