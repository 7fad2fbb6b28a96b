use std::fmt;

use chrono::{Local, NaiveDateTime, Timelike};
use serde::Serialize;

/// Connection-lifecycle notifications reported by the media publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConnectionEvent {
    AuthError,
    AuthSuccess,
    ConnectionFailed { reason: String },
    ConnectionStarted { url: String },
    ConnectionSuccess,
    Disconnect,
    NewBitrate { bitrate: u64 },
}

impl fmt::Display for ConnectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthError => f.write_str("onAuthError"),
            Self::AuthSuccess => f.write_str("onAuthSuccess"),
            Self::ConnectionFailed { reason } => write!(f, "onConnectionFailed: {}", reason),
            Self::ConnectionStarted { url } => write!(f, "onConnectionStarted: {}", url),
            Self::ConnectionSuccess => f.write_str("onConnectionSuccess"),
            Self::Disconnect => f.write_str("onDisconnect"),
            Self::NewBitrate { bitrate } => write!(f, "onNewBitrate: {}", bitrate),
        }
    }
}

/// A timestamped telemetry record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamingEvent {
    timestamp: NaiveDateTime,
    message: String,
}

impl StreamingEvent {
    /// Stamps `event` with the current local time.
    pub fn now(event: &ConnectionEvent) -> Self {
        Self::at(Local::now().naive_local(), event.to_string())
    }

    pub fn at(timestamp: NaiveDateTime, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `"HH:MM:SS[.fraction] message"`, the line format shown to operators.
    ///
    /// The fraction carries no trailing zeros and is omitted when zero.
    pub fn render(&self) -> String {
        let mut line = self.timestamp.format("%H:%M:%S").to_string();
        // leap seconds are encoded as nanos >= 1e9
        let nanos = self.timestamp.nanosecond() % 1_000_000_000;
        if nanos != 0 {
            let fraction = format!("{:09}", nanos);
            line.push('.');
            line.push_str(fraction.trim_end_matches('0'));
        }
        line.push(' ');
        line.push_str(&self.message);
        line
    }
}
