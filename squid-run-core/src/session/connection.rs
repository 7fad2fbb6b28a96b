//! Hand-off of publisher connection callbacks to the control thread.
//!
//! The publisher calls into [`ConnectionEventSink`] from its network thread.
//! Each callback is stamped and queued; the controller drains the queue on
//! its own thread and appends to the telemetry buffer.

use crossbeam_channel::{Receiver, Sender};

use crate::models::event::{ConnectionEvent, StreamingEvent};

/// Publisher-facing end of the connection event queue. Never blocks.
#[derive(Clone)]
pub struct ConnectionEventSink {
    tx: Sender<StreamingEvent>,
}

impl ConnectionEventSink {
    pub fn notify(&self, event: ConnectionEvent) {
        let stamped = StreamingEvent::now(&event);
        if self.tx.send(stamped).is_err() {
            log::debug!("Dropping connection event {} (controller gone)", event);
        }
    }

    pub fn on_auth_error(&self) {
        self.notify(ConnectionEvent::AuthError);
    }

    pub fn on_auth_success(&self) {
        self.notify(ConnectionEvent::AuthSuccess);
    }

    pub fn on_connection_failed(&self, reason: &str) {
        self.notify(ConnectionEvent::ConnectionFailed {
            reason: reason.to_string(),
        });
    }

    pub fn on_connection_started(&self, url: &str) {
        self.notify(ConnectionEvent::ConnectionStarted {
            url: url.to_string(),
        });
    }

    pub fn on_connection_success(&self) {
        self.notify(ConnectionEvent::ConnectionSuccess);
    }

    pub fn on_disconnect(&self) {
        self.notify(ConnectionEvent::Disconnect);
    }

    pub fn on_new_bitrate(&self, bitrate: u64) {
        self.notify(ConnectionEvent::NewBitrate { bitrate });
    }
}

/// Creates the sink and the control-thread receiver.
pub(crate) fn connection_channel() -> (ConnectionEventSink, Receiver<StreamingEvent>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (ConnectionEventSink { tx }, rx)
}
