//! Connection telemetry: an append-only broadcast of [`StreamingEvent`]s.
//!
//! The session controller owns the write side ([`EventTelemetryBuffer`]).
//! Presentation code holds a [`TelemetryView`] and subscribes; each new
//! subscriber first receives the most recent [`REPLAY_CAPACITY`] events, then
//! every new one. A subscription folds what it receives into a
//! [`RenderedTail`] of at most [`HISTORY_CAPACITY`] lines, oldest first.
//!
//! Appending never blocks. Any queue that overflows drops its oldest entry.

use std::collections::{vec_deque, VecDeque};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::models::event::StreamingEvent;

/// Events replayed to a new subscriber, and held per subscriber until read.
pub const REPLAY_CAPACITY: usize = 10;

/// Rendered lines kept by each subscription.
pub const HISTORY_CAPACITY: usize = 15;

/// FIFO that drops its oldest entry when full.
#[derive(Debug)]
struct DropOldest<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> DropOldest<T> {
    fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        while self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    fn iter(&self) -> vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Bounded history of rendered `"time message"` lines, oldest first.
#[derive(Debug)]
pub struct RenderedTail {
    lines: DropOldest<String>,
}

impl RenderedTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: DropOldest::new(capacity),
        }
    }

    /// Append the rendered event and return the updated history.
    pub fn push(&mut self, event: &StreamingEvent) -> Vec<String> {
        self.lines.push(event.render());
        self.lines()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    /// Most recent first, the order an event log is usually displayed in.
    pub fn newest_first(&self) -> Vec<String> {
        self.lines.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 0
    }
}

impl Default for RenderedTail {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

struct Inbox {
    events: Mutex<DropOldest<StreamingEvent>>,
    arrived: Condvar,
}

impl Inbox {
    fn deliver(&self, event: StreamingEvent) {
        self.events.lock().push(event);
        self.arrived.notify_all();
    }
}

struct Hub {
    replay: DropOldest<StreamingEvent>,
    subscribers: Vec<Weak<Inbox>>,
}

/// Write side of the telemetry broadcast.
pub struct EventTelemetryBuffer {
    hub: Arc<Mutex<Hub>>,
}

impl EventTelemetryBuffer {
    pub fn new() -> Self {
        Self {
            hub: Arc::new(Mutex::new(Hub {
                replay: DropOldest::new(REPLAY_CAPACITY),
                subscribers: Vec::new(),
            })),
        }
    }

    /// Publish `event` to every live subscriber and the replay buffer.
    pub fn append(&mut self, event: StreamingEvent) {
        let mut hub = self.hub.lock();
        hub.subscribers.retain(|weak| match weak.upgrade() {
            Some(inbox) => {
                inbox.deliver(event.clone());
                true
            }
            None => false,
        });
        hub.replay.push(event);
    }

    /// Read-only handle for observers.
    pub fn view(&self) -> TelemetryView {
        TelemetryView {
            hub: Arc::clone(&self.hub),
        }
    }
}

impl Default for EventTelemetryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of the telemetry broadcast.
#[derive(Clone)]
pub struct TelemetryView {
    hub: Arc<Mutex<Hub>>,
}

impl TelemetryView {
    /// Subscribe, starting with the replayed recent events.
    pub fn subscribe(&self) -> TelemetrySubscription {
        let inbox = Arc::new(Inbox {
            events: Mutex::new(DropOldest::new(REPLAY_CAPACITY)),
            arrived: Condvar::new(),
        });
        let mut hub = self.hub.lock();
        {
            let mut events = inbox.events.lock();
            for event in hub.replay.iter() {
                events.push(event.clone());
            }
        }
        hub.subscribers.push(Arc::downgrade(&inbox));
        TelemetrySubscription {
            inbox,
            tail: RenderedTail::default(),
        }
    }

    /// Snapshot of the replay buffer, oldest first.
    pub fn recent(&self) -> Vec<StreamingEvent> {
        self.hub.lock().replay.iter().cloned().collect()
    }
}

/// One observer's stream of rendered tails.
pub struct TelemetrySubscription {
    inbox: Arc<Inbox>,
    tail: RenderedTail,
}

impl TelemetrySubscription {
    /// Consume one pending event, returning the history it produced.
    pub fn try_next(&mut self) -> Option<Vec<String>> {
        let event = self.inbox.events.lock().pop()?;
        Some(self.tail.push(&event))
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<Vec<String>> {
        let event = {
            let mut events = self.inbox.events.lock();
            if events.len() == 0 {
                let _ = self.inbox.arrived.wait_for(&mut events, timeout);
            }
            events.pop()?
        };
        Some(self.tail.push(&event))
    }

    /// Consume everything pending. Returns the latest history if anything
    /// arrived.
    pub fn drain(&mut self) -> Option<Vec<String>> {
        let mut latest = None;
        while let Some(lines) = self.try_next() {
            latest = Some(lines);
        }
        latest
    }

    pub fn tail(&self) -> &RenderedTail {
        &self.tail
    }
}
