use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::models::state::SessionState;

struct Shared {
    state: Mutex<SessionState>,
    changed: Condvar,
}

/// Publishes session state from the control thread to observers.
pub(crate) struct SessionStateWatch {
    shared: Arc<Shared>,
}

impl SessionStateWatch {
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState::Idle),
                changed: Condvar::new(),
            }),
        }
    }

    pub(crate) fn set(&self, next: SessionState) {
        let mut state = self.shared.state.lock();
        if *state != next {
            log::info!("Session state {:?} -> {:?}", *state, next);
            *state = next;
            self.shared.changed.notify_all();
        }
    }

    pub(crate) fn view(&self) -> SessionStateView {
        SessionStateView {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Read-only, thread-safe view of the session state.
#[derive(Clone)]
pub struct SessionStateView {
    shared: Arc<Shared>,
}

impl SessionStateView {
    pub fn current(&self) -> SessionState {
        *self.shared.state.lock()
    }

    pub fn is_prepared(&self) -> bool {
        self.current().is_prepared()
    }

    pub fn is_streaming(&self) -> bool {
        self.current().is_streaming()
    }

    /// Block the calling thread until `predicate` holds or `timeout` passes.
    ///
    /// Never call this on the control thread: only the control thread moves
    /// the state.
    pub fn wait_until<P>(&self, mut predicate: P, timeout: Duration) -> Option<SessionState>
    where
        P: FnMut(SessionState) -> bool,
    {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while !predicate(*state) {
            if self.shared.changed.wait_until(&mut state, deadline).timed_out() {
                return predicate(*state).then_some(*state);
            }
        }
        Some(*state)
    }
}
