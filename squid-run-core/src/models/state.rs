use serde::Serialize;

/// Observable streaming session state.
///
/// State transitions:
/// ```text
/// idle ──prepare──→ prepared ──start──→ streaming
///   ↑                  ↑                    │
///   └──release         └───────stop─────────┘
/// ```
/// A failed `prepare` leaves the session idle; a failed `start` leaves it
/// prepared. An asynchronous disconnect does not move the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Prepared,
    Streaming,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// True once a publisher exists, whether or not it is publishing.
    pub fn is_prepared(&self) -> bool {
        matches!(self, Self::Prepared | Self::Streaming)
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::Idle
    }
}
