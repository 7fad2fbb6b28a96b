//! Deferred binding of the live preview to a display surface.
//!
//! A surface may become available before the publisher exists. The request
//! is then held as pending and completed by the controller as soon as
//! `prepare` succeeds. There is never more than one outstanding attach.

use crate::traits::publisher::{MediaPublisher, SurfaceHandle};

/// Surface and size a preview is rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewRequest {
    pub surface: SurfaceHandle,
    pub width: u32,
    pub height: u32,
}

/// Outcome of a preview request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    /// Rendering to the surface now.
    Attached,
    /// Waiting for the session to be prepared.
    Pending,
    /// An earlier request is still waiting; this one was ignored.
    AlreadyPending,
    /// The publisher refused the surface.
    Failed,
}

#[derive(Debug, Default)]
pub(crate) enum PreviewTask {
    #[default]
    Idle,
    Pending(PreviewRequest),
    Attached(PreviewRequest),
}

impl PreviewTask {
    pub(crate) fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    pub(crate) fn is_attached(&self) -> bool {
        matches!(self, Self::Attached(_))
    }

    /// Attach now if a publisher exists, otherwise wait for one.
    pub(crate) fn start(
        &mut self,
        request: PreviewRequest,
        mut publisher: Option<&mut dyn MediaPublisher>,
    ) -> PreviewStatus {
        match self {
            Self::Pending(_) => {
                log::debug!("Preview attach already pending, ignoring {:?}", request.surface);
                return PreviewStatus::AlreadyPending;
            }
            Self::Attached(bound) => {
                log::debug!("Rebinding preview from {:?}", bound.surface);
                if let Some(publisher) = publisher.as_deref_mut() {
                    if publisher.is_on_preview() {
                        publisher.stop_preview();
                    }
                }
                *self = Self::Idle;
            }
            Self::Idle => {}
        }

        match publisher {
            Some(publisher) => self.attach(request, publisher),
            None => {
                log::debug!("Preview for {:?} deferred until prepared", request.surface);
                *self = Self::Pending(request);
                PreviewStatus::Pending
            }
        }
    }

    /// Complete a pending attach. Returns `None` when nothing was pending.
    pub(crate) fn resume(&mut self, publisher: &mut dyn MediaPublisher) -> Option<PreviewStatus> {
        match std::mem::take(self) {
            Self::Pending(request) => Some(self.attach(request, publisher)),
            other => {
                *self = other;
                None
            }
        }
    }

    /// Cancel a pending attach or unbind the surface.
    pub(crate) fn stop(&mut self, publisher: Option<&mut dyn MediaPublisher>) {
        match std::mem::take(self) {
            Self::Pending(request) => {
                log::debug!("Cancelled pending preview for {:?}", request.surface);
            }
            Self::Attached(request) => {
                if let Some(publisher) = publisher {
                    if publisher.is_on_preview() {
                        publisher.stop_preview();
                    }
                }
                log::info!("Preview detached from {:?}", request.surface);
            }
            Self::Idle => {}
        }
    }

    fn attach(&mut self, request: PreviewRequest, publisher: &mut dyn MediaPublisher) -> PreviewStatus {
        match publisher.start_preview(request.surface, request.width, request.height) {
            Ok(()) => {
                log::info!(
                    "Preview attached to {:?} ({}x{})",
                    request.surface,
                    request.width,
                    request.height
                );
                *self = Self::Attached(request);
                PreviewStatus::Attached
            }
            Err(e) => {
                log::warn!("Preview attach to {:?} failed: {}", request.surface, e);
                *self = Self::Idle;
                PreviewStatus::Failed
            }
        }
    }
}
