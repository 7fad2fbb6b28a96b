use crate::models::error::StreamError;
use crate::models::geometry::{Orientation, Resolution};
use crate::models::permission::{required_permissions, Permission};

/// The device camera the video source binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraInfo {
    pub id: String,
    /// Largest capture size the sensor supports, in sensor orientation.
    pub max_resolution: Resolution,
}

/// Device capabilities the session controller queries but never owns.
pub trait DeviceEnvironment: Send + Sync {
    fn is_permission_granted(&self, permission: Permission) -> bool;

    /// Platform API level, used to decide which permissions are required.
    fn api_level(&self) -> u32;

    /// Current physical orientation of the wearable.
    fn orientation(&self) -> Orientation;

    /// Look up the back camera. Fails with `HardwareUnavailable`.
    fn camera(&self) -> Result<CameraInfo, StreamError>;

    fn all_permissions_granted(&self) -> bool {
        required_permissions(self.api_level())
            .into_iter()
            .all(|p| self.is_permission_granted(p))
    }
}
