/// OS-level permissions the capture pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Camera,
    RecordAudio,
    /// Only required on platform API level 28 and below.
    WriteExternalStorage,
}

/// Last platform API level that still needs the storage-write permission.
pub const LEGACY_STORAGE_MAX_API_LEVEL: u32 = 28;

/// Permissions that must all be granted before a session can be prepared.
pub fn required_permissions(api_level: u32) -> Vec<Permission> {
    let mut permissions = vec![Permission::Camera, Permission::RecordAudio];
    if api_level <= LEGACY_STORAGE_MAX_API_LEVEL {
        permissions.push(Permission::WriteExternalStorage);
    }
    permissions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_permission_only_on_legacy_platforms() {
        assert!(required_permissions(28).contains(&Permission::WriteExternalStorage));
        assert!(!required_permissions(29).contains(&Permission::WriteExternalStorage));
        assert_eq!(required_permissions(33), vec![Permission::Camera, Permission::RecordAudio]);
    }
}
