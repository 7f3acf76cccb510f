//! Canonical drive URL composition.

use crate::key::DriveKey;
use crate::path::join_path;

/// URL scheme for drives in the virtual tree.
pub const DRIVE_SCHEME: &str = "drive";

/// The canonical URL of a drive root: `drive://<hex key>`.
pub fn drive_url(key: &DriveKey) -> String {
    format!("{DRIVE_SCHEME}://{}", key.to_hex())
}

/// The canonical URL of a path within a drive: `drive://<hex key><path>`.
pub fn drive_path_url(key: &DriveKey, path: &str) -> String {
    join_path(&drive_url(key), path)
}
