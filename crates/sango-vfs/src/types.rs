//! Core drive-tree types.
//!
//! These are wire-facing (serde) and deliberately path-based: entries
//! are addressed by `/`-delimited strings, never inodes.

use std::collections::BTreeMap;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use sango_types::DriveKey;

/// Mask for the file-type bits of `Stat::mode`.
pub const S_IFMT: u32 = 0o170_000;
/// Mode bits marking a directory.
pub const S_IFDIR: u32 = 0o040_000;
/// Mode bits marking a regular file.
pub const S_IFREG: u32 = 0o100_000;

/// Descriptor attached to a directory entry that is a mount point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountDescriptor {
    /// The drive this entry redirects resolution into.
    pub key: DriveKey,
}

/// Metadata for one entry in the virtual tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stat {
    /// Type-determining mode bits plus permissions.
    pub mode: u32,
    /// Size in bytes.
    pub size: u64,
    /// Byte offset of the content within the drive's log.
    pub offset: u64,
    /// Number of content blocks.
    pub blocks: u64,
    /// Last access time.
    pub atime: SystemTime,
    /// Last modification time.
    pub mtime: SystemTime,
    /// Creation time.
    pub ctime: SystemTime,
    /// Free-form string-keyed metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Present only when this entry is a mount point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<MountDescriptor>,
}

impl Stat {
    /// Stat for a regular file of the given size.
    pub fn file(size: u64) -> Self {
        let now = SystemTime::now();
        Self {
            mode: S_IFREG | 0o644,
            size,
            offset: 0,
            blocks: size.div_ceil(512),
            atime: now,
            mtime: now,
            ctime: now,
            metadata: BTreeMap::new(),
            mount: None,
        }
    }

    /// Stat for a directory.
    pub fn directory() -> Self {
        let now = SystemTime::now();
        Self {
            mode: S_IFDIR | 0o755,
            size: 0,
            offset: 0,
            blocks: 0,
            atime: now,
            mtime: now,
            ctime: now,
            metadata: BTreeMap::new(),
            mount: None,
        }
    }

    /// Stat for a mount point redirecting into `key`.
    pub fn mount(key: DriveKey) -> Self {
        let mut stat = Self::directory();
        stat.mount = Some(MountDescriptor { key });
        stat
    }

    /// Whether the mode bits mark a directory.
    pub fn is_directory(&self) -> bool {
        self.mode & S_IFMT == S_IFDIR
    }

    /// Whether the mode bits mark a regular file.
    pub fn is_file(&self) -> bool {
        self.mode & S_IFMT == S_IFREG
    }
}

/// Classified type of a query result.
///
/// Mount detection takes precedence over the mode bits: an entry whose
/// stat carries a mount descriptor is a `Mount` even though its mode
/// marks a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Mount point onto another drive.
    Mount,
}

impl FileKind {
    /// Classify a stat: mount first, then the directory bit, else file.
    pub fn classify(stat: &Stat) -> Self {
        if stat.mount.is_some() {
            FileKind::Mount
        } else if stat.is_directory() {
            FileKind::Directory
        } else {
            FileKind::File
        }
    }
}

/// One directory entry, as returned by [`crate::Drive::read_dir`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry metadata, including the mount descriptor when present.
    pub stat: Stat,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, stat: Stat) -> Self {
        Self {
            name: name.into(),
            stat,
        }
    }
}
