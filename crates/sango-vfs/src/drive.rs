//! Collaborator traits: the directory-read capability and name resolution.
//!
//! The query engine consumes exactly two operations from the rest of
//! the system: read a directory (with stats) on a drive, and resolve a
//! human-readable mount reference to a canonical key. Everything else —
//! replication, storage, DNS — lives behind these traits.

use async_trait::async_trait;

use sango_types::DriveKey;

use crate::error::{DriveResult, ResolveError};
use crate::types::DirEntry;

/// A content-addressed directory tree, identified by a fixed key.
///
/// `read_dir` takes an absolute `/`-delimited path within this drive's
/// tree and returns the immediate children with stats. Reads through an
/// interior mount point are the implementation's responsibility: a path
/// that descends below a mount must be resolved against the mounted
/// drive, transparently to the caller. Entries that are themselves
/// mount points carry a [`crate::MountDescriptor`] in their stat.
///
/// Implementations must be individually safe for concurrent reads; the
/// engine issues many in parallel.
#[async_trait]
pub trait Drive: Send + Sync {
    /// The drive's identifier.
    fn key(&self) -> DriveKey;

    /// Read the immediate children at `path`, with stats.
    async fn read_dir(&self, path: &str) -> DriveResult<Vec<DirEntry>>;
}

/// Resolves a human-readable drive reference to a canonical key.
///
/// References may be short names (DNS-style), full `drive://` URLs, or
/// already-canonical hex keys; what forms are accepted is up to the
/// implementation.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolve `reference` to a drive key, or fail as unresolvable.
    async fn resolve(&self, reference: &str) -> Result<DriveKey, ResolveError>;
}
