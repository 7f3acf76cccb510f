//! In-memory drives.
//!
//! Used for scratch trees and testing. A [`DriveRegistry`] owns a set
//! of [`MemoryDrive`]s so that reads can traverse mount points between
//! them; all data is ephemeral.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use async_trait::async_trait;
use dashmap::DashMap;

use sango_types::DriveKey;

use crate::drive::{Drive, NameResolver};
use crate::error::{DriveError, DriveResult, ResolveError};
use crate::types::{DirEntry, Stat};

/// Shared registry of in-memory drives, used to resolve mount targets
/// during reads.
#[derive(Debug, Default)]
pub struct DriveRegistry {
    drives: DashMap<DriveKey, Arc<MemoryDrive>>,
    next_key: AtomicU64,
}

impl DriveRegistry {
    /// Create a new empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a new empty drive with a fresh key.
    pub fn create_drive(self: &Arc<Self>) -> Arc<MemoryDrive> {
        let n = self.next_key.fetch_add(1, Ordering::Relaxed) + 1;
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&n.to_be_bytes());
        self.create_drive_with_key(DriveKey::from_bytes(bytes))
    }

    /// Create a new empty drive with the given key, replacing any
    /// previous drive registered under it.
    pub fn create_drive_with_key(self: &Arc<Self>, key: DriveKey) -> Arc<MemoryDrive> {
        let drive = Arc::new(MemoryDrive {
            key,
            registry: Arc::downgrade(self),
            entries: RwLock::new(HashMap::new()),
        });
        self.drives.insert(key, Arc::clone(&drive));
        drive
    }

    /// Look up a drive by key.
    pub fn get(&self, key: &DriveKey) -> Option<Arc<MemoryDrive>> {
        self.drives.get(key).map(|d| Arc::clone(&d))
    }
}

/// What a traversal found at a path: either the local directory to
/// list, or a mount to delegate the remainder into.
enum Resolved {
    Local(String),
    Delegate { target: DriveKey, rest: String },
}

/// An in-memory drive.
///
/// Entries are keyed by normalized path (no leading slash; `""` is the
/// root, which always exists). Thread-safe via internal `RwLock`.
#[derive(Debug)]
pub struct MemoryDrive {
    key: DriveKey,
    registry: Weak<DriveRegistry>,
    entries: RwLock<HashMap<String, Stat>>,
}

impl MemoryDrive {
    /// Normalize a path: exact split on `/`, empty segments dropped.
    fn normalize(path: &str) -> String {
        path.split('/')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Create a directory (and any missing parents).
    pub fn create_dir(&self, path: &str) -> DriveResult<()> {
        let normalized = Self::normalize(path);
        let mut entries = self.lock_write()?;
        Self::ensure_parents(&mut entries, &normalized);
        entries.entry(normalized).or_insert_with(Stat::directory);
        Ok(())
    }

    /// Create a regular file of the given size (and any missing parents).
    pub fn write_file(&self, path: &str, size: u64) -> DriveResult<()> {
        let normalized = Self::normalize(path);
        let mut entries = self.lock_write()?;
        Self::ensure_parents(&mut entries, &normalized);
        entries.insert(normalized, Stat::file(size));
        Ok(())
    }

    /// Attach a metadata key/value to an existing entry.
    pub fn set_metadata(&self, path: &str, key: &str, value: &str) -> DriveResult<()> {
        let normalized = Self::normalize(path);
        let mut entries = self.lock_write()?;
        let stat = entries
            .get_mut(&normalized)
            .ok_or_else(|| DriveError::not_found(&normalized))?;
        stat.metadata.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Graft another drive onto a directory entry (and any missing parents).
    pub fn add_mount(&self, path: &str, target: DriveKey) -> DriveResult<()> {
        let normalized = Self::normalize(path);
        let mut entries = self.lock_write()?;
        Self::ensure_parents(&mut entries, &normalized);
        entries.insert(normalized, Stat::mount(target));
        Ok(())
    }

    fn ensure_parents(entries: &mut HashMap<String, Stat>, path: &str) {
        let mut current = String::new();
        let mut parts = path.split('/').filter(|s| !s.is_empty()).peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                break;
            }
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(part);
            entries.entry(current.clone()).or_insert_with(Stat::directory);
        }
    }

    fn lock_write(&self) -> DriveResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Stat>>> {
        self.entries
            .write()
            .map_err(|_| DriveError::other("lock poisoned"))
    }

    /// Walk `path`, stopping at the first mount point encountered.
    fn resolve(&self, path: &str) -> DriveResult<Resolved> {
        let normalized = Self::normalize(path);
        let entries = self
            .entries
            .read()
            .map_err(|_| DriveError::other("lock poisoned"))?;

        let mut prefix = String::new();
        let parts: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
        for (i, part) in parts.iter().enumerate() {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(part);

            let stat = entries
                .get(&prefix)
                .ok_or_else(|| DriveError::not_found(&prefix))?;
            if let Some(mount) = stat.mount {
                let rest = parts[i + 1..].join("/");
                return Ok(Resolved::Delegate {
                    target: mount.key,
                    rest,
                });
            }
            if i + 1 < parts.len() && !stat.is_directory() {
                return Err(DriveError::not_a_directory(&prefix));
            }
        }

        // Terminal entry must be a directory (the root always is)
        if !normalized.is_empty() {
            let stat = entries
                .get(&normalized)
                .ok_or_else(|| DriveError::not_found(&normalized))?;
            if !stat.is_directory() {
                return Err(DriveError::not_a_directory(&normalized));
            }
        }
        Ok(Resolved::Local(normalized))
    }

    fn list_children(&self, dir: &str) -> DriveResult<Vec<DirEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| DriveError::other("lock poisoned"))?;

        let mut result = Vec::new();
        for (path, stat) in entries.iter() {
            let (parent, name) = match path.rfind('/') {
                Some(idx) => (&path[..idx], &path[idx + 1..]),
                None => ("", path.as_str()),
            };
            if parent == dir && !name.is_empty() {
                result.push(DirEntry::new(name, stat.clone()));
            }
        }
        // Sort for consistent ordering
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }
}

#[async_trait]
impl Drive for MemoryDrive {
    fn key(&self) -> DriveKey {
        self.key
    }

    async fn read_dir(&self, path: &str) -> DriveResult<Vec<DirEntry>> {
        match self.resolve(path)? {
            Resolved::Local(dir) => self.list_children(&dir),
            Resolved::Delegate { target, rest } => {
                let registry = self
                    .registry
                    .upgrade()
                    .ok_or_else(|| DriveError::other("drive registry dropped"))?;
                let drive = registry
                    .get(&target)
                    .ok_or_else(|| DriveError::not_found(target.to_hex()))?;
                drive.read_dir(&rest).await
            }
        }
    }
}

/// Fixed-table name resolver for tests and scratch sessions.
///
/// Canonical references (bare hex or `drive://` URLs) short-circuit
/// without a table lookup, mirroring how the DNS layer passes keys
/// through untouched.
#[derive(Debug, Default)]
pub struct StaticResolver {
    names: DashMap<String, DriveKey>,
}

impl StaticResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a human-readable name for a key.
    pub fn insert(&self, name: impl Into<String>, key: DriveKey) {
        self.names.insert(name.into(), key);
    }
}

#[async_trait]
impl NameResolver for StaticResolver {
    async fn resolve(&self, reference: &str) -> Result<DriveKey, ResolveError> {
        if let Ok(key) = DriveKey::from_reference(reference) {
            return Ok(key);
        }
        self.names
            .get(reference)
            .map(|k| *k)
            .ok_or_else(|| ResolveError(reference.to_string()))
    }
}
