//! Virtual filesystem layer for sango.
//!
//! A tree of content-addressed drives composed through mounts, plus the
//! structured query engine that walks it. The [`Drive`] trait is the
//! read seam: implementations traverse their interior mounts
//! themselves, so callers always address the tree by absolute path.
//!
//! - [`drive`] — the `Drive` and `NameResolver` traits
//! - [`memory`] — in-memory drives and a static resolver, used by tests
//! - [`query`] — pattern compilation, expansion, filtering, ordering
//! - [`types`] — stats, entry kinds, mount descriptors

pub mod drive;
pub mod error;
pub mod memory;
pub mod query;
pub mod types;

pub use drive::{Drive, NameResolver};
pub use error::{DriveError, DriveResult, QueryError, QueryResult, ResolveError};
pub use query::{
    FsQueryResult, QueryEngine, QueryOptions, SortKey, WorkingPath, DEFAULT_READ_CONCURRENCY,
};
pub use types::{DirEntry, FileKind, MountDescriptor, Stat};
