//! The path-pattern query engine.
//!
//! Given one or more glob-style path patterns that may cross mount
//! boundaries, the engine expands them into concrete paths, resolves
//! which drive owns each path, attaches stats, filters by
//! type/mount/metadata, and returns a sorted, paginated result set.
//!
//! ```no_run
//! # use tokio_util::sync::CancellationToken;
//! # use sango_vfs::{Drive, QueryEngine, QueryOptions, QueryError, FileKind};
//! # async fn example(root: &dyn Drive, engine: QueryEngine) -> Result<(), QueryError> {
//! let opts = QueryOptions::paths(["/profile/follows/*", "/profile/follows/*/follows/*"])
//!     .with_kind(FileKind::Mount);
//! let results = engine.query(root, &opts, &CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

mod expand;
mod filter;
mod pattern;
mod sort;

pub use expand::WorkingPath;
pub use pattern::{compile, segment_matcher, PatternOp};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use sango_types::DriveKey;

use crate::drive::{Drive, NameResolver};
use crate::error::{QueryError, QueryResult};
use crate::types::{FileKind, Stat};

use expand::expand_patterns;
use filter::ResultFilter;
use sort::{paginate, sort_results};

/// Default cap on concurrent directory reads within one expansion step.
///
/// Protects the directory-read capability from request storms when a
/// wildcard fans out against network-backed mount content. Tune per
/// engine via [`QueryEngine::with_read_concurrency`].
pub const DEFAULT_READ_CONCURRENCY: usize = 100;

/// Sort key for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Case-insensitive comparison of the final path segment.
    Name,
    /// Numeric comparison of the modification timestamp.
    Mtime,
    /// Numeric comparison of the creation timestamp.
    Ctime,
}

/// Options for one query call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    /// One or more path patterns; required. Accepts a bare string or
    /// an array of strings on the wire.
    #[serde(deserialize_with = "one_or_many")]
    pub path: Vec<String>,
    /// Keep only results of this classified type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FileKind>,
    /// Keep only mounts of this drive, given as a human-readable or
    /// canonical reference (resolved once, up front).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
    /// Keep only results whose stat metadata carries every given pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    /// Sort key; unset leaves expansion order (nondeterministic).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortKey>,
    /// Flip the sort direction.
    #[serde(default)]
    pub reverse: bool,
    /// Drop the first N results after sorting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Keep at most N results after the offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl QueryOptions {
    /// Query a single pattern.
    pub fn path(pattern: impl Into<String>) -> Self {
        Self {
            path: vec![pattern.into()],
            ..Self::default()
        }
    }

    /// Query several patterns. Matches are not deduplicated across
    /// patterns: overlapping patterns yield repeated results.
    pub fn paths<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: patterns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the type filter.
    pub fn with_kind(mut self, kind: FileKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the mount filter reference.
    pub fn with_mount(mut self, reference: impl Into<String>) -> Self {
        self.mount = Some(reference.into());
        self
    }

    /// Add one metadata-equality requirement.
    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set the sort key.
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Reverse the sort direction.
    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Set the pagination offset.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set the pagination limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(pattern) => vec![pattern],
        OneOrMany::Many(patterns) => patterns,
    })
}

/// One query result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsQueryResult {
    /// Classified type: mount detection first, then the directory bit.
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// Absolute path in the queried tree.
    pub path: String,
    /// Canonical URL: `drive://<owning key><drive-relative path>`.
    pub url: String,
    /// Entry metadata.
    pub stat: Stat,
    /// URL of the owning drive.
    pub drive: String,
    /// URL of the mounted drive — present only for mount results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
}

/// The query engine.
///
/// Holds the name-resolution collaborator and the read-concurrency cap;
/// everything else is constructed fresh per call.
pub struct QueryEngine {
    resolver: Arc<dyn NameResolver>,
    read_concurrency: usize,
}

impl QueryEngine {
    /// Create an engine with the default read-concurrency cap.
    pub fn new(resolver: Arc<dyn NameResolver>) -> Self {
        Self {
            resolver,
            read_concurrency: DEFAULT_READ_CONCURRENCY,
        }
    }

    /// Override the per-step concurrent-read cap (minimum 1).
    pub fn with_read_concurrency(mut self, cap: usize) -> Self {
        self.read_concurrency = cap.max(1);
        self
    }

    /// Run a structured query against the tree rooted at `root`.
    ///
    /// Validation happens before any directory read; the mount filter
    /// reference is resolved once, up front. Cancelling `cancel`
    /// abandons all in-flight reads and returns
    /// [`QueryError::Cancelled`] — never partial results.
    #[tracing::instrument(skip_all, name = "vfs.query", fields(patterns = opts.path.len()))]
    pub async fn query(
        &self,
        root: &dyn Drive,
        opts: &QueryOptions,
        cancel: &CancellationToken,
    ) -> QueryResult<Vec<FsQueryResult>> {
        if opts.path.is_empty() {
            return Err(QueryError::InvalidArgument("path"));
        }

        let mount_key = match &opts.mount {
            Some(reference) => Some(self.resolve_mount(reference, cancel).await?),
            None => None,
        };

        let candidates =
            expand_patterns(root, &opts.path, self.read_concurrency, cancel).await?;
        tracing::debug!(candidates = candidates.len(), "expansion complete");

        let filter = ResultFilter::new(opts, mount_key);
        let mut results: Vec<FsQueryResult> = candidates
            .into_iter()
            .filter_map(|candidate| filter.apply(candidate))
            .collect();

        sort_results(&mut results, opts.sort, opts.reverse);
        Ok(paginate(results, opts.offset, opts.limit))
    }

    async fn resolve_mount(
        &self,
        reference: &str,
        cancel: &CancellationToken,
    ) -> QueryResult<DriveKey> {
        let resolved = cancel
            .run_until_cancelled(self.resolver.resolve(reference))
            .await
            .ok_or(QueryError::Cancelled)?;
        Ok(resolved?)
    }
}
