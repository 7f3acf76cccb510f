//! Path expansion.
//!
//! Executes a compiled op list against the drive tree, crossing mounts
//! transparently. Each op maps the current working set to the next;
//! directory-read failures prune the affected branch and never abort
//! the pattern. Fan-out within one op step is bounded so a wide match
//! cannot storm the directory-read capability.

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use sango_types::{join_path, split_dir_base, DriveKey};

use crate::drive::Drive;
use crate::error::{QueryError, QueryResult};
use crate::types::{DirEntry, Stat};

use super::pattern::{compile, segment_matcher, PatternOp};

/// Intermediate expansion state: one candidate path.
#[derive(Debug, Clone)]
pub struct WorkingPath {
    /// Absolute path in the tree, as the caller sees it.
    pub path: String,
    /// Path relative to the owning drive; reset to `/` on mount crossing.
    pub inner_path: String,
    /// The drive that currently owns this path.
    pub drive: DriveKey,
    /// Stat of the terminal entry, once an op has materialized it.
    pub stat: Option<Stat>,
}

impl WorkingPath {
    fn root(drive: DriveKey) -> Self {
        Self {
            path: "/".to_string(),
            inner_path: "/".to_string(),
            drive,
            stat: None,
        }
    }

    /// Extend this working path with a child entry. A mount child
    /// switches ownership to the target drive and resets the relative
    /// path to that drive's root.
    fn child(&self, parent_abs: &str, parent_inner: &str, entry: DirEntry) -> Self {
        let path = join_path(parent_abs, &entry.name);
        let (drive, inner_path) = match entry.stat.mount {
            Some(mount) => (mount.key, "/".to_string()),
            None => (self.drive, join_path(parent_inner, &entry.name)),
        };
        Self {
            path,
            inner_path,
            drive,
            stat: Some(entry.stat),
        }
    }
}

/// Expand every pattern against the tree rooted at `root`.
///
/// Patterns expand independently and concurrently; results keep
/// pattern order, then emission order within a pattern. Matches are
/// not deduplicated across patterns.
pub(crate) async fn expand_patterns(
    root: &dyn Drive,
    patterns: &[String],
    concurrency: usize,
    cancel: &CancellationToken,
) -> QueryResult<Vec<WorkingPath>> {
    let expansions = join_all(
        patterns
            .iter()
            .map(|pattern| expand_one(root, pattern, concurrency, cancel)),
    )
    .await;

    let mut candidates = Vec::new();
    for expansion in expansions {
        candidates.extend(expansion?);
    }
    Ok(candidates)
}

async fn expand_one(
    root: &dyn Drive,
    pattern: &str,
    concurrency: usize,
    cancel: &CancellationToken,
) -> QueryResult<Vec<WorkingPath>> {
    let ops = compile(pattern);
    let mut working = vec![WorkingPath::root(root.key())];

    let last = ops.len().saturating_sub(1);
    for (index, op) in ops.iter().enumerate() {
        let step = run_op(root, working, op, index == last, concurrency);
        working = cancel
            .run_until_cancelled(step)
            .await
            .ok_or(QueryError::Cancelled)?;
        if working.is_empty() {
            break;
        }
    }
    tracing::debug!(pattern, matches = working.len(), "pattern expanded");
    Ok(working)
}

async fn run_op(
    root: &dyn Drive,
    working: Vec<WorkingPath>,
    op: &PatternOp,
    is_last: bool,
    concurrency: usize,
) -> Vec<WorkingPath> {
    match op {
        // A mid-pattern literal is pure string concatenation: no stat
        // is fetched and ownership is carried through unchanged.
        PatternOp::Push(segment) if !is_last => working
            .into_iter()
            .map(|wp| WorkingPath {
                path: join_path(&wp.path, segment),
                inner_path: join_path(&wp.inner_path, segment),
                ..wp
            })
            .collect(),

        // A terminal literal materializes the entry.
        PatternOp::Push(segment) => {
            stream::iter(working.iter().map(|wp| push_terminal(root, wp, segment)))
                .buffer_unordered(concurrency.max(1))
                .filter_map(|found| async move { found })
                .collect::<Vec<WorkingPath>>()
                .await
        }

        PatternOp::Match(segment) => {
            let matcher = segment_matcher(segment);
            let children: Vec<Vec<WorkingPath>> =
                stream::iter(working.iter().map(|wp| match_children(root, wp, &matcher)))
                    .buffer_unordered(concurrency.max(1))
                    .collect::<Vec<Vec<WorkingPath>>>()
                    .await;
            children.into_iter().flatten().collect()
        }
    }
}

/// Resolve a terminal literal: read the parent directory and pick the
/// single child named by the segment's final component. Read failures
/// and absent names prune the branch silently.
async fn push_terminal(
    root: &dyn Drive,
    wp: &WorkingPath,
    segment: &str,
) -> Option<WorkingPath> {
    let (dir, base) = split_dir_base(segment);

    if base.is_empty() {
        // Degenerate pattern `/`: the untouched root (no stat yet) is
        // the only path with an empty name, and it has no parent to
        // list, so its stat is synthesized. Anywhere else an empty
        // base names no child: a trailing slash prunes the branch.
        if wp.stat.is_none() {
            return Some(WorkingPath {
                stat: Some(Stat::directory()),
                ..wp.clone()
            });
        }
        return None;
    }

    let parent_abs = join_path(&wp.path, dir);
    let parent_inner = join_path(&wp.inner_path, dir);
    match root.read_dir(&parent_abs).await {
        Ok(entries) => entries
            .into_iter()
            .find(|entry| entry.name == base)
            .map(|entry| wp.child(&parent_abs, &parent_inner, entry)),
        Err(err) => {
            tracing::debug!(path = %parent_abs, %err, "branch pruned on read failure");
            None
        }
    }
}

/// Expand a wildcard segment: every matching child of the working path
/// becomes a new working path. A failed read contributes zero children.
async fn match_children(
    root: &dyn Drive,
    wp: &WorkingPath,
    matcher: &regex::Regex,
) -> Vec<WorkingPath> {
    let entries = match root.read_dir(&wp.path).await {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!(path = %wp.path, %err, "branch pruned on read failure");
            Vec::new()
        }
    };
    entries
        .into_iter()
        .filter(|entry| matcher.is_match(&entry.name))
        .map(|entry| wp.child(&wp.path, &wp.inner_path, entry))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::DriveRegistry;
    use std::sync::Arc;

    async fn expand(
        root: &dyn Drive,
        patterns: &[&str],
    ) -> Result<Vec<WorkingPath>, QueryError> {
        let patterns: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        expand_patterns(root, &patterns, 100, &CancellationToken::new()).await
    }

    fn paths(working: &[WorkingPath]) -> Vec<&str> {
        working.iter().map(|wp| wp.path.as_str()).collect()
    }

    /// `/foo{,2,3}/bar{,2,3}` with files below, mirroring the shape the
    /// expansion properties are stated against.
    fn fixture() -> (Arc<DriveRegistry>, Arc<crate::memory::MemoryDrive>) {
        let registry = DriveRegistry::new();
        let root = registry.create_drive();
        for foo in ["foo", "foo2", "foo3"] {
            for bar in ["bar", "bar2", "bar3"] {
                for baz in ["baz", "baz2", "baz3"] {
                    root.create_dir(&format!("/{foo}/{bar}/{baz}")).unwrap();
                }
            }
        }
        (registry, root)
    }

    #[tokio::test]
    async fn literal_path_yields_single_candidate() {
        let (_registry, root) = fixture();
        let found = expand(&*root, &["/foo/bar"]).await.unwrap();
        assert_eq!(paths(&found), vec!["/foo/bar"]);
        assert!(found[0].stat.as_ref().unwrap().is_directory());
    }

    #[tokio::test]
    async fn missing_literal_yields_nothing() {
        let (_registry, root) = fixture();
        let found = expand(&*root, &["/foo/nope"]).await.unwrap();
        assert!(found.is_empty());
        let found = expand(&*root, &["/ghost/deeper/path"]).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn root_pattern_resolves_to_root() {
        let (_registry, root) = fixture();
        let found = expand(&*root, &["/"]).await.unwrap();
        assert_eq!(paths(&found), vec!["/"]);
        assert_eq!(found[0].drive, root.key());
    }

    #[tokio::test]
    async fn star_expands_to_immediate_children() {
        let (_registry, root) = fixture();
        let found = paths_sorted(expand(&*root, &["/*"]).await.unwrap());
        assert_eq!(found, vec!["/foo", "/foo2", "/foo3"]);
    }

    fn paths_sorted(working: Vec<WorkingPath>) -> Vec<String> {
        let mut v: Vec<String> = working.into_iter().map(|wp| wp.path).collect();
        v.sort();
        v
    }

    #[tokio::test]
    async fn partial_wildcards_match_within_segment() {
        let (_registry, root) = fixture();
        assert_eq!(
            paths_sorted(expand(&*root, &["/*oo"]).await.unwrap()),
            vec!["/foo"]
        );
        assert_eq!(
            paths_sorted(expand(&*root, &["/*oo*"]).await.unwrap()),
            vec!["/foo", "/foo2", "/foo3"]
        );
        assert_eq!(
            paths_sorted(expand(&*root, &["/f*/bar"]).await.unwrap()),
            vec!["/foo/bar", "/foo2/bar", "/foo3/bar"]
        );
    }

    #[tokio::test]
    async fn wildcard_never_crosses_slash() {
        let registry = DriveRegistry::new();
        let root = registry.create_drive();
        root.create_dir("/foo/bar").unwrap();
        root.create_dir("/foobar/bar").unwrap();
        root.create_dir("/foo/bar/extra").unwrap();

        assert_eq!(
            paths_sorted(expand(&*root, &["/*o*/bar"]).await.unwrap()),
            vec!["/foo/bar", "/foobar/bar"]
        );
    }

    #[tokio::test]
    async fn nested_wildcards_fan_out() {
        let (_registry, root) = fixture();
        let found = paths_sorted(expand(&*root, &["/foo/*/baz/*"]).await.unwrap());
        assert!(found.is_empty());

        let found = paths_sorted(expand(&*root, &["/foo/*/*"]).await.unwrap());
        assert_eq!(found.len(), 9);
        assert!(found.contains(&"/foo/bar/baz".to_string()));
        assert!(found.contains(&"/foo/bar3/baz3".to_string()));
    }

    #[tokio::test]
    async fn mid_pattern_literal_after_wildcard() {
        let (_registry, root) = fixture();
        let found = paths_sorted(expand(&*root, &["/foo/*/baz"]).await.unwrap());
        assert_eq!(found, vec!["/foo/bar/baz", "/foo/bar2/baz", "/foo/bar3/baz"]);
    }

    #[tokio::test]
    async fn multiple_patterns_keep_pattern_order() {
        let (_registry, root) = fixture();
        let found = expand(&*root, &["/", "/foo", "/foo/bar"]).await.unwrap();
        assert_eq!(paths(&found), vec!["/", "/foo", "/foo/bar"]);
    }

    #[tokio::test]
    async fn duplicate_patterns_duplicate_matches() {
        let (_registry, root) = fixture();
        let found = expand(&*root, &["/foo", "/foo"]).await.unwrap();
        assert_eq!(paths(&found), vec!["/foo", "/foo"]);
    }

    #[tokio::test]
    async fn mount_crossing_switches_ownership() {
        let registry = DriveRegistry::new();
        let root = registry.create_drive();
        let friend = registry.create_drive();
        friend.create_dir("/comments").unwrap();
        root.create_dir("/profile/follows").unwrap();
        root.add_mount("/profile/follows/bob", friend.key()).unwrap();

        // The mount entry itself
        let found = expand(&*root, &["/profile/follows/*"]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "/profile/follows/bob");
        assert_eq!(found[0].drive, friend.key());
        assert_eq!(found[0].inner_path, "/");

        // A child below the mount: absolute path stays contiguous,
        // ownership and relative path belong to the mounted drive.
        let found = expand(&*root, &["/profile/follows/*/comments"]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "/profile/follows/bob/comments");
        assert_eq!(found[0].drive, friend.key());
        assert_eq!(found[0].inner_path, "/comments");
    }

    #[tokio::test]
    async fn trailing_slash_names_no_child() {
        let registry = DriveRegistry::new();
        let root = registry.create_drive();
        root.write_file("/posts/first.md", 1).unwrap();
        root.create_dir("/posts/sub").unwrap();

        // `/posts/*/` ends in an empty literal; nothing is named by it,
        // and in particular no stat is fabricated for matched files.
        let found = expand(&*root, &["/posts/*/"]).await.unwrap();
        assert!(found.is_empty());

        // The bare root pattern still resolves
        let found = expand(&*root, &["/"]).await.unwrap();
        assert_eq!(paths(&found), vec!["/"]);
    }

    #[tokio::test]
    async fn read_failure_prunes_branch_only() {
        let registry = DriveRegistry::new();
        let root = registry.create_drive();
        root.create_dir("/good/child").unwrap();
        root.write_file("/bad", 1).unwrap();

        // `/bad/*` reads a file as a directory: zero children, not an error
        let found = expand(&*root, &["/good/*", "/bad/*"]).await.unwrap();
        assert_eq!(paths(&found), vec!["/good/child"]);
    }

    #[tokio::test]
    async fn cancellation_is_terminal() {
        let (_registry, root) = fixture();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let patterns = vec!["/foo/*".to_string()];
        let result = expand_patterns(&*root, &patterns, 100, &cancel).await;
        assert!(matches!(result, Err(QueryError::Cancelled)));
    }

    #[tokio::test]
    async fn tight_concurrency_cap_finds_everything() {
        let (_registry, root) = fixture();
        let patterns = vec!["/*/*/*".to_string()];
        let found = expand_patterns(&*root, &patterns, 1, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(found.len(), 27);
    }
}
