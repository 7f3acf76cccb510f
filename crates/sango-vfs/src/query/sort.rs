//! Result ordering and pagination.

use sango_types::basename;

use super::{FsQueryResult, SortKey};

/// Total-order the results by the given key. Without a key the
/// expansion order is kept — which is explicitly nondeterministic
/// across concurrent directory reads.
pub(crate) fn sort_results(results: &mut [FsQueryResult], sort: Option<SortKey>, reverse: bool) {
    let Some(sort) = sort else {
        return;
    };
    results.sort_by(|a, b| {
        let ordering = match sort {
            SortKey::Name => basename(&a.path)
                .to_lowercase()
                .cmp(&basename(&b.path).to_lowercase()),
            SortKey::Mtime => a.stat.mtime.cmp(&b.stat.mtime),
            SortKey::Ctime => a.stat.ctime.cmp(&b.stat.ctime),
        };
        if reverse {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

/// Slice the sorted results: `offset` drops the first N, `limit` keeps
/// at most N. Out-of-range offsets yield an empty set, not an error.
pub(crate) fn paginate(
    results: Vec<FsQueryResult>,
    offset: Option<usize>,
    limit: Option<usize>,
) -> Vec<FsQueryResult> {
    results
        .into_iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileKind, Stat};
    use std::time::{Duration, SystemTime};

    fn result(path: &str, mtime_offset: u64) -> FsQueryResult {
        let mut stat = Stat::file(1);
        stat.mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_offset);
        stat.ctime = stat.mtime;
        FsQueryResult {
            kind: FileKind::File,
            path: path.to_string(),
            url: String::new(),
            stat,
            drive: String::new(),
            mount: None,
        }
    }

    fn names(results: &[FsQueryResult]) -> Vec<&str> {
        results.iter().map(|r| r.path.as_str()).collect()
    }

    #[test]
    fn name_sort_is_case_insensitive() {
        let mut results = vec![result("/b", 0), result("/A", 0), result("/c", 0)];
        sort_results(&mut results, Some(SortKey::Name), false);
        assert_eq!(names(&results), vec!["/A", "/b", "/c"]);
    }

    #[test]
    fn name_sort_reversed() {
        let mut results = vec![result("/b", 0), result("/A", 0), result("/c", 0)];
        sort_results(&mut results, Some(SortKey::Name), true);
        assert_eq!(names(&results), vec!["/c", "/b", "/A"]);
    }

    #[test]
    fn name_sort_uses_final_segment() {
        let mut results = vec![result("/zzz/apple", 0), result("/aaa/zebra", 0)];
        sort_results(&mut results, Some(SortKey::Name), false);
        assert_eq!(names(&results), vec!["/zzz/apple", "/aaa/zebra"]);
    }

    #[test]
    fn mtime_sort_is_numeric() {
        let mut results = vec![result("/new", 30), result("/old", 10), result("/mid", 20)];
        sort_results(&mut results, Some(SortKey::Mtime), false);
        assert_eq!(names(&results), vec!["/old", "/mid", "/new"]);
        sort_results(&mut results, Some(SortKey::Mtime), true);
        assert_eq!(names(&results), vec!["/new", "/mid", "/old"]);
    }

    #[test]
    fn no_sort_keeps_order() {
        let mut results = vec![result("/b", 0), result("/a", 0)];
        sort_results(&mut results, None, false);
        assert_eq!(names(&results), vec!["/b", "/a"]);
    }

    #[test]
    fn offset_and_limit_slice() {
        let results: Vec<_> = (0..5).map(|i| result(&format!("/{i}"), 0)).collect();
        let page = paginate(results.clone(), Some(2), Some(2));
        assert_eq!(names(&page), vec!["/2", "/3"]);

        let tail = paginate(results.clone(), Some(3), None);
        assert_eq!(names(&tail), vec!["/3", "/4"]);

        let head = paginate(results.clone(), None, Some(2));
        assert_eq!(names(&head), vec!["/0", "/1"]);

        let all = paginate(results, None, None);
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn out_of_range_offset_is_empty() {
        let results: Vec<_> = (0..5).map(|i| result(&format!("/{i}"), 0)).collect();
        assert!(paginate(results, Some(10), None).is_empty());
    }
}
