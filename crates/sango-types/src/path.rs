//! Exact string-based path helpers.
//!
//! Paths in the virtual tree are plain `/`-delimited strings; segment
//! boundaries are exact splits on `/`, never platform path semantics.

/// Join two path fragments with a single `/` between them.
///
/// Trailing slashes on `left` and leading slashes on `right` are
/// collapsed. Joining an empty `right` returns `left` unchanged, so a
/// degenerate empty segment never grows the path.
pub fn join_path(left: &str, right: &str) -> String {
    let right = right.trim_start_matches('/');
    if right.is_empty() {
        return left.to_string();
    }
    let left = left.trim_end_matches('/');
    format!("{left}/{right}")
}

/// The final `/`-delimited segment of a path.
///
/// `basename("/foo/bar")` is `"bar"`; `basename("/")` and
/// `basename("")` are `""`.
pub fn basename(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

/// Split a multi-segment literal into its directory prefix and final
/// segment: `"a/b/c"` → `("a/b", "c")`, `"c"` → `("", "c")`.
pub fn split_dir_base(segment: &str) -> (&str, &str) {
    match segment.rfind('/') {
        Some(idx) => (&segment[..idx], &segment[idx + 1..]),
        None => ("", segment),
    }
}
