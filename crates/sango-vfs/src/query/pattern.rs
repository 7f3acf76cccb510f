//! Pattern compilation.
//!
//! A path pattern like `/profile/follows/*/comments` compiles into an
//! ordered op list: literal runs collapse into a single `Push`, and
//! each wildcard segment becomes a `Match`. Any string is syntactically
//! acceptable; there are no compile errors.

use regex::{Regex, RegexBuilder};

/// One step of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternOp {
    /// Append a fixed run of path components.
    Push(String),
    /// Expand to every child name matching a single-segment wildcard.
    Match(String),
}

/// Compile a pattern string into its op list.
///
/// Consecutive non-wildcard segments accumulate into one `Push`; a
/// segment containing `*` flushes the pending literal (if any) and
/// emits a `Match`. The degenerate pattern `/` compiles to a single
/// empty `Push`, which the expander resolves to the tree root.
pub fn compile(pattern: &str) -> Vec<PatternOp> {
    let mut ops = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();

    for segment in pattern.split('/') {
        if segment.contains('*') {
            let literal: Vec<&str> = buffer.drain(..).filter(|s| !s.is_empty()).collect();
            if !literal.is_empty() {
                ops.push(PatternOp::Push(literal.join("/")));
            }
            ops.push(PatternOp::Match(segment.to_string()));
        } else {
            buffer.push(segment);
        }
    }
    if !buffer.is_empty() {
        let literal: Vec<&str> = buffer.into_iter().filter(|s| !s.is_empty()).collect();
        ops.push(PatternOp::Push(literal.join("/")));
    }
    ops
}

/// Compile a wildcard segment into a case-insensitive matcher confined
/// to one path segment: `*` stands for any run of non-`/` characters.
pub fn segment_matcher(segment: &str) -> Regex {
    let mut source = String::from("^");
    for (i, literal) in segment.split('*').enumerate() {
        if i > 0 {
            source.push_str("[^/]*");
        }
        source.push_str(&regex::escape(literal));
    }
    source.push('$');
    RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .expect("escaped segment pattern always compiles")
}
