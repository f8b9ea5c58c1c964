//! Lexical diff engine.
//!
//! Pure functions over two texts. [`LineDiff`] holds the line-level edit
//! script and exposes every derived view; the free functions below are
//! one-shot conveniences that build a `LineDiff` and read one view.
//!
//! ```rust
//! use doc_compare_core::diff::{diff_stats, similarity_ratio};
//!
//! let stats = diff_stats("a\nb\nc", "a\nc\nd");
//! assert_eq!(stats.unchanged, 2);
//! assert_eq!(similarity_ratio("abc", "abc"), 1.0);
//! ```

pub mod engine;
pub mod keywords;
pub mod render;
pub mod report;

pub use engine::{OpTag, Opcode};
pub use keywords::{keyword_search, KeywordHit};
pub use report::{
    split_lines, word_diff_stats, word_level_highlights, ChangeKind, ChangedLine, DiffBlock, DiffLists, DiffOp,
    DiffStats, DiffSummary, LineDiff, LineMapping, WordDiffStats, WordHighlight,
};

/// Default context for unified output.
pub const DEFAULT_UNIFIED_CONTEXT: usize = 3;

/// Largest `len_a * len_b` compared character by character in
/// [`similarity_ratio`].
pub const RATIO_CELL_LIMIT: usize = 1 << 24;

/// Similarity in `[0, 1]`: `2 * matches / (len_a + len_b)`, with matches
/// counted by longest common subsequence.
///
/// Counted over characters. When both texts are long enough that the
/// character comparison would exceed [`RATIO_CELL_LIMIT`] cells, words are
/// compared instead, and past that limit again, lines.
///
/// Symmetric, and `1.0` for identical inputs including two empty strings.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let chars_a: Vec<char> = a.chars().collect();
    let chars_b: Vec<char> = b.chars().collect();
    if chars_a.len().saturating_mul(chars_b.len()) <= RATIO_CELL_LIMIT {
        return lcs_ratio(&chars_a, &chars_b);
    }

    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();
    if words_a.len().saturating_mul(words_b.len()) <= RATIO_CELL_LIMIT {
        return lcs_ratio(&words_a, &words_b);
    }

    lcs_ratio(&split_lines(a), &split_lines(b))
}

fn lcs_ratio<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * engine::lcs_len(a, b) as f64 / total as f64
}

pub fn unified_diff(doc1: &str, doc2: &str) -> String {
    LineDiff::new(doc1, doc2).unified(DEFAULT_UNIFIED_CONTEXT)
}

pub fn contextual_diff(doc1: &str, doc2: &str, context: usize) -> String {
    LineDiff::new(doc1, doc2).unified(context)
}

pub fn side_by_side(doc1: &str, doc2: &str, context: Option<usize>) -> String {
    LineDiff::new(doc1, doc2).side_by_side(context)
}

pub fn inline_diff(doc1: &str, doc2: &str, context: usize) -> String {
    LineDiff::new(doc1, doc2).inline(context)
}

pub fn diff_result(doc1: &str, doc2: &str) -> Vec<DiffOp> {
    LineDiff::new(doc1, doc2).result()
}

pub fn diff_stats(doc1: &str, doc2: &str) -> DiffStats {
    LineDiff::new(doc1, doc2).stats()
}

pub fn diff_summary(doc1: &str, doc2: &str) -> DiffSummary {
    LineDiff::new(doc1, doc2).summary()
}

pub fn summarize_changes(doc1: &str, doc2: &str) -> String {
    LineDiff::new(doc1, doc2).summarize_changes()
}

pub fn diff_percentage(doc1: &str, doc2: &str) -> f64 {
    LineDiff::new(doc1, doc2).percentage()
}

pub fn diff_as_lists(doc1: &str, doc2: &str) -> DiffLists {
    LineDiff::new(doc1, doc2).lists()
}

/// Added and removed lines only, in document order.
pub fn added_removed_lines(doc1: &str, doc2: &str) -> (Vec<String>, Vec<String>) {
    let lists = LineDiff::new(doc1, doc2).lists();
    (lists.added, lists.removed)
}

pub fn changed_lines(doc1: &str, doc2: &str) -> Vec<ChangedLine> {
    LineDiff::new(doc1, doc2).changed_lines()
}

pub fn line_mapping(doc1: &str, doc2: &str) -> Vec<LineMapping> {
    LineDiff::new(doc1, doc2).line_mapping()
}

pub fn diff_blocks(doc1: &str, doc2: &str, context: usize) -> Vec<DiffBlock> {
    LineDiff::new(doc1, doc2).blocks(context)
}

pub fn summary_report(doc1: &str, doc2: &str) -> String {
    LineDiff::new(doc1, doc2).summary_report()
}
