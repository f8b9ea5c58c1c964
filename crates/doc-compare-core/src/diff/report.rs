//! Line-level diff results and the statistics derived from them.
//!
//! [`LineDiff`] computes the edit script once; every accessor here reads
//! from that single opcode list so the stats, blocks, mappings and
//! renderings of one comparison always agree with each other.

use serde::Serialize;
use std::ops::Range;

use super::engine::{self, OpTag, Opcode};
use crate::metrics::{percentage, round_to};

/// One opcode together with the lines it covers on each side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffOp {
    pub tag: OpTag,
    pub source_range: Range<usize>,
    pub target_range: Range<usize>,
    pub source_lines: Vec<String>,
    pub target_lines: Vec<String>,
}

/// Line counts derived from the opcode list.
///
/// `unchanged + removed == total_doc1` and `unchanged + added == total_doc2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DiffStats {
    pub total_doc1: usize,
    pub total_doc2: usize,
    pub unchanged: usize,
    pub added: usize,
    pub removed: usize,
}

impl DiffStats {
    /// Unchanged lines as a percentage of the longer document.
    pub fn unchanged_percent(&self) -> f64 {
        percentage(self.unchanged, self.total_doc1.max(self.total_doc2))
    }

    /// Added lines as a percentage of the second document.
    pub fn added_percent(&self) -> f64 {
        percentage(self.added, self.total_doc2)
    }

    /// Removed lines as a percentage of the first document.
    pub fn removed_percent(&self) -> f64 {
        percentage(self.removed, self.total_doc1)
    }
}

/// Added / removed / changed counts, where "changed" counts paired lines
/// inside replace spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
}

/// Word-level counts over whitespace-separated tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WordDiffStats {
    pub added: usize,
    pub removed: usize,
    pub common: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Unchanged,
}

/// A changed line, numbered (1-based) on the side it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedLine {
    pub line_number: usize,
    pub kind: ChangeKind,
    pub content: String,
}

/// Correspondence of an unchanged line between the two documents (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineMapping {
    pub doc1_line: usize,
    pub doc2_line: usize,
    pub content: String,
}

/// A change padded with context lines, for UI highlighting.
///
/// `start*` are 1-based, `end*` are inclusive 1-based (equivalently the
/// exclusive 0-based end), both clamped to the document bounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffBlock {
    pub start1: usize,
    pub end1: usize,
    pub start2: usize,
    pub end2: usize,
    pub lines1: Vec<String>,
    pub lines2: Vec<String>,
    pub change_type: OpTag,
}

/// Added, removed and unchanged lines, each in document order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DiffLists {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub unchanged: Vec<String>,
}

/// Word-level changes for one line position that differs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordHighlight {
    pub line_number: usize,
    pub changes: Vec<(ChangeKind, String)>,
}

/// Split `text` on every line boundary: `\n`, `\r\n`, a lone `\r`, vertical
/// tab, form feed, `\x1c`-`\x1e`, NEL, U+2028 and U+2029. A trailing
/// boundary does not open an extra empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..idx]);
        start = idx + c.len_utf8();
        if c == '\r' {
            if let Some(&(next, '\n')) = chars.peek() {
                chars.next();
                start = next + 1;
            }
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}'..='\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// The line-level edit script between two texts.
#[derive(Debug, Clone)]
pub struct LineDiff<'a> {
    lines1: Vec<&'a str>,
    lines2: Vec<&'a str>,
    ops: Vec<Opcode>,
}

impl<'a> LineDiff<'a> {
    pub fn new(doc1: &'a str, doc2: &'a str) -> Self {
        let lines1 = split_lines(doc1);
        let lines2 = split_lines(doc2);
        let ops = engine::opcodes(&lines1, &lines2);
        Self { lines1, lines2, ops }
    }

    pub fn lines1(&self) -> &[&'a str] {
        &self.lines1
    }

    pub fn lines2(&self) -> &[&'a str] {
        &self.lines2
    }

    pub fn opcodes(&self) -> &[Opcode] {
        &self.ops
    }

    pub fn has_changes(&self) -> bool {
        self.ops.iter().any(|op| op.tag != OpTag::Equal)
    }

    /// The opcode list with the covered lines attached.
    pub fn result(&self) -> Vec<DiffOp> {
        self.ops
            .iter()
            .map(|op| DiffOp {
                tag: op.tag,
                source_range: op.src.clone(),
                target_range: op.dst.clone(),
                source_lines: owned(&self.lines1[op.src.clone()]),
                target_lines: owned(&self.lines2[op.dst.clone()]),
            })
            .collect()
    }

    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats {
            total_doc1: self.lines1.len(),
            total_doc2: self.lines2.len(),
            ..Default::default()
        };
        for op in &self.ops {
            match op.tag {
                OpTag::Equal => stats.unchanged += op.src.len(),
                OpTag::Insert => stats.added += op.dst.len(),
                OpTag::Delete => stats.removed += op.src.len(),
                OpTag::Replace => {
                    stats.added += op.dst.len();
                    stats.removed += op.src.len();
                }
            }
        }
        stats
    }

    pub fn summary(&self) -> DiffSummary {
        let stats = self.stats();
        let changed = self
            .ops
            .iter()
            .filter(|op| op.tag == OpTag::Replace)
            .map(|op| op.src.len().min(op.dst.len()))
            .sum();
        DiffSummary {
            added: stats.added,
            removed: stats.removed,
            changed,
        }
    }

    /// "N lines added, M lines removed, K lines changed", or
    /// "No changes detected." when the documents match.
    pub fn summarize_changes(&self) -> String {
        let summary = self.summary();
        let mut parts = Vec::new();
        if summary.added > 0 {
            parts.push(format!("{} lines added", summary.added));
        }
        if summary.removed > 0 {
            parts.push(format!("{} lines removed", summary.removed));
        }
        if summary.changed > 0 {
            parts.push(format!("{} lines changed", summary.changed));
        }
        if parts.is_empty() {
            return "No changes detected.".to_string();
        }
        parts.join(", ")
    }

    /// Added plus removed lines over the longer document, as a percentage
    /// rounded to two decimals.
    pub fn percentage(&self) -> f64 {
        let stats = self.stats();
        let total = stats.total_doc1.max(stats.total_doc2);
        round_to(percentage(stats.added + stats.removed, total), 2)
    }

    pub fn lists(&self) -> DiffLists {
        let mut lists = DiffLists::default();
        for op in &self.ops {
            match op.tag {
                OpTag::Equal => lists.unchanged.extend(owned(&self.lines1[op.src.clone()])),
                _ => {
                    lists.removed.extend(owned(&self.lines1[op.src.clone()]));
                    lists.added.extend(owned(&self.lines2[op.dst.clone()]));
                }
            }
        }
        lists
    }

    pub fn changed_lines(&self) -> Vec<ChangedLine> {
        let mut changes = Vec::new();
        for op in self.ops.iter().filter(|op| op.tag != OpTag::Equal) {
            for i in op.src.clone() {
                changes.push(ChangedLine {
                    line_number: i + 1,
                    kind: ChangeKind::Removed,
                    content: self.lines1[i].to_string(),
                });
            }
            for j in op.dst.clone() {
                changes.push(ChangedLine {
                    line_number: j + 1,
                    kind: ChangeKind::Added,
                    content: self.lines2[j].to_string(),
                });
            }
        }
        changes
    }

    /// Line-number correspondence for equal spans only.
    pub fn line_mapping(&self) -> Vec<LineMapping> {
        self.ops
            .iter()
            .filter(|op| op.tag == OpTag::Equal)
            .flat_map(|op| op.src.clone().zip(op.dst.clone()))
            .map(|(i, j)| LineMapping {
                doc1_line: i + 1,
                doc2_line: j + 1,
                content: self.lines1[i].to_string(),
            })
            .collect()
    }

    /// One block per non-equal opcode, padded with `context` lines.
    pub fn blocks(&self, context: usize) -> Vec<DiffBlock> {
        let len1 = self.lines1.len();
        let len2 = self.lines2.len();
        self.ops
            .iter()
            .filter(|op| op.tag != OpTag::Equal)
            .map(|op| {
                let start1 = op.src.start.saturating_sub(context);
                let end1 = (op.src.end + context).min(len1);
                let start2 = op.dst.start.saturating_sub(context);
                let end2 = (op.dst.end + context).min(len2);
                DiffBlock {
                    start1: start1 + 1,
                    end1,
                    start2: start2 + 1,
                    end2,
                    lines1: owned(&self.lines1[start1..end1]),
                    lines2: owned(&self.lines2[start2..end2]),
                    change_type: op.tag,
                }
            })
            .collect()
    }

    /// Multi-line human-readable summary of the comparison.
    pub fn summary_report(&self) -> String {
        let stats = self.stats();
        let summary = self.summary();
        format!(
            "Document 1 lines: {}\n\
             Document 2 lines: {}\n\
             Unchanged lines: {}\n\
             Added lines: {}\n\
             Removed lines: {}\n\
             Changed lines: {}\n\
             Change Percentage: {}%\n\
             Summary: {}",
            stats.total_doc1,
            stats.total_doc2,
            stats.unchanged,
            stats.added,
            stats.removed,
            summary.changed,
            self.percentage(),
            self.summarize_changes()
        )
    }
}

fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|l| l.to_string()).collect()
}

/// Word-level added / removed / common counts.
pub fn word_diff_stats(doc1: &str, doc2: &str) -> WordDiffStats {
    let words1: Vec<&str> = doc1.split_whitespace().collect();
    let words2: Vec<&str> = doc2.split_whitespace().collect();
    let mut stats = WordDiffStats::default();
    for op in engine::opcodes(&words1, &words2) {
        match op.tag {
            OpTag::Equal => stats.common += op.src.len(),
            _ => {
                stats.removed += op.src.len();
                stats.added += op.dst.len();
            }
        }
    }
    stats
}

/// Word-level changes for each line position whose text differs.
///
/// Lines are paired by position (line `i` of one document against line
/// `i` of the other); a missing line reads as empty.
pub fn word_level_highlights(doc1: &str, doc2: &str) -> Vec<WordHighlight> {
    let lines1 = split_lines(doc1);
    let lines2 = split_lines(doc2);
    let max_lines = lines1.len().max(lines2.len());
    let mut results = Vec::new();

    for i in 0..max_lines {
        let l1 = lines1.get(i).copied().unwrap_or("");
        let l2 = lines2.get(i).copied().unwrap_or("");
        if l1 == l2 {
            continue;
        }
        let w1: Vec<&str> = l1.split_whitespace().collect();
        let w2: Vec<&str> = l2.split_whitespace().collect();
        let mut changes = Vec::new();
        for op in engine::opcodes(&w1, &w2) {
            if op.tag == OpTag::Equal {
                changes.extend(w1[op.src].iter().map(|w| (ChangeKind::Unchanged, w.to_string())));
                continue;
            }
            changes.extend(w1[op.src].iter().map(|w| (ChangeKind::Removed, w.to_string())));
            changes.extend(w2[op.dst].iter().map(|w| (ChangeKind::Added, w.to_string())));
        }
        results.push(WordHighlight {
            line_number: i + 1,
            changes,
        });
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_boundaries() {
        assert_eq!(split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(split_lines("one\u{2028}two\u{0c}three\n"), vec!["one", "two", "three"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("x\r"), vec!["x"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_carriage_return_documents_diff_by_line() {
        let stats = LineDiff::new("alpha\rbeta\rgamma", "alpha\rBETA\rgamma").stats();
        assert_eq!(stats.total_doc1, 3);
        assert_eq!(stats.unchanged, 2);
        assert_eq!(stats.removed, 1);
        assert_eq!(stats.added, 1);
    }

    #[test]
    fn test_identical_documents() {
        let diff = LineDiff::new("The quick brown fox", "The quick brown fox");
        let stats = diff.stats();
        assert_eq!(stats.unchanged, 1);
        assert_eq!(stats.added, 0);
        assert_eq!(stats.removed, 0);
        assert_eq!(diff.summarize_changes(), "No changes detected.");
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_disjoint_documents() {
        let diff = LineDiff::new("apple banana", "car truck");
        let stats = diff.stats();
        assert_eq!(stats.unchanged, 0);
        assert_eq!(stats.added, 1);
        assert_eq!(stats.removed, 1);
        assert_eq!(diff.summary().changed, 1);
        assert_eq!(diff.percentage(), 200.0);
    }

    #[test]
    fn test_stats_partition_invariant() {
        let doc1 = "a\nb\nc\nd\ne";
        let doc2 = "a\nx\nc\ne\nf\ng";
        let stats = LineDiff::new(doc1, doc2).stats();
        assert_eq!(stats.unchanged + stats.removed, stats.total_doc1);
        assert_eq!(stats.unchanged + stats.added, stats.total_doc2);
    }

    #[test]
    fn test_empty_side_percentages() {
        let stats = LineDiff::new("", "one\ntwo\nthree").stats();
        assert_eq!(stats.unchanged_percent(), 0.0);
        assert_eq!(stats.added_percent(), 100.0);
        assert_eq!(stats.removed_percent(), 0.0);

        let both = LineDiff::new("", "");
        assert_eq!(both.stats().unchanged_percent(), 0.0);
        assert_eq!(both.percentage(), 0.0);
    }

    #[test]
    fn test_changed_lines_numbering() {
        let diff = LineDiff::new("keep\nold\nkeep2", "keep\nnew\nkeep2\nextra");
        let changes = diff.changed_lines();
        assert_eq!(
            changes,
            vec![
                ChangedLine {
                    line_number: 2,
                    kind: ChangeKind::Removed,
                    content: "old".into()
                },
                ChangedLine {
                    line_number: 2,
                    kind: ChangeKind::Added,
                    content: "new".into()
                },
                ChangedLine {
                    line_number: 4,
                    kind: ChangeKind::Added,
                    content: "extra".into()
                },
            ]
        );
    }

    #[test]
    fn test_line_mapping_equal_spans_only() {
        let diff = LineDiff::new("intro\nbody\nend", "new intro\nintro\nbody\nend");
        let mapping = diff.line_mapping();
        let pairs: Vec<(usize, usize)> = mapping.iter().map(|m| (m.doc1_line, m.doc2_line)).collect();
        assert_eq!(pairs, vec![(1, 2), (2, 3), (3, 4)]);
    }

    #[test]
    fn test_blocks_clamped_to_bounds() {
        let doc1 = "l1\nl2\nl3\nl4\nl5";
        let doc2 = "l1\nl2\nL3\nl4\nl5";
        let blocks = LineDiff::new(doc1, doc2).blocks(10);
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!((block.start1, block.end1), (1, 5));
        assert_eq!((block.start2, block.end2), (1, 5));
        assert_eq!(block.change_type, OpTag::Replace);
        assert_eq!(block.lines1.len(), 5);
    }

    #[test]
    fn test_blocks_with_context() {
        let doc1 = "l1\nl2\nl3\nl4\nl5\nl6";
        let doc2 = "l1\nl2\nl3\nl4\nl5\nl6\nl7";
        let blocks = LineDiff::new(doc1, doc2).blocks(2);
        assert_eq!(blocks[0].start1, 5);
        assert_eq!(blocks[0].end1, 6);
        assert_eq!(blocks[0].lines2, vec!["l5", "l6", "l7"]);
        assert_eq!(blocks[0].change_type, OpTag::Insert);
    }

    #[test]
    fn test_lists() {
        let lists = LineDiff::new("a\nb", "a\nc").lists();
        assert_eq!(lists.unchanged, vec!["a"]);
        assert_eq!(lists.removed, vec!["b"]);
        assert_eq!(lists.added, vec!["c"]);
    }

    #[test]
    fn test_summarize_changes_text() {
        let diff = LineDiff::new("a\nb", "a\nc\nd");
        assert_eq!(
            diff.summarize_changes(),
            "2 lines added, 1 lines removed, 1 lines changed"
        );
    }

    #[test]
    fn test_word_diff_stats() {
        let stats = word_diff_stats("the cat sat", "the dog sat down");
        assert_eq!(
            stats,
            WordDiffStats {
                added: 2,
                removed: 1,
                common: 2
            }
        );
    }

    #[test]
    fn test_word_level_highlights_positional() {
        let highlights = word_level_highlights("same\nthe cat", "same\nthe dog\nnew line");
        assert_eq!(highlights.len(), 2);
        assert_eq!(highlights[0].line_number, 2);
        assert_eq!(
            highlights[0].changes,
            vec![
                (ChangeKind::Unchanged, "the".to_string()),
                (ChangeKind::Removed, "cat".to_string()),
                (ChangeKind::Added, "dog".to_string()),
            ]
        );
        assert_eq!(highlights[1].line_number, 3);
    }

    #[test]
    fn test_summary_report_mentions_percentage() {
        let report = LineDiff::new("a", "b").summary_report();
        assert!(report.contains("Change Percentage: 200%"));
        assert!(report.starts_with("Document 1 lines: 1"));
    }
}
