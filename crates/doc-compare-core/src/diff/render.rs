//! Human-readable renderings of a [`LineDiff`].
//!
//! All three views walk the same opcode list, grouped into hunks by
//! [`grouped_opcodes`] when a context size is given.

use unicode_segmentation::UnicodeSegmentation;

use super::engine::{self, grouped_opcodes, OpTag, Opcode};
use super::report::LineDiff;

const FROM_FILE: &str = "Document 1";
const TO_FILE: &str = "Document 2";
const HUNK_SEPARATOR: &str = "...";

/// `start,len` for a unified hunk header, 1-based.
fn format_range(start: usize, stop: usize) -> String {
    let length = stop - start;
    let beginning = start + 1;
    match length {
        1 => beginning.to_string(),
        0 => format!("{},0", beginning - 1),
        _ => format!("{},{}", beginning, length),
    }
}

fn hunks(ops: &[Opcode], context: Option<usize>) -> Vec<Vec<Opcode>> {
    match context {
        Some(n) => grouped_opcodes(ops, n),
        None if ops.iter().any(|op| op.tag != OpTag::Equal) => vec![ops.to_vec()],
        None => Vec::new(),
    }
}

fn display_width(s: &str) -> usize {
    s.graphemes(true).count()
}

impl<'a> LineDiff<'a> {
    /// Unified diff with `context` lines around each hunk.
    ///
    /// Empty when the documents are identical.
    pub fn unified(&self, context: usize) -> String {
        let groups = grouped_opcodes(self.opcodes(), context);
        if groups.is_empty() {
            return String::new();
        }

        let mut out = vec![format!("--- {}", FROM_FILE), format!("+++ {}", TO_FILE)];
        for group in groups {
            let (Some(first), Some(last)) = (group.first(), group.last()) else {
                continue;
            };
            out.push(format!(
                "@@ -{} +{} @@",
                format_range(first.src.start, last.src.end),
                format_range(first.dst.start, last.dst.end)
            ));
            for op in &group {
                if op.tag == OpTag::Equal {
                    out.extend(self.lines1()[op.src.clone()].iter().map(|l| format!(" {}", l)));
                    continue;
                }
                out.extend(self.lines1()[op.src.clone()].iter().map(|l| format!("-{}", l)));
                out.extend(self.lines2()[op.dst.clone()].iter().map(|l| format!("+{}", l)));
            }
        }
        out.join("\n")
    }

    /// Two-column view. The gutter marker is blank for equal lines, `|`
    /// for changed pairs, `<` for removals and `>` for additions.
    ///
    /// With `context = None` every line is shown; otherwise hunks are
    /// separated by a `...` row.
    pub fn side_by_side(&self, context: Option<usize>) -> String {
        let width = self
            .lines1()
            .iter()
            .map(|l| display_width(l))
            .max()
            .unwrap_or(0);
        let row = |left: &str, marker: char, right: &str| {
            let pad = width.saturating_sub(display_width(left));
            format!("{}{} {} {}", left, " ".repeat(pad), marker, right)
                .trim_end()
                .to_string()
        };

        let mut out = Vec::new();
        for (idx, group) in hunks(self.opcodes(), context).iter().enumerate() {
            if idx > 0 {
                out.push(HUNK_SEPARATOR.to_string());
            }
            for op in group {
                let left = &self.lines1()[op.src.clone()];
                let right = &self.lines2()[op.dst.clone()];
                match op.tag {
                    OpTag::Equal => {
                        out.extend(left.iter().zip(right).map(|(l, r)| row(l, ' ', r)));
                    }
                    OpTag::Delete => out.extend(left.iter().map(|l| row(l, '<', ""))),
                    OpTag::Insert => out.extend(right.iter().map(|r| row("", '>', r))),
                    OpTag::Replace => {
                        let paired = left.len().min(right.len());
                        for k in 0..paired {
                            out.push(row(left[k], '|', right[k]));
                        }
                        out.extend(left[paired..].iter().map(|l| row(l, '<', "")));
                        out.extend(right[paired..].iter().map(|r| row("", '>', r)));
                    }
                }
            }
        }
        out.join("\n")
    }

    /// Inline markup: removed text as `[-..-]`, added text as `{+..+}`.
    ///
    /// Paired lines inside a replace span are marked up word by word;
    /// unpaired lines are marked up whole. Only changed hunks are shown,
    /// with `context` equal lines around them prefixed by two spaces.
    pub fn inline(&self, context: usize) -> String {
        let mut out = Vec::new();
        for (idx, group) in grouped_opcodes(self.opcodes(), context).iter().enumerate() {
            if idx > 0 {
                out.push(HUNK_SEPARATOR.to_string());
            }
            for op in group {
                let left = &self.lines1()[op.src.clone()];
                let right = &self.lines2()[op.dst.clone()];
                match op.tag {
                    OpTag::Equal => out.extend(left.iter().map(|l| format!("  {}", l))),
                    OpTag::Delete => out.extend(left.iter().map(|l| format!("[-{}-]", l))),
                    OpTag::Insert => out.extend(right.iter().map(|r| format!("{{+{}+}}", r))),
                    OpTag::Replace => {
                        let paired = left.len().min(right.len());
                        for k in 0..paired {
                            out.push(inline_words(left[k], right[k]));
                        }
                        out.extend(left[paired..].iter().map(|l| format!("[-{}-]", l)));
                        out.extend(right[paired..].iter().map(|r| format!("{{+{}+}}", r)));
                    }
                }
            }
        }
        out.join("\n")
    }
}

fn inline_words(old: &str, new: &str) -> String {
    let w1: Vec<&str> = old.split_whitespace().collect();
    let w2: Vec<&str> = new.split_whitespace().collect();
    let mut parts = Vec::new();
    for op in engine::opcodes(&w1, &w2) {
        let removed = w1[op.src.clone()].join(" ");
        let added = w2[op.dst.clone()].join(" ");
        match op.tag {
            OpTag::Equal => parts.push(removed),
            OpTag::Delete => parts.push(format!("[-{}-]", removed)),
            OpTag::Insert => parts.push(format!("{{+{}+}}", added)),
            OpTag::Replace => parts.push(format!("[-{}-]{{+{}+}}", removed, added)),
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_range() {
        assert_eq!(format_range(0, 3), "1,3");
        assert_eq!(format_range(4, 5), "5");
        assert_eq!(format_range(2, 2), "2,0");
        assert_eq!(format_range(0, 0), "0,0");
    }

    #[test]
    fn test_unified_identical_is_empty() {
        let diff = LineDiff::new("a\nb", "a\nb");
        assert_eq!(diff.unified(3), "");
    }

    #[test]
    fn test_unified_format() {
        let diff = LineDiff::new("one\ntwo\nthree", "one\n2\nthree");
        let expected = "--- Document 1\n\
                        +++ Document 2\n\
                        @@ -1,3 +1,3 @@\n \
                        one\n\
                        -two\n\
                        +2\n \
                        three";
        assert_eq!(diff.unified(3), expected);
    }

    #[test]
    fn test_unified_zero_context() {
        let diff = LineDiff::new("a\nb\nc", "a\nc");
        assert_eq!(diff.unified(0), "--- Document 1\n+++ Document 2\n@@ -2 +1,0 @@\n-b");
    }

    #[test]
    fn test_side_by_side_markers() {
        let diff = LineDiff::new("same\nold\ngone", "same\nnew");
        let rendered = diff.side_by_side(None);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["same   same", "old  | new", "gone <"]);
    }

    #[test]
    fn test_side_by_side_identical_is_empty() {
        assert_eq!(LineDiff::new("x", "x").side_by_side(None), "");
    }

    #[test]
    fn test_inline_word_markup() {
        let diff = LineDiff::new("the cat sat", "the dog sat");
        assert_eq!(diff.inline(0), "the [-cat-]{+dog+} sat");
    }

    #[test]
    fn test_inline_whole_lines() {
        let diff = LineDiff::new("keep\ndrop", "keep\nadd\nmore");
        assert_eq!(diff.inline(1), "  keep\n[-drop-]{+add+}\n{+more+}");
    }
}
