//! Longest-common-subsequence edit scripts.
//!
//! Every lexical view (unified, side-by-side, inline, stats, blocks, line
//! mapping) is derived from the opcode list produced here. The script is
//! computed over any `PartialEq` sequence, so the same code serves line,
//! word and character granularity.
//!
//! # Algorithm
//!
//! 1. Strip the common prefix and suffix (cheap, and usually most of a
//!    revised document).
//! 2. While the remaining middle section is larger than
//!    [`TABLE_CELL_LIMIT`] cells, split it Hirschberg-style: halve the
//!    source, find the target split point from one forward and one
//!    backward LCS row, and recurse on both halves. Memory stays linear in
//!    the document size.
//! 3. Below the limit, fill a suffix LCS table and walk it from the
//!    top-left, preferring matches, then deletes, then inserts.
//! 4. Collapse the walk into opcodes; a non-equal run touching both
//!    sides becomes a single `Replace`.

use serde::Serialize;
use std::ops::Range;

/// Kind of edit described by an [`Opcode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpTag {
    Equal,
    Insert,
    Delete,
    Replace,
}

impl OpTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpTag::Equal => "equal",
            OpTag::Insert => "insert",
            OpTag::Delete => "delete",
            OpTag::Replace => "replace",
        }
    }
}

/// One edit operation: `source[src]` becomes `target[dst]`.
///
/// Across a full opcode list the ranges partition both sequences
/// contiguously and monotonically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Opcode {
    pub tag: OpTag,
    pub src: Range<usize>,
    pub dst: Range<usize>,
}

impl Opcode {
    fn new(tag: OpTag, src: Range<usize>, dst: Range<usize>) -> Self {
        Self { tag, src, dst }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Step {
    Keep,
    Remove,
    Add,
}

/// Compute the opcode list turning `a` into `b`.
pub fn opcodes<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Opcode> {
    let prefix = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];

    let mut steps = Vec::with_capacity(a.len().max(b.len()));
    steps.extend(std::iter::repeat(Step::Keep).take(prefix));
    steps.extend(middle_steps(mid_a, mid_b));
    steps.extend(std::iter::repeat(Step::Keep).take(suffix));

    collapse(&steps)
}

/// Largest LCS table, in cells, filled in one piece. Larger middle
/// sections are split first.
pub const TABLE_CELL_LIMIT: usize = 1 << 22;

fn middle_steps<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Step> {
    let mut steps = Vec::with_capacity(a.len() + b.len());
    split_steps(a, b, TABLE_CELL_LIMIT, &mut steps);
    steps
}

fn split_steps<T: PartialEq>(a: &[T], b: &[T], cell_limit: usize, out: &mut Vec<Step>) {
    let n = a.len();
    let m = b.len();
    if n == 0 {
        out.extend(std::iter::repeat(Step::Add).take(m));
        return;
    }
    if m == 0 {
        out.extend(std::iter::repeat(Step::Remove).take(n));
        return;
    }
    if n == 1 || (n + 1).saturating_mul(m + 1) <= cell_limit {
        table_steps(a, b, out);
        return;
    }

    let mid = n / 2;
    let forward = last_row(&a[..mid], b, false);
    let backward = last_row(&a[mid..], b, true);
    let mut split = 0;
    let mut best = 0;
    for k in 0..=m {
        let score = forward[k] + backward[m - k];
        if score > best {
            best = score;
            split = k;
        }
    }

    split_steps(&a[..mid], &b[..split], cell_limit, out);
    split_steps(&a[mid..], &b[split..], cell_limit, out);
}

fn table_steps<T: PartialEq>(a: &[T], b: &[T], out: &mut Vec<Step>) {
    let n = a.len();
    let m = b.len();

    // dp[i][j] = LCS length of a[i..] and b[j..]
    let width = m + 1;
    let mut dp = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            dp[i * width + j] = if a[i] == b[j] {
                dp[(i + 1) * width + j + 1] + 1
            } else {
                dp[(i + 1) * width + j].max(dp[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            out.push(Step::Keep);
            i += 1;
            j += 1;
        } else if dp[(i + 1) * width + j] >= dp[i * width + j + 1] {
            out.push(Step::Remove);
            i += 1;
        } else {
            out.push(Step::Add);
            j += 1;
        }
    }
    out.extend(std::iter::repeat(Step::Remove).take(n - i));
    out.extend(std::iter::repeat(Step::Add).take(m - j));
}

/// Final row of the LCS table of `a` against every prefix of `b`, kept in
/// two rolling rows. With `reversed`, both inputs are read back to front,
/// so entry `k` is the LCS of `a` and the last `k` items of `b`.
fn last_row<T: PartialEq>(a: &[T], b: &[T], reversed: bool) -> Vec<usize> {
    let n = a.len();
    let m = b.len();
    let mut prev = vec![0usize; m + 1];
    let mut curr = vec![0usize; m + 1];
    for i in 0..n {
        let x = if reversed { &a[n - 1 - i] } else { &a[i] };
        for j in 0..m {
            let y = if reversed { &b[m - 1 - j] } else { &b[j] };
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev
}

fn collapse(steps: &[Step]) -> Vec<Opcode> {
    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);
    let mut idx = 0;

    while idx < steps.len() {
        let (i0, j0) = (i, j);
        if steps[idx] == Step::Keep {
            while idx < steps.len() && steps[idx] == Step::Keep {
                i += 1;
                j += 1;
                idx += 1;
            }
            ops.push(Opcode::new(OpTag::Equal, i0..i, j0..j));
            continue;
        }

        while let Some(&step) = steps.get(idx).filter(|s| **s != Step::Keep) {
            if step == Step::Remove {
                i += 1;
            } else {
                j += 1;
            }
            idx += 1;
        }
        let tag = match (i > i0, j > j0) {
            (true, true) => OpTag::Replace,
            (true, false) => OpTag::Delete,
            _ => OpTag::Insert,
        };
        ops.push(Opcode::new(tag, i0..i, j0..j));
    }

    ops
}

/// Length of the longest common subsequence of `a` and `b`.
///
/// Uses two rolling rows, so memory stays linear for long texts.
pub fn lcs_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let prefix = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];

    prefix + suffix + last_row(mid_a, mid_b, false)[mid_b.len()]
}

/// Group opcodes into hunks with `n` lines of surrounding context.
///
/// Leading and trailing equal runs are trimmed to `n` lines; an equal run
/// longer than `2n` splits two hunks. Returns no hunks when nothing changed.
pub fn grouped_opcodes(ops: &[Opcode], n: usize) -> Vec<Vec<Opcode>> {
    let mut codes: Vec<Opcode> = if ops.is_empty() {
        vec![Opcode::new(OpTag::Equal, 0..1, 0..1)]
    } else {
        ops.to_vec()
    };

    if let Some(first) = codes.first_mut() {
        if first.tag == OpTag::Equal {
            first.src.start = first.src.start.max(first.src.end.saturating_sub(n));
            first.dst.start = first.dst.start.max(first.dst.end.saturating_sub(n));
        }
    }
    if let Some(last) = codes.last_mut() {
        if last.tag == OpTag::Equal {
            last.src.end = last.src.end.min(last.src.start + n);
            last.dst.end = last.dst.end.min(last.dst.start + n);
        }
    }

    let nn = n + n;
    let mut groups = Vec::new();
    let mut group = Vec::new();
    for op in codes {
        let mut src = op.src.clone();
        let mut dst = op.dst.clone();
        if op.tag == OpTag::Equal && src.len() > nn {
            group.push(Opcode::new(
                OpTag::Equal,
                src.start..src.end.min(src.start + n),
                dst.start..dst.end.min(dst.start + n),
            ));
            groups.push(std::mem::take(&mut group));
            src.start = src.start.max(src.end.saturating_sub(n));
            dst.start = dst.start.max(dst.end.saturating_sub(n));
        }
        group.push(Opcode::new(op.tag, src, dst));
    }
    if !group.is_empty() && !(group.len() == 1 && group[0].tag == OpTag::Equal) {
        groups.push(group);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_partition(ops: &[Opcode], a_len: usize, b_len: usize) {
        let (mut i, mut j) = (0, 0);
        for op in ops {
            assert_eq!(op.src.start, i, "source gap at {:?}", op);
            assert_eq!(op.dst.start, j, "target gap at {:?}", op);
            i = op.src.end;
            j = op.dst.end;
        }
        assert_eq!(i, a_len);
        assert_eq!(j, b_len);
    }

    #[test]
    fn test_identical_single_equal() {
        let a = ["x", "y", "z"];
        let ops = opcodes(&a, &a);
        assert_eq!(ops, vec![Opcode::new(OpTag::Equal, 0..3, 0..3)]);
    }

    #[test]
    fn test_both_empty_no_ops() {
        let a: [&str; 0] = [];
        assert!(opcodes(&a, &a).is_empty());
    }

    #[test]
    fn test_insert_and_delete() {
        let a = ["a", "b", "c"];
        let b = ["a", "c", "d"];
        let ops = opcodes(&a, &b);
        let tags: Vec<OpTag> = ops.iter().map(|o| o.tag).collect();
        assert_eq!(
            tags,
            vec![OpTag::Equal, OpTag::Delete, OpTag::Equal, OpTag::Insert]
        );
        check_partition(&ops, 3, 3);
    }

    #[test]
    fn test_replace_collapses_run() {
        let a = ["apple banana"];
        let b = ["car truck"];
        let ops = opcodes(&a, &b);
        assert_eq!(ops, vec![Opcode::new(OpTag::Replace, 0..1, 0..1)]);
    }

    #[test]
    fn test_partition_on_mixed_edits() {
        let a: Vec<char> = "the quick brown fox jumps".chars().collect();
        let b: Vec<char> = "a quick red fox leaps high".chars().collect();
        let ops = opcodes(&a, &b);
        check_partition(&ops, a.len(), b.len());
        for pair in ops.windows(2) {
            assert!(
                !(pair[0].tag == OpTag::Equal && pair[1].tag == OpTag::Equal),
                "adjacent equal runs must merge"
            );
        }
    }

    #[test]
    fn test_lcs_len_symmetric() {
        let a: Vec<char> = "kitten sitting".chars().collect();
        let b: Vec<char> = "sitting kitten".chars().collect();
        assert_eq!(lcs_len(&a, &b), lcs_len(&b, &a));
        assert_eq!(lcs_len(&a, &a), a.len());
    }

    #[test]
    fn test_lcs_len_matches_opcodes() {
        let a: Vec<char> = "abcbdab".chars().collect();
        let b: Vec<char> = "bdcaba".chars().collect();
        let equal = equal_count(&opcodes(&a, &b));
        assert_eq!(lcs_len(&a, &b), 4);
        assert_eq!(equal, 4);
    }

    fn equal_count(ops: &[Opcode]) -> usize {
        ops.iter()
            .filter(|o| o.tag == OpTag::Equal)
            .map(|o| o.src.len())
            .sum()
    }

    fn collapse_split(a: &[char], b: &[char], cell_limit: usize) -> Vec<Opcode> {
        let mut steps = Vec::new();
        split_steps(a, b, cell_limit, &mut steps);
        collapse(&steps)
    }

    #[test]
    fn test_split_matches_table_lcs() {
        let cases = [
            ("abcbdab", "bdcaba"),
            ("the quick brown fox jumps", "a quick red fox leaps high"),
            ("aaaaabbbbb", "bbbbbaaaaa"),
            ("xyz", "abcdefghxyz"),
        ];
        for (x, y) in cases {
            let a: Vec<char> = x.chars().collect();
            let b: Vec<char> = y.chars().collect();
            for limit in [0, 8, 30] {
                let ops = collapse_split(&a, &b, limit);
                check_partition(&ops, a.len(), b.len());
                assert_eq!(equal_count(&ops), lcs_len(&a, &b), "{x:?} vs {y:?} at {limit}");
                for op in ops.iter().filter(|o| o.tag == OpTag::Equal) {
                    assert_eq!(a[op.src.clone()], b[op.dst.clone()]);
                }
            }
        }
    }

    #[test]
    fn test_large_distinct_documents_split() {
        // 3000 x 3000 lines is past the single-table limit.
        let a: Vec<String> = (0..3000).map(|i| format!("old {}", i)).collect();
        let b: Vec<String> = (0..3000)
            .map(|i| {
                if i % 3 == 0 {
                    format!("old {}", i)
                } else {
                    format!("new {}", i)
                }
            })
            .collect();
        assert!(a.len() * b.len() > TABLE_CELL_LIMIT);

        let ops = opcodes(&a, &b);
        check_partition(&ops, a.len(), b.len());
        assert_eq!(equal_count(&ops), 1000);
    }

    #[test]
    fn test_grouped_opcodes_splits_distant_changes() {
        let a: Vec<String> = (0..20).map(|i| format!("line {}", i)).collect();
        let mut b = a.clone();
        b[1] = "changed 1".to_string();
        b[18] = "changed 18".to_string();
        let groups = grouped_opcodes(&opcodes(&a, &b), 2);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0][0].src, 0..1);
        assert_eq!(groups[1].last().unwrap().src, 19..20);
    }

    #[test]
    fn test_grouped_opcodes_no_changes() {
        let a = ["same"];
        assert!(grouped_opcodes(&opcodes(&a, &a), 3).is_empty());
    }
}
