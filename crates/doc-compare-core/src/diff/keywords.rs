//! Keyword presence and line lookup across two documents.

use serde::Serialize;

use super::report::split_lines;

/// Where one keyword occurs in each document. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordHit {
    pub keyword: String,
    pub in_doc1: bool,
    pub in_doc2: bool,
    pub lines_in_doc1: Vec<usize>,
    pub lines_in_doc2: Vec<usize>,
}

/// Substring search for each keyword, line by line.
///
/// With `case_sensitive = false` both the lines and the keywords are
/// lowercased for matching, and keywords that fold to the same text are
/// reported once. The returned `keyword` always keeps the caller's casing
/// (the first spelling seen, when folded duplicates collapse).
pub fn keyword_search(
    doc1: &str,
    doc2: &str,
    keywords: &[impl AsRef<str>],
    case_sensitive: bool,
) -> Vec<KeywordHit> {
    let fold = |s: &str| {
        if case_sensitive {
            s.to_string()
        } else {
            s.to_lowercase()
        }
    };
    let lines1: Vec<String> = split_lines(doc1).into_iter().map(fold).collect();
    let lines2: Vec<String> = split_lines(doc2).into_iter().map(fold).collect();

    let matching = |lines: &[String], needle: &str| -> Vec<usize> {
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains(needle))
            .map(|(i, _)| i + 1)
            .collect()
    };

    let mut seen: Vec<String> = Vec::new();
    let mut hits = Vec::new();
    for keyword in keywords {
        let keyword = keyword.as_ref();
        let needle = fold(keyword);
        if seen.contains(&needle) {
            continue;
        }
        let lines_in_doc1 = matching(&lines1, &needle);
        let lines_in_doc2 = matching(&lines2, &needle);
        hits.push(KeywordHit {
            keyword: keyword.to_string(),
            in_doc1: !lines_in_doc1.is_empty(),
            in_doc2: !lines_in_doc2.is_empty(),
            lines_in_doc1,
            lines_in_doc2,
        });
        seen.push(needle);
    }
    hits
}
