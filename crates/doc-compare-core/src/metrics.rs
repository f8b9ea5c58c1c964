//! Cheap text metrics over whitespace tokens, plus the rounding and
//! percentage helpers every report uses.
//!
//! Every ratio here guards its denominator: an empty document yields a
//! defined neutral value, never `NaN`.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::diff::split_lines;

/// Round `value` to `places` decimal digits.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `part / total * 100`, or `0.0` when `total` is zero.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Absolute and relative difference of one count between two documents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CountDifference {
    pub doc1: usize,
    pub doc2: usize,
    pub difference: usize,
    /// Difference as a percentage of the larger count, two decimals.
    pub percent_difference: f64,
}

impl CountDifference {
    fn new(doc1: usize, doc2: usize) -> Self {
        let difference = doc1.abs_diff(doc2);
        Self {
            doc1,
            doc2,
            difference,
            percent_difference: round_to(percentage(difference, doc1.max(doc2)), 2),
        }
    }
}

pub fn word_count_difference(doc1: &str, doc2: &str) -> CountDifference {
    CountDifference::new(doc1.split_whitespace().count(), doc2.split_whitespace().count())
}

pub fn line_count_difference(doc1: &str, doc2: &str) -> CountDifference {
    CountDifference::new(split_lines(doc1).len(), split_lines(doc2).len())
}

pub fn char_count_difference(doc1: &str, doc2: &str) -> CountDifference {
    CountDifference::new(doc1.chars().count(), doc2.chars().count())
}

/// Distinct words over total words, three decimals. Case-sensitive.
pub fn unique_word_ratio(doc: &str) -> f64 {
    let words: Vec<&str> = doc.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&str> = words.iter().copied().collect();
    round_to(unique.len() as f64 / words.len() as f64, 3)
}

fn lower_words(doc: &str) -> Vec<String> {
    doc.split_whitespace().map(str::to_lowercase).collect()
}

/// Jaccard similarity of lowercased word sets, three decimals.
///
/// Two documents with no words at all are identical: `1.0`.
pub fn jaccard_similarity(doc1: &str, doc2: &str) -> f64 {
    let set1: HashSet<String> = lower_words(doc1).into_iter().collect();
    let set2: HashSet<String> = lower_words(doc2).into_iter().collect();
    let union = set1.union(&set2).count();
    if union == 0 {
        return 1.0;
    }
    let intersection = set1.intersection(&set2).count();
    round_to(intersection as f64 / union as f64, 3)
}

/// Bag-of-words cosine similarity over lowercased words, three decimals.
///
/// `0.0` when either document has no words.
pub fn cosine_similarity(doc1: &str, doc2: &str) -> f64 {
    let counts = |doc: &str| {
        let mut map: HashMap<String, usize> = HashMap::new();
        for word in lower_words(doc) {
            *map.entry(word).or_default() += 1;
        }
        map
    };
    let c1 = counts(doc1);
    let c2 = counts(doc2);

    let dot: usize = c1
        .iter()
        .map(|(w, n)| n * c2.get(w).copied().unwrap_or(0))
        .sum();
    let norm = |c: &HashMap<String, usize>| (c.values().map(|n| (n * n) as f64).sum::<f64>()).sqrt();
    let (n1, n2) = (norm(&c1), norm(&c2));
    if n1 == 0.0 || n2 == 0.0 {
        return 0.0;
    }
    round_to(dot as f64 / (n1 * n2), 3)
}

/// Percentage of distinct keywords that appear as whole words in `doc`,
/// compared case-insensitively. Two decimals; `0.0` with no keywords.
pub fn keyword_coverage(doc: &str, keywords: &[impl AsRef<str>]) -> f64 {
    let words: HashSet<String> = lower_words(doc).into_iter().collect();
    let keywords: HashSet<String> = keywords.iter().map(|k| k.as_ref().to_lowercase()).collect();
    let found = keywords.iter().filter(|k| words.contains(*k)).count();
    round_to(percentage(found, keywords.len()), 2)
}

/// Keyword coverage of each document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeywordCoverage {
    pub doc1: f64,
    pub doc2: f64,
}

/// Every text metric for one document pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextMetrics {
    pub word_count: CountDifference,
    pub line_count: CountDifference,
    pub char_count: CountDifference,
    pub unique_word_ratio_doc1: f64,
    pub unique_word_ratio_doc2: f64,
    pub jaccard_similarity: f64,
    pub cosine_similarity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_coverage: Option<KeywordCoverage>,
}

/// Compute the full metric bundle. Keyword coverage is only present when
/// keywords are supplied.
pub fn all_metrics(doc1: &str, doc2: &str, keywords: &[String]) -> TextMetrics {
    let keyword_coverage = (!keywords.is_empty()).then(|| KeywordCoverage {
        doc1: keyword_coverage(doc1, keywords),
        doc2: keyword_coverage(doc2, keywords),
    });
    TextMetrics {
        word_count: word_count_difference(doc1, doc2),
        line_count: line_count_difference(doc1, doc2),
        char_count: char_count_difference(doc1, doc2),
        unique_word_ratio_doc1: unique_word_ratio(doc1),
        unique_word_ratio_doc2: unique_word_ratio(doc2),
        jaccard_similarity: jaccard_similarity(doc1, doc2),
        cosine_similarity: cosine_similarity(doc1, doc2),
        keyword_coverage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 3), 0.123);
        assert_eq!(round_to(66.6666, 2), 66.67);
    }

    #[test]
    fn test_count_differences() {
        let words = word_count_difference("a b c d", "a b");
        assert_eq!(words.difference, 2);
        assert_eq!(words.percent_difference, 50.0);

        let empty = char_count_difference("", "");
        assert_eq!(empty.percent_difference, 0.0);
    }

    #[test]
    fn test_jaccard_disjoint_and_empty() {
        assert_eq!(jaccard_similarity("apple banana", "car truck"), 0.0);
        assert_eq!(jaccard_similarity("", ""), 1.0);
        assert_eq!(jaccard_similarity("The cat", "the CAT"), 1.0);
    }

    #[test]
    fn test_cosine() {
        assert_eq!(cosine_similarity("a b", "a b"), 1.0);
        assert_eq!(cosine_similarity("a", ""), 0.0);
        assert_eq!(cosine_similarity("a b", "c d"), 0.0);
    }

    #[test]
    fn test_unique_word_ratio() {
        assert_eq!(unique_word_ratio(""), 0.0);
        assert_eq!(unique_word_ratio("to be or not to be"), 0.667);
    }

    #[test]
    fn test_keyword_coverage() {
        assert_eq!(keyword_coverage("The audit is done", &["AUDIT", "breach"]), 50.0);
        let none: [&str; 0] = [];
        assert_eq!(keyword_coverage("anything", &none), 0.0);
    }

    #[test]
    fn test_all_metrics_keyword_optional() {
        let metrics = all_metrics("a b", "a c", &[]);
        assert!(metrics.keyword_coverage.is_none());
        assert_eq!(metrics.jaccard_similarity, 0.333);

        let metrics = all_metrics("a b", "a c", &["b".to_string()]);
        let coverage = metrics.keyword_coverage.unwrap();
        assert_eq!(coverage.doc1, 100.0);
        assert_eq!(coverage.doc2, 0.0);
    }
}
