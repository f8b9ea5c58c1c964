//! Key-phrase based semantic comparison across two or more documents.
//!
//! Similarity between two documents is the Jaccard index of their key
//! phrase sets, rounded to three decimals. Two documents with no key
//! phrases at all are maximally similar (`1.0`).
//!
//! [`SemanticComparator`] answers one-shot questions. For corpus-wide
//! questions it builds a [`Corpus`], which analyzes every document exactly
//! once and then answers every pairwise query from the cached phrase sets.
//! The answers are the same as recomputing each pair from scratch.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::analysis::TextAnalyzer;
use crate::metrics::round_to;
use crate::models::TextAnalysis;

/// Default threshold below which a pair raises a semantic alert.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 0.3;
/// Default threshold below which consecutive documents mark a change point.
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 0.3;
/// Default mean-similarity threshold below which a document is an outlier.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 0.4;

const TOPIC_FALLBACK_COUNT: usize = 5;
const TOPIC_MIN_WORD_CHARS: usize = 4;

/// Deduplicated key phrases of one document, in first-seen order.
#[derive(Debug, Clone, Default)]
struct PhraseSet {
    ordered: Vec<String>,
    lookup: HashSet<String>,
}

impl PhraseSet {
    fn new(phrases: &[String]) -> Self {
        let mut set = Self::default();
        for phrase in phrases {
            if set.lookup.insert(phrase.clone()) {
                set.ordered.push(phrase.clone());
            }
        }
        set
    }

    fn contains(&self, phrase: &str) -> bool {
        self.lookup.contains(phrase)
    }

    fn minus(&self, other: &PhraseSet) -> Vec<String> {
        self.ordered
            .iter()
            .filter(|p| !other.contains(p))
            .cloned()
            .collect()
    }

    fn jaccard(&self, other: &PhraseSet) -> f64 {
        let intersection = self.ordered.iter().filter(|p| other.contains(p)).count();
        let union = self.ordered.len() + other.ordered.len() - intersection;
        if union == 0 {
            return 1.0;
        }
        round_to(intersection as f64 / union as f64, 3)
    }
}

/// Result of comparing two documents' key phrases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticAnalysis {
    pub similarity_score: f64,
    pub unique_to_doc1: Vec<String>,
    pub unique_to_doc2: Vec<String>,
    pub analysis_doc1: TextAnalysis,
    pub analysis_doc2: TextAnalysis,
}

/// Entities of one category split by which document mentions them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct EntityComparison {
    pub unique_to_doc1: Vec<String>,
    pub unique_to_doc2: Vec<String>,
    pub common: Vec<String>,
}

/// Symmetric N×N similarity matrix with a unit diagonal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Entry `(i, j)`, or `None` when either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.rows.get(i)?.get(j).copied()
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }
}

/// A document pair `(i, j)` with `i < j` and its similarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairScore {
    pub pair: (usize, usize),
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticAlert {
    pub pair: (usize, usize),
    pub similarity: f64,
    pub alert: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CommonAndUnique {
    /// Phrases present in every document, in the first document's order.
    pub common: Vec<String>,
    /// Per document, its phrases that are not common to all.
    pub unique: Vec<Vec<String>>,
}

/// Semantic comparison over a pluggable text-analysis backend.
#[derive(Clone, Copy)]
pub struct SemanticComparator<'a> {
    analyzer: &'a dyn TextAnalyzer,
}

impl<'a> SemanticComparator<'a> {
    pub fn new(analyzer: &'a dyn TextAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Analyze each document once for corpus-wide queries.
    pub fn corpus<S: AsRef<str>>(&self, docs: &[S]) -> Corpus {
        let analyses: Vec<TextAnalysis> = docs
            .iter()
            .map(|d| self.analyzer.analyze_text(d.as_ref()))
            .collect();
        Corpus::from_analyses(analyses)
    }

    pub fn analyze_semantics(&self, doc1: &str, doc2: &str) -> SemanticAnalysis {
        let analysis_doc1 = self.analyzer.analyze_text(doc1);
        let analysis_doc2 = self.analyzer.analyze_text(doc2);
        let set1 = PhraseSet::new(&analysis_doc1.key_phrases);
        let set2 = PhraseSet::new(&analysis_doc2.key_phrases);
        SemanticAnalysis {
            similarity_score: set1.jaccard(&set2),
            unique_to_doc1: set1.minus(&set2),
            unique_to_doc2: set2.minus(&set1),
            analysis_doc1,
            analysis_doc2,
        }
    }

    pub fn similarity(&self, doc1: &str, doc2: &str) -> f64 {
        self.analyze_semantics(doc1, doc2).similarity_score
    }

    /// Entity texts grouped by category.
    pub fn extract_entities(&self, doc: &str) -> BTreeMap<String, BTreeSet<String>> {
        group_entities(&self.analyzer.analyze_text(doc))
    }

    /// Per-category set differences and intersection of the two
    /// documents' entities.
    pub fn compare_entities(&self, doc1: &str, doc2: &str) -> BTreeMap<String, EntityComparison> {
        let e1 = self.extract_entities(doc1);
        let e2 = self.extract_entities(doc2);
        let empty = BTreeSet::new();
        let categories: BTreeSet<&String> = e1.keys().chain(e2.keys()).collect();

        categories
            .into_iter()
            .map(|category| {
                let s1 = e1.get(category).unwrap_or(&empty);
                let s2 = e2.get(category).unwrap_or(&empty);
                let comparison = EntityComparison {
                    unique_to_doc1: s1.difference(s2).cloned().collect(),
                    unique_to_doc2: s2.difference(s1).cloned().collect(),
                    common: s1.intersection(s2).cloned().collect(),
                };
                (category.clone(), comparison)
            })
            .collect()
    }

    /// Backend topics, else key phrases, else the most frequent words
    /// longer than three characters.
    pub fn document_topics(&self, doc: &str) -> Vec<String> {
        let analysis = self.analyzer.analyze_text(doc);
        if let Some(topics) = analysis.topics.filter(|t| !t.is_empty()) {
            return topics;
        }
        if !analysis.key_phrases.is_empty() {
            return analysis.key_phrases;
        }
        frequent_words(doc, TOPIC_FALLBACK_COUNT)
    }

    /// "Terms unique to Document N: ..." lines, or a no-gap message.
    pub fn gap_report(&self, doc1: &str, doc2: &str) -> String {
        let result = self.analyze_semantics(doc1, doc2);
        let mut lines = Vec::new();
        if !result.unique_to_doc1.is_empty() {
            lines.push(format!(
                "Terms unique to Document 1: {}",
                result.unique_to_doc1.join(", ")
            ));
        }
        if !result.unique_to_doc2.is_empty() {
            lines.push(format!(
                "Terms unique to Document 2: {}",
                result.unique_to_doc2.join(", ")
            ));
        }
        if lines.is_empty() {
            return "No significant semantic gaps found.".to_string();
        }
        lines.join("\n")
    }

    pub fn summary_report(&self, doc1: &str, doc2: &str) -> String {
        let analysis = self.analyze_semantics(doc1, doc2);
        let mut report = vec![
            format!("Semantic Similarity Score: {}", analysis.similarity_score),
            format!("Unique to Document 1: {}", join_or_none(&analysis.unique_to_doc1)),
            format!("Unique to Document 2: {}", join_or_none(&analysis.unique_to_doc2)),
            "Entity Comparison:".to_string(),
        ];
        for (category, values) in self.compare_entities(doc1, doc2) {
            report.push(format!(
                "{} - Unique to Doc1: {} | Unique to Doc2: {} | Common: {}",
                category,
                join_or_none(&values.unique_to_doc1),
                join_or_none(&values.unique_to_doc2),
                join_or_none(&values.common)
            ));
        }
        report.join("\n")
    }

    pub fn similarity_matrix<S: AsRef<str>>(&self, docs: &[S]) -> SimilarityMatrix {
        self.corpus(docs).similarity_matrix()
    }

    pub fn most_similar_pair<S: AsRef<str>>(&self, docs: &[S]) -> Option<PairScore> {
        self.corpus(docs).most_similar_pair()
    }

    pub fn most_dissimilar_pair<S: AsRef<str>>(&self, docs: &[S]) -> Option<PairScore> {
        self.corpus(docs).most_dissimilar_pair()
    }

    pub fn diversity_score<S: AsRef<str>>(&self, docs: &[S]) -> f64 {
        self.corpus(docs).diversity_score()
    }

    pub fn outliers<S: AsRef<str>>(&self, docs: &[S], threshold: f64) -> Vec<usize> {
        self.corpus(docs).outliers(threshold)
    }

    pub fn change_points<S: AsRef<str>>(&self, docs: &[S], threshold: f64) -> Vec<usize> {
        self.corpus(docs).change_points(threshold)
    }

    pub fn semantic_alerts<S: AsRef<str>>(&self, docs: &[S], threshold: f64) -> Vec<SemanticAlert> {
        self.corpus(docs).semantic_alerts(threshold)
    }

    pub fn similarity_ranking<S: AsRef<str>>(&self, docs: &[S], reference: usize) -> Vec<(usize, f64)> {
        self.corpus(docs).similarity_ranking(reference)
    }

    pub fn documents_with_no_overlap<S: AsRef<str>>(&self, docs: &[S]) -> Vec<(usize, usize)> {
        self.corpus(docs).documents_with_no_overlap()
    }

    pub fn common_and_unique_phrases<S: AsRef<str>>(&self, docs: &[S]) -> CommonAndUnique {
        self.corpus(docs).common_and_unique_phrases()
    }

    pub fn unique_keywords_across_documents<S: AsRef<str>>(&self, docs: &[S]) -> Vec<Vec<String>> {
        self.corpus(docs).unique_keywords()
    }

    pub fn keyword_frequency<S: AsRef<str>>(&self, docs: &[S]) -> BTreeMap<String, usize> {
        self.corpus(docs).keyword_frequency()
    }

    pub fn overlap_report<S: AsRef<str>>(&self, docs: &[S]) -> String {
        self.corpus(docs).overlap_report()
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

fn group_entities(analysis: &TextAnalysis) -> BTreeMap<String, BTreeSet<String>> {
    let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for entity in &analysis.entities {
        grouped
            .entry(entity.category.clone())
            .or_default()
            .insert(entity.text.clone());
    }
    grouped
}

/// Most frequent lowercase words longer than three characters; ties keep
/// first-seen order.
fn frequent_words(doc: &str, count: usize) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut freq: HashMap<String, usize> = HashMap::new();
    for word in doc.split_whitespace().map(str::to_lowercase) {
        if word.chars().count() < TOPIC_MIN_WORD_CHARS {
            continue;
        }
        let n = freq.entry(word.clone()).or_insert(0);
        if *n == 0 {
            order.push(word);
        }
        *n += 1;
    }
    order.sort_by(|a, b| freq[b].cmp(&freq[a]));
    order.truncate(count);
    order
}

/// Per-request cache of analyses for a fixed list of documents.
#[derive(Debug, Clone)]
pub struct Corpus {
    analyses: Vec<TextAnalysis>,
    phrases: Vec<PhraseSet>,
}

impl Corpus {
    pub fn from_analyses(analyses: Vec<TextAnalysis>) -> Self {
        let phrases = analyses.iter().map(|a| PhraseSet::new(&a.key_phrases)).collect();
        Self { analyses, phrases }
    }

    pub fn len(&self) -> usize {
        self.analyses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }

    pub fn analyses(&self) -> &[TextAnalysis] {
        &self.analyses
    }

    /// Similarity of documents `i` and `j`, or `None` when either index is
    /// out of range.
    pub fn similarity(&self, i: usize, j: usize) -> Option<f64> {
        (i < self.len() && j < self.len()).then(|| self.score(i, j))
    }

    fn score(&self, i: usize, j: usize) -> f64 {
        self.phrases[i].jaccard(&self.phrases[j])
    }

    fn pairs(&self) -> impl Iterator<Item = PairScore> + '_ {
        let n = self.len();
        (0..n).flat_map(move |i| {
            (i + 1..n).map(move |j| PairScore {
                pair: (i, j),
                similarity: self.score(i, j),
            })
        })
    }

    /// Diagonal is `1.0` by definition and never computed.
    pub fn similarity_matrix(&self) -> SimilarityMatrix {
        let n = self.len();
        let mut rows = vec![vec![1.0; n]; n];
        for PairScore { pair: (i, j), similarity } in self.pairs() {
            rows[i][j] = similarity;
            rows[j][i] = similarity;
        }
        SimilarityMatrix { rows }
    }

    /// Highest-similarity pair; ties keep the first pair in `(i, j)` order.
    pub fn most_similar_pair(&self) -> Option<PairScore> {
        let mut best: Option<PairScore> = None;
        for score in self.pairs() {
            if best.map_or(true, |b| score.similarity > b.similarity) {
                best = Some(score);
            }
        }
        best
    }

    /// Lowest-similarity pair; ties keep the first pair in `(i, j)` order.
    pub fn most_dissimilar_pair(&self) -> Option<PairScore> {
        let mut worst: Option<PairScore> = None;
        for score in self.pairs() {
            if worst.map_or(true, |w| score.similarity < w.similarity) {
                worst = Some(score);
            }
        }
        worst
    }

    /// `1 - mean pairwise similarity`, three decimals; `0.0` with fewer
    /// than two documents.
    pub fn diversity_score(&self) -> f64 {
        let sims: Vec<f64> = self.pairs().map(|p| p.similarity).collect();
        if sims.is_empty() {
            return 0.0;
        }
        let mean = sims.iter().sum::<f64>() / sims.len() as f64;
        round_to(1.0 - mean, 3)
    }

    /// Documents whose mean similarity to every other document is strictly
    /// below `threshold`. A lone document is never an outlier.
    pub fn outliers(&self, threshold: f64) -> Vec<usize> {
        let n = self.len();
        (0..n)
            .filter(|&i| {
                let sims: Vec<f64> = (0..n).filter(|&j| j != i).map(|j| self.score(i, j)).collect();
                let mean = if sims.is_empty() {
                    1.0
                } else {
                    sims.iter().sum::<f64>() / sims.len() as f64
                };
                mean < threshold
            })
            .collect()
    }

    /// Indices `i >= 1` where document `i` drifts from document `i - 1`.
    pub fn change_points(&self, threshold: f64) -> Vec<usize> {
        (1..self.len())
            .filter(|&i| self.score(i - 1, i) < threshold)
            .collect()
    }

    pub fn semantic_alerts(&self, threshold: f64) -> Vec<SemanticAlert> {
        self.pairs()
            .filter(|p| p.similarity < threshold)
            .map(|p| SemanticAlert {
                pair: p.pair,
                similarity: p.similarity,
                alert: "Low semantic similarity".to_string(),
            })
            .collect()
    }

    /// Every other document ranked by similarity to `reference`,
    /// descending; equal scores keep index order. Empty when `reference`
    /// is out of range.
    pub fn similarity_ranking(&self, reference: usize) -> Vec<(usize, f64)> {
        if reference >= self.len() {
            return Vec::new();
        }
        let mut scores: Vec<(usize, f64)> = (0..self.len())
            .filter(|&i| i != reference)
            .map(|i| (i, self.score(reference, i)))
            .collect();
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores
    }

    pub fn documents_with_no_overlap(&self) -> Vec<(usize, usize)> {
        self.pairs()
            .filter(|p| p.similarity == 0.0)
            .map(|p| p.pair)
            .collect()
    }

    pub fn common_and_unique_phrases(&self) -> CommonAndUnique {
        let Some(first) = self.phrases.first() else {
            return CommonAndUnique::default();
        };
        let common: Vec<String> = first
            .ordered
            .iter()
            .filter(|p| self.phrases.iter().all(|set| set.contains(p)))
            .cloned()
            .collect();
        let common_set: HashSet<&String> = common.iter().collect();
        let unique = self
            .phrases
            .iter()
            .map(|set| {
                set.ordered
                    .iter()
                    .filter(|p| !common_set.contains(p))
                    .cloned()
                    .collect()
            })
            .collect();
        CommonAndUnique { common, unique }
    }

    /// Per document, the phrases no other document contains.
    pub fn unique_keywords(&self) -> Vec<Vec<String>> {
        self.phrases
            .iter()
            .enumerate()
            .map(|(i, set)| {
                set.ordered
                    .iter()
                    .filter(|p| {
                        self.phrases
                            .iter()
                            .enumerate()
                            .all(|(j, other)| j == i || !other.contains(p))
                    })
                    .cloned()
                    .collect()
            })
            .collect()
    }

    /// Occurrences of each key phrase summed over all documents.
    pub fn keyword_frequency(&self) -> BTreeMap<String, usize> {
        let mut freq = BTreeMap::new();
        for analysis in &self.analyses {
            for phrase in &analysis.key_phrases {
                *freq.entry(phrase.clone()).or_insert(0) += 1;
            }
        }
        freq
    }

    /// One "Doc i vs Doc j: Similarity = s" line per pair, 1-based.
    pub fn overlap_report(&self) -> String {
        if self.is_empty() {
            return "No documents provided.".to_string();
        }
        self.pairs()
            .map(|p| format!("Doc {} vs Doc {}: Similarity = {}", p.pair.0 + 1, p.pair.1 + 1, p.similarity))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
