//! Sentiment classification, risk assessment and sequence-level sentiment
//! signals.
//!
//! [`SentimentClassifier`] wraps a [`SentimentAnalyzer`] backend. Questions
//! about a list of documents go through a [`SentimentSeries`], which
//! classifies each document once.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::analysis::SentimentAnalyzer;
use crate::metrics::round_to;
use crate::models::{RiskLevel, SentimentLabel, SentimentResult};

/// Thresholds for risk, controversy and alerting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentThresholds {
    /// Negative confidence above which a negative document is high risk.
    pub risk_high_negative: f64,
    /// Neutral confidence above which a document is medium risk.
    pub risk_medium_neutral: f64,
    /// Top-two score gap below which a document is controversial.
    pub controversy: f64,
    /// Negative confidence above which a document raises an alert.
    pub alert: f64,
}

impl Default for SentimentThresholds {
    fn default() -> Self {
        Self {
            risk_high_negative: 0.7,
            risk_medium_neutral: 0.5,
            controversy: 0.15,
            alert: 0.7,
        }
    }
}

/// High iff negative with negative confidence above the high threshold;
/// otherwise Medium iff neutral or neutral confidence above the medium
/// threshold; otherwise Low.
pub fn assess_risk(result: &SentimentResult, thresholds: &SentimentThresholds) -> RiskLevel {
    if result.sentiment == SentimentLabel::Negative
        && result.score(SentimentLabel::Negative) > thresholds.risk_high_negative
    {
        RiskLevel::High
    } else if result.sentiment == SentimentLabel::Neutral
        || result.score(SentimentLabel::Neutral) > thresholds.risk_medium_neutral
    {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// True when the two highest confidence scores differ by less than
/// `threshold`. False with fewer than two scores.
pub fn is_controversial(result: &SentimentResult, threshold: f64) -> bool {
    let mut values: Vec<f64> = result.confidence_scores.values().copied().collect();
    if values.len() < 2 {
        return false;
    }
    values.sort_by(|a, b| b.total_cmp(a));
    (values[0] - values[1]).abs() < threshold
}

/// One-line human-readable explanation of a sentiment result.
pub fn explain_sentiment(result: &SentimentResult) -> String {
    let scores: Vec<String> = result
        .confidence_scores
        .iter()
        .map(|(label, score)| format!("{}: {:.2}", label, score))
        .collect();
    let tail = match result.sentiment {
        SentimentLabel::Positive => "The document expresses a positive tone.",
        SentimentLabel::Negative => "The document expresses a negative tone.",
        SentimentLabel::Neutral => "The document is mostly neutral.",
    };
    format!(
        "Sentiment: {} ({}) - {}",
        capitalize(result.sentiment.as_str()),
        scores.join(", "),
        tail
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One value per sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LabelScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl fmt::Display for LabelScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "positive: {}, neutral: {}, negative: {}",
            self.positive, self.neutral, self.negative
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentComparison {
    pub doc1_sentiment: SentimentResult,
    pub doc2_sentiment: SentimentResult,
    pub same_sentiment: bool,
}

/// The document with the single highest positive or negative score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtremeSentiment {
    pub index: usize,
    pub sentiment: SentimentLabel,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentAlert {
    pub index: usize,
    pub alert: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub timestamp: String,
    pub sentiment: SentimentLabel,
    pub scores: BTreeMap<SentimentLabel, f64>,
}

/// Sentiment classification and risk rules over a pluggable backend.
#[derive(Clone, Copy)]
pub struct SentimentClassifier<'a> {
    analyzer: &'a dyn SentimentAnalyzer,
    thresholds: SentimentThresholds,
}

impl<'a> SentimentClassifier<'a> {
    pub fn new(analyzer: &'a dyn SentimentAnalyzer) -> Self {
        Self::with_thresholds(analyzer, SentimentThresholds::default())
    }

    pub fn with_thresholds(analyzer: &'a dyn SentimentAnalyzer, thresholds: SentimentThresholds) -> Self {
        Self { analyzer, thresholds }
    }

    pub fn thresholds(&self) -> &SentimentThresholds {
        &self.thresholds
    }

    pub fn classify(&self, doc: &str) -> SentimentResult {
        self.analyzer.get_sentiment(doc)
    }

    /// Classify each document once.
    pub fn series<S: AsRef<str>>(&self, docs: &[S]) -> SentimentSeries {
        SentimentSeries::new(docs.iter().map(|d| self.classify(d.as_ref())).collect())
    }

    pub fn assess_risk(&self, result: &SentimentResult) -> RiskLevel {
        assess_risk(result, &self.thresholds)
    }

    pub fn is_controversial(&self, doc: &str) -> bool {
        is_controversial(&self.classify(doc), self.thresholds.controversy)
    }

    pub fn compare_sentiment(&self, doc1: &str, doc2: &str) -> SentimentComparison {
        let doc1_sentiment = self.classify(doc1);
        let doc2_sentiment = self.classify(doc2);
        SentimentComparison {
            same_sentiment: doc1_sentiment.sentiment == doc2_sentiment.sentiment,
            doc1_sentiment,
            doc2_sentiment,
        }
    }

    /// Recommended actions: one rule set per risk level, then a
    /// sentiment-specific action, then a note when the scores are mixed.
    pub fn priority_actions(&self, doc: &str) -> Vec<String> {
        self.priority_actions_for(&self.classify(doc))
    }

    pub fn priority_actions_for(&self, result: &SentimentResult) -> Vec<String> {
        let mut actions: Vec<&str> = match self.assess_risk(result) {
            RiskLevel::High => vec![
                "Immediate review required due to high negative sentiment.",
                "Escalate to management or compliance team.",
            ],
            RiskLevel::Medium => vec![
                "Monitor document for potential issues.",
                "Consider a follow-up review.",
            ],
            RiskLevel::Low => vec!["No immediate action required. Document is low risk."],
        };
        match result.sentiment {
            SentimentLabel::Negative => actions.push("Investigate causes of negative sentiment."),
            SentimentLabel::Positive => actions.push("Leverage positive aspects in communications."),
            SentimentLabel::Neutral => {}
        }
        if is_controversial(result, self.thresholds.controversy) {
            actions.push("Sentiment is mixed; consider manual review for clarity.");
        }
        actions.into_iter().map(String::from).collect()
    }

    pub fn priority_action_report(&self, doc: &str) -> String {
        let actions = self.priority_actions(doc);
        if actions.is_empty() {
            return "No priority actions identified.".to_string();
        }
        let lines: Vec<String> = actions.iter().map(|a| format!("- {}", a)).collect();
        format!("Priority Actions:\n{}", lines.join("\n"))
    }

    pub fn trend<S: AsRef<str>>(&self, docs: &[S]) -> Vec<SentimentResult> {
        self.series(docs).results().to_vec()
    }

    pub fn distribution<S: AsRef<str>>(&self, docs: &[S]) -> BTreeMap<SentimentLabel, usize> {
        self.series(docs).distribution()
    }

    pub fn average_scores<S: AsRef<str>>(&self, docs: &[S]) -> LabelScores {
        self.series(docs).average_scores()
    }

    pub fn variance<S: AsRef<str>>(&self, docs: &[S]) -> LabelScores {
        self.series(docs).variance()
    }

    pub fn most_extreme<S: AsRef<str>>(&self, docs: &[S]) -> Option<ExtremeSentiment> {
        self.series(docs).most_extreme()
    }

    pub fn change_points<S: AsRef<str>>(&self, docs: &[S]) -> Vec<usize> {
        self.series(docs).change_points()
    }

    pub fn alerts<S: AsRef<str>>(&self, docs: &[S], threshold: f64) -> Vec<SentimentAlert> {
        self.series(docs).alerts(threshold)
    }

    pub fn heatmap_data<S: AsRef<str>>(&self, docs: &[S]) -> Vec<[f64; 3]> {
        self.series(docs).heatmap_data()
    }

    /// Pairs each document with its timestamp; extra items on either side
    /// are ignored.
    pub fn time_series<S: AsRef<str>, T: ToString>(&self, docs: &[S], timestamps: &[T]) -> Vec<TimeSeriesPoint> {
        docs.iter()
            .zip(timestamps)
            .map(|(doc, ts)| {
                let result = self.classify(doc.as_ref());
                TimeSeriesPoint {
                    timestamp: ts.to_string(),
                    sentiment: result.sentiment,
                    scores: result.confidence_scores,
                }
            })
            .collect()
    }

    pub fn summary_report<S: AsRef<str>>(&self, docs: &[S]) -> String {
        self.series(docs).summary_report()
    }
}

/// Sentiment results for an ordered list of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentSeries {
    results: Vec<SentimentResult>,
}

impl SentimentSeries {
    pub fn new(results: Vec<SentimentResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[SentimentResult] {
        &self.results
    }

    pub fn labels(&self) -> Vec<SentimentLabel> {
        self.results.iter().map(|r| r.sentiment).collect()
    }

    pub fn distribution(&self) -> BTreeMap<SentimentLabel, usize> {
        let mut counts = BTreeMap::new();
        for result in &self.results {
            *counts.entry(result.sentiment).or_insert(0) += 1;
        }
        counts
    }

    /// Mean score per label, three decimals; zeros when empty.
    pub fn average_scores(&self) -> LabelScores {
        if self.results.is_empty() {
            return LabelScores::default();
        }
        let n = self.results.len() as f64;
        let [p, u, g] = self.column_sums();
        LabelScores {
            positive: round_to(p / n, 3),
            neutral: round_to(u / n, 3),
            negative: round_to(g / n, 3),
        }
    }

    fn column_sums(&self) -> [f64; 3] {
        self.results.iter().fold([0.0; 3], |acc, r| {
            let row = r.score_row();
            [acc[0] + row[0], acc[1] + row[1], acc[2] + row[2]]
        })
    }

    /// Population variance of each label's score; zeros when empty.
    pub fn variance(&self) -> LabelScores {
        if self.results.is_empty() {
            return LabelScores::default();
        }
        let n = self.results.len() as f64;
        let sums = self.column_sums();
        let mut var = [0.0; 3];
        for result in &self.results {
            let row = result.score_row();
            for k in 0..3 {
                let d = row[k] - sums[k] / n;
                var[k] += d * d;
            }
        }
        LabelScores {
            positive: var[0] / n,
            neutral: var[1] / n,
            negative: var[2] / n,
        }
    }

    /// Scans positive then negative per document; ties keep the first hit.
    pub fn most_extreme(&self) -> Option<ExtremeSentiment> {
        let mut best: Option<ExtremeSentiment> = None;
        for (index, result) in self.results.iter().enumerate() {
            for label in [SentimentLabel::Positive, SentimentLabel::Negative] {
                let score = result.score(label);
                if best.map_or(true, |b| score > b.score) {
                    best = Some(ExtremeSentiment {
                        index,
                        sentiment: label,
                        score,
                    });
                }
            }
        }
        best
    }

    /// Indices where the label differs from the previous document's.
    pub fn change_points(&self) -> Vec<usize> {
        (1..self.results.len())
            .filter(|&i| self.results[i].sentiment != self.results[i - 1].sentiment)
            .collect()
    }

    /// Documents whose negative score is strictly above `threshold`.
    pub fn alerts(&self, threshold: f64) -> Vec<SentimentAlert> {
        self.results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.score(SentimentLabel::Negative) > threshold)
            .map(|(index, _)| SentimentAlert {
                index,
                alert: "High negative sentiment detected".to_string(),
            })
            .collect()
    }

    /// `[positive, neutral, negative]` per document.
    pub fn heatmap_data(&self) -> Vec<[f64; 3]> {
        self.results.iter().map(SentimentResult::score_row).collect()
    }

    pub fn summary_report(&self) -> String {
        let distribution: Vec<String> = self
            .distribution()
            .iter()
            .map(|(label, count)| format!("{}: {}", label, count))
            .collect();
        let extreme = match self.most_extreme() {
            Some(e) => format!("document {} ({}, {})", e.index + 1, e.sentiment, e.score),
            None => "None".to_string(),
        };
        format!(
            "Sentiment Distribution: {}\nAverage Scores: {}\nMost Extreme Sentiment: {}",
            distribution.join(", "),
            self.average_scores(),
            extreme
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reads "label p u n" from the text itself.
    struct Scripted;

    impl SentimentAnalyzer for Scripted {
        fn get_sentiment(&self, text: &str) -> SentimentResult {
            let parts: Vec<&str> = text.split_whitespace().collect();
            let label = match parts[0] {
                "positive" => SentimentLabel::Positive,
                "negative" => SentimentLabel::Negative,
                _ => SentimentLabel::Neutral,
            };
            let n = |i: usize| parts[i].parse::<f64>().unwrap();
            SentimentResult::new(label, n(1), n(2), n(3))
        }
    }

    fn classifier() -> SentimentClassifier<'static> {
        SentimentClassifier::new(&Scripted)
    }

    fn result(label: SentimentLabel, scores: &[(SentimentLabel, f64)]) -> SentimentResult {
        SentimentResult {
            sentiment: label,
            confidence_scores: scores.iter().copied().collect(),
        }
    }

    #[test]
    fn test_assess_risk_table() {
        let t = SentimentThresholds::default();
        let high = result(SentimentLabel::Negative, &[(SentimentLabel::Negative, 0.8)]);
        let medium = result(SentimentLabel::Neutral, &[]);
        let low = result(SentimentLabel::Positive, &[(SentimentLabel::Positive, 0.9)]);
        assert_eq!(assess_risk(&high, &t), RiskLevel::High);
        assert_eq!(assess_risk(&medium, &t), RiskLevel::Medium);
        assert_eq!(assess_risk(&low, &t), RiskLevel::Low);
    }

    #[test]
    fn test_assess_risk_high_checked_first() {
        let t = SentimentThresholds::default();
        let r = SentimentResult::new(SentimentLabel::Negative, 0.0, 0.6, 0.75);
        assert_eq!(assess_risk(&r, &t), RiskLevel::High);

        let r = SentimentResult::new(SentimentLabel::Negative, 0.0, 0.6, 0.4);
        assert_eq!(assess_risk(&r, &t), RiskLevel::Medium);

        let r = SentimentResult::new(SentimentLabel::Negative, 0.0, 0.3, 0.7);
        assert_eq!(assess_risk(&r, &t), RiskLevel::Low);
    }

    #[test]
    fn test_controversial() {
        let close = SentimentResult::new(SentimentLabel::Positive, 0.45, 0.40, 0.15);
        assert!(is_controversial(&close, 0.15));
        let clear = SentimentResult::new(SentimentLabel::Positive, 0.9, 0.1, 0.0);
        assert!(!is_controversial(&clear, 0.15));
        let single = result(SentimentLabel::Positive, &[(SentimentLabel::Positive, 0.9)]);
        assert!(!is_controversial(&single, 0.15));
    }

    #[test]
    fn test_explain_sentiment() {
        let r = SentimentResult::new(SentimentLabel::Positive, 0.9, 0.1, 0.0);
        assert_eq!(
            explain_sentiment(&r),
            "Sentiment: Positive (positive: 0.90, neutral: 0.10, negative: 0.00) - The document expresses a positive tone."
        );
    }

    #[test]
    fn test_priority_actions() {
        let cmp = classifier();
        assert_eq!(
            cmp.priority_actions("negative 0 0.1 0.9"),
            vec![
                "Immediate review required due to high negative sentiment.",
                "Escalate to management or compliance team.",
                "Investigate causes of negative sentiment.",
            ]
        );
        assert_eq!(
            cmp.priority_actions("positive 0.5 0.45 0.05"),
            vec![
                "No immediate action required. Document is low risk.",
                "Leverage positive aspects in communications.",
                "Sentiment is mixed; consider manual review for clarity.",
            ]
        );
        assert!(cmp
            .priority_action_report("neutral 0 1 0")
            .starts_with("Priority Actions:\n- Monitor document for potential issues."));
    }

    #[test]
    fn test_series_signals() {
        let docs = [
            "positive 0.9 0.1 0",
            "positive 0.7 0.3 0",
            "negative 0 0.2 0.8",
        ];
        let series = classifier().series(&docs);
        assert_eq!(series.change_points(), vec![2]);
        assert_eq!(series.distribution()[&SentimentLabel::Positive], 2);
        assert_eq!(series.average_scores().positive, 0.533);

        let extreme = series.most_extreme().unwrap();
        assert_eq!((extreme.index, extreme.sentiment), (0, SentimentLabel::Positive));

        let alerts = series.alerts(0.7);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].index, 2);
        assert_eq!(series.heatmap_data()[2], [0.0, 0.2, 0.8]);
    }

    #[test]
    fn test_population_variance() {
        let docs = ["positive 1 0 0", "negative 0 0 1"];
        let var = classifier().variance(&docs);
        assert_eq!(var.positive, 0.25);
        assert_eq!(var.neutral, 0.0);
        assert_eq!(var.negative, 0.25);
    }

    #[test]
    fn test_empty_series() {
        let none: [&str; 0] = [];
        let cmp = classifier();
        assert_eq!(cmp.average_scores(&none), LabelScores::default());
        assert_eq!(cmp.variance(&none), LabelScores::default());
        assert!(cmp.most_extreme(&none).is_none());
        assert!(cmp.change_points(&none).is_empty());
    }

    #[test]
    fn test_compare_and_time_series() {
        let cmp = classifier();
        let comparison = cmp.compare_sentiment("positive 1 0 0", "positive 0.6 0.4 0");
        assert!(comparison.same_sentiment);

        let series = cmp.time_series(&["neutral 0 1 0", "negative 0 0 1"], &["2024-01", "2024-02"]);
        assert_eq!(series[1].timestamp, "2024-02");
        assert_eq!(series[1].sentiment, SentimentLabel::Negative);
    }

    #[test]
    fn test_summary_report() {
        let report = classifier().summary_report(&["positive 1 0 0"]);
        assert_eq!(
            report,
            "Sentiment Distribution: positive: 1\n\
             Average Scores: positive: 1, neutral: 0, negative: 0\n\
             Most Extreme Sentiment: document 1 (positive, 1)"
        );
    }
}
