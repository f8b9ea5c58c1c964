//! Core data models shared by every comparison component.
//!
//! These are plain data: documents arrive already extracted to text, and
//! every derived result is built fresh per request and handed back to the
//! caller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::diff::split_lines;

/// Number of characters kept by [`Document::summary`].
const SUMMARY_CHARS: usize = 200;

/// An immutable text payload with a language tag and free-form metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub content: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

fn default_language() -> String {
    "en".to_string()
}

impl Document {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            language: default_language(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn metadata(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    pub fn line_count(&self) -> usize {
        split_lines(&self.content).len()
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// First 200 characters of the content, with `...` appended when cut.
    pub fn summary(&self) -> String {
        if self.char_count() > SUMMARY_CHARS {
            let head: String = self.content.chars().take(SUMMARY_CHARS).collect();
            format!("{}...", head)
        } else {
            self.content.clone()
        }
    }

    /// Case-insensitive substring test.
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        self.content
            .to_lowercase()
            .contains(&keyword.to_lowercase())
    }
}

/// Categorical sentiment label.
///
/// Variant order is the display order used for charts and heatmaps:
/// positive, neutral, negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment label plus per-label confidence scores.
///
/// Scores normally sum to about 1.0, but a backend may omit labels; a
/// missing label reads as `0.0` through [`SentimentResult::score`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: SentimentLabel,
    #[serde(default)]
    pub confidence_scores: BTreeMap<SentimentLabel, f64>,
}

impl SentimentResult {
    pub fn new(sentiment: SentimentLabel, positive: f64, neutral: f64, negative: f64) -> Self {
        let confidence_scores = BTreeMap::from([
            (SentimentLabel::Positive, positive),
            (SentimentLabel::Neutral, neutral),
            (SentimentLabel::Negative, negative),
        ]);
        Self {
            sentiment,
            confidence_scores,
        }
    }

    /// A label with no confidence scores at all.
    pub fn bare(sentiment: SentimentLabel) -> Self {
        Self {
            sentiment,
            confidence_scores: BTreeMap::new(),
        }
    }

    pub fn score(&self, label: SentimentLabel) -> f64 {
        self.confidence_scores.get(&label).copied().unwrap_or(0.0)
    }

    /// Scores as `[positive, neutral, negative]`.
    pub fn score_row(&self) -> [f64; 3] {
        [
            self.score(SentimentLabel::Positive),
            self.score(SentimentLabel::Neutral),
            self.score(SentimentLabel::Negative),
        ]
    }
}

/// Document tone, a reduction of sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

impl From<SentimentLabel> for Tone {
    fn from(label: SentimentLabel) -> Self {
        match label {
            SentimentLabel::Positive => Tone::Positive,
            SentimentLabel::Negative => Tone::Negative,
            SentimentLabel::Neutral => Tone::Neutral,
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tone::Positive => "Positive",
            Tone::Neutral => "Neutral",
            Tone::Negative => "Negative",
        };
        f.write_str(s)
    }
}

/// Tone label with the optional emotion-intensity mapping it came with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToneResult {
    pub tone: Tone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotions: Option<BTreeMap<String, f64>>,
}

/// Risk level derived from a [`SentimentResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        };
        f.write_str(s)
    }
}

/// A named entity extracted by a text-analysis backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    #[serde(default = "default_entity_category")]
    pub category: String,
}

fn default_entity_category() -> String {
    "Unknown".to_string()
}

/// Output of a text-analysis backend for one document.
///
/// `emotions` and `topics` are optional capabilities: a backend that does
/// not produce them leaves them `None`, and consumers omit whatever they
/// would have derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    #[serde(default)]
    pub key_phrases: Vec<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    pub sentiment: SentimentLabel,
    #[serde(default)]
    pub confidence_scores: BTreeMap<SentimentLabel, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotions: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_counts() {
        let doc = Document::new("t", "one two three\nfour five");
        assert_eq!(doc.word_count(), 5);
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.char_count(), 23);
        assert_eq!(doc.language, "en");
    }

    #[test]
    fn test_summary_truncates() {
        let doc = Document::new("t", "x".repeat(250));
        let summary = doc.summary();
        assert_eq!(summary.chars().count(), 203);
        assert!(summary.ends_with("..."));

        let short = Document::new("t", "short");
        assert_eq!(short.summary(), "short");
    }

    #[test]
    fn test_contains_keyword_ignores_case() {
        let doc = Document::new("t", "The Policy applies.");
        assert!(doc.contains_keyword("policy"));
        assert!(!doc.contains_keyword("audit"));
    }

    #[test]
    fn test_missing_score_reads_zero() {
        let result = SentimentResult::bare(SentimentLabel::Neutral);
        assert_eq!(result.score(SentimentLabel::Negative), 0.0);
        assert_eq!(result.score_row(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_sentiment_result_json_shape() {
        let result = SentimentResult::new(SentimentLabel::Negative, 0.1, 0.1, 0.8);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["sentiment"], "negative");
        assert_eq!(json["confidence_scores"]["negative"], 0.8);
    }

    #[test]
    fn test_tone_from_sentiment() {
        assert_eq!(Tone::from(SentimentLabel::Positive), Tone::Positive);
        assert_eq!(Tone::from(SentimentLabel::Negative), Tone::Negative);
        assert_eq!(Tone::from(SentimentLabel::Neutral), Tone::Neutral);
        assert_eq!(Tone::Negative.to_string(), "Negative");
    }
}
