//! Tone detection, tone shifts and compliance scanning.
//!
//! Tone is a reduction of the backend's sentiment label. Everything that
//! works on a sequence of documents detects each tone once and then reads
//! the resulting `&[Tone]`.

use serde::Serialize;
use std::collections::BTreeMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::TextAnalyzer;
use crate::models::{Tone, ToneResult};

/// Default intensity above which an emotion counts as strong.
pub const DEFAULT_EMOTION_THRESHOLD: f64 = 0.2;
/// Default number of sentences per tone segment.
pub const DEFAULT_SEGMENT_SIZE: usize = 3;

/// Scanned in this order; one flag per keyword found.
pub const COMPLIANCE_KEYWORDS: &[&str] = &[
    "confidential",
    "policy",
    "regulation",
    "compliance",
    "violation",
    "breach",
    "audit",
    "legal",
    "mandatory",
    "prohibited",
    "restricted",
];

pub const NEGATIVE_TONE_FLAG: &str = "Negative tone detected, review for compliance risk.";

const STRONG_WORDS: &[&str] = &[
    "must",
    "immediately",
    "critical",
    "urgent",
    "important",
    "required",
    "ensure",
    "not allowed",
];

const EMOTIVE_WORDS: &[&str] = &["angry", "happy", "joy", "frustrated", "delighted", "upset"];

const FALLBACK_POSITIVE: &[&str] = &["happy", "joy", "delighted"];
const FALLBACK_NEGATIVE: &[&str] = &["angry", "upset", "frustrated"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToneShift {
    pub document1_tone: Tone,
    pub document2_tone: Tone,
    pub tone_shift_detected: bool,
    pub tone_shift_details: String,
}

/// "No tone shift detected..." or "Tone shifted from 'A' to 'B'."
pub fn tone_shift_details(before: Tone, after: Tone) -> String {
    if before == after {
        format!("No tone shift detected. Both documents are '{}'.", before)
    } else {
        format!("Tone shifted from '{}' to '{}'.", before, after)
    }
}

pub fn tone_distribution(tones: &[Tone]) -> BTreeMap<Tone, usize> {
    let mut counts = BTreeMap::new();
    for tone in tones {
        *counts.entry(*tone).or_insert(0) += 1;
    }
    counts
}

/// Indices where the tone differs from the previous document's.
pub fn tone_shift_indices(tones: &[Tone]) -> Vec<usize> {
    (1..tones.len()).filter(|&i| tones[i] != tones[i - 1]).collect()
}

/// One line per change, numbering the document 1-based.
pub fn tone_change_summary(tones: &[Tone]) -> String {
    let changes: Vec<String> = tone_shift_indices(tones)
        .into_iter()
        .map(|i| {
            format!(
                "Tone changed from '{}' to '{}' at document {}",
                tones[i - 1],
                tones[i],
                i + 1
            )
        })
        .collect();
    if changes.is_empty() {
        return "No tone changes detected.".to_string();
    }
    changes.join("\n")
}

fn sentences(doc: &str) -> impl Iterator<Item = &str> {
    doc.unicode_sentences().map(str::trim).filter(|s| !s.is_empty())
}

/// Sentences containing a strong word or an exclamation mark.
pub fn important_points(doc: &str) -> Vec<String> {
    sentences(doc)
        .filter(|s| {
            let lower = s.to_lowercase();
            STRONG_WORDS.iter().any(|w| lower.contains(w)) || s.contains('!')
        })
        .map(String::from)
        .collect()
}

/// Sentences containing a strong or emotive word.
pub fn emphasized_sentences(doc: &str) -> Vec<String> {
    sentences(doc)
        .filter(|s| {
            let lower = s.to_lowercase();
            STRONG_WORDS
                .iter()
                .chain(EMOTIVE_WORDS)
                .any(|w| lower.contains(w))
        })
        .map(String::from)
        .collect()
}

/// Tone analysis over a pluggable text-analysis backend.
#[derive(Clone, Copy)]
pub struct ToneAnalyzer<'a> {
    analyzer: &'a dyn TextAnalyzer,
    emotion_threshold: f64,
}

impl<'a> ToneAnalyzer<'a> {
    pub fn new(analyzer: &'a dyn TextAnalyzer) -> Self {
        Self::with_emotion_threshold(analyzer, DEFAULT_EMOTION_THRESHOLD)
    }

    pub fn with_emotion_threshold(analyzer: &'a dyn TextAnalyzer, emotion_threshold: f64) -> Self {
        Self {
            analyzer,
            emotion_threshold,
        }
    }

    pub fn detect_tone(&self, doc: &str) -> Tone {
        Tone::from(self.analyzer.analyze_text(doc).sentiment)
    }

    pub fn tone_result(&self, doc: &str) -> ToneResult {
        let analysis = self.analyzer.analyze_text(doc);
        ToneResult {
            tone: Tone::from(analysis.sentiment),
            emotions: analysis.emotions,
        }
    }

    pub fn analyze_tone_shift(&self, doc1: &str, doc2: &str) -> ToneShift {
        let document1_tone = self.detect_tone(doc1);
        let document2_tone = self.detect_tone(doc2);
        ToneShift {
            document1_tone,
            document2_tone,
            tone_shift_detected: document1_tone != document2_tone,
            tone_shift_details: tone_shift_details(document1_tone, document2_tone),
        }
    }

    pub fn tone_trend<S: AsRef<str>>(&self, docs: &[S]) -> Vec<Tone> {
        docs.iter().map(|d| self.detect_tone(d.as_ref())).collect()
    }

    pub fn tone_distribution<S: AsRef<str>>(&self, docs: &[S]) -> BTreeMap<Tone, usize> {
        tone_distribution(&self.tone_trend(docs))
    }

    pub fn tone_shift_indices<S: AsRef<str>>(&self, docs: &[S]) -> Vec<usize> {
        tone_shift_indices(&self.tone_trend(docs))
    }

    pub fn tone_change_summary<S: AsRef<str>>(&self, docs: &[S]) -> String {
        tone_change_summary(&self.tone_trend(docs))
    }

    pub fn summarize_tone_analysis<S: AsRef<str>>(&self, docs: &[S]) -> String {
        let tones = self.tone_trend(docs);
        let distribution: Vec<String> = tone_distribution(&tones)
            .iter()
            .map(|(tone, count)| format!("{}: {}", tone, count))
            .collect();
        let shifts = tone_shift_indices(&tones);
        format!(
            "Tone Distribution: {}\nTone Shift Indices: {:?}\nTotal Shifts: {}",
            distribution.join(", "),
            shifts,
            shifts.len()
        )
    }

    /// More than one emotion above the threshold. `None` when the backend
    /// reports no emotions for `doc`.
    pub fn is_tone_controversial(&self, doc: &str) -> Option<bool> {
        let emotions = self.analyzer.analyze_text(doc).emotions?;
        let strong = emotions
            .values()
            .filter(|&&v| v > self.emotion_threshold)
            .count();
        Some(strong > 1)
    }

    /// One flag per compliance keyword found (case-insensitive substring),
    /// in keyword-list order, then the negative-tone flag if applicable.
    pub fn compliance_flags(&self, doc: &str) -> Vec<String> {
        let text = doc.to_lowercase();
        let mut flags: Vec<String> = COMPLIANCE_KEYWORDS
            .iter()
            .filter(|kw| text.contains(*kw))
            .map(|kw| format!("Compliance keyword detected: '{}'", kw))
            .collect();
        if self.detect_tone(doc) == Tone::Negative {
            flags.push(NEGATIVE_TONE_FLAG.to_string());
        }
        flags
    }

    /// Emotion intensities when the backend has them, else sentiment
    /// confidences, else counts of a few emotive keywords.
    pub fn tone_scores(&self, doc: &str) -> BTreeMap<String, f64> {
        let analysis = self.analyzer.analyze_text(doc);
        if let Some(emotions) = analysis.emotions {
            return emotions;
        }
        if !analysis.confidence_scores.is_empty() {
            return analysis
                .confidence_scores
                .into_iter()
                .map(|(label, score)| (label.to_string(), score))
                .collect();
        }
        let text = doc.to_lowercase();
        let count = |words: &[&str]| words.iter().filter(|w| text.contains(*w)).count() as f64;
        BTreeMap::from([
            ("positive".to_string(), count(FALLBACK_POSITIVE)),
            ("negative".to_string(), count(FALLBACK_NEGATIVE)),
            ("neutral".to_string(), 1.0),
        ])
    }

    /// `score(doc1) - score(doc2)` for every key either side reports.
    pub fn compare_tone_scores(&self, doc1: &str, doc2: &str) -> BTreeMap<String, f64> {
        let s1 = self.tone_scores(doc1);
        let s2 = self.tone_scores(doc2);
        s1.keys()
            .chain(s2.keys())
            .map(|k| {
                let diff = s1.get(k).copied().unwrap_or(0.0) - s2.get(k).copied().unwrap_or(0.0);
                (k.clone(), diff)
            })
            .collect()
    }

    /// The dominant emotion with its intensity, or the sentiment label with
    /// its confidence when no emotions are reported.
    pub fn tone_confidence(&self, doc: &str) -> Option<(String, f64)> {
        let analysis = self.analyzer.analyze_text(doc);
        if let Some(emotions) = analysis.emotions.filter(|e| !e.is_empty()) {
            let mut best: Option<(String, f64)> = None;
            for (name, value) in emotions {
                if best.as_ref().map_or(true, |(_, b)| value > *b) {
                    best = Some((name, value));
                }
            }
            return best;
        }
        if analysis.confidence_scores.is_empty() {
            return None;
        }
        let score = analysis
            .confidence_scores
            .get(&analysis.sentiment)
            .copied()
            .unwrap_or(0.0);
        Some((analysis.sentiment.to_string(), score))
    }

    /// Tone of each run of `segment_size` period-separated sentences,
    /// numbered from 1. Empty segments are skipped but keep their number.
    pub fn tone_segments(&self, doc: &str, segment_size: usize) -> Vec<(usize, Tone)> {
        let parts: Vec<&str> = doc.split('.').collect();
        parts
            .chunks(segment_size.max(1))
            .enumerate()
            .filter_map(|(i, chunk)| {
                let segment = chunk.join(". ");
                let segment = segment.trim();
                (!segment.is_empty()).then(|| (i + 1, self.detect_tone(segment)))
            })
            .collect()
    }

    /// Multi-line report: tones, shift, compliance flags and important
    /// points of both documents. Sections with nothing to show are left out.
    pub fn tone_shift_report(&self, doc1: &str, doc2: &str) -> String {
        let shift = self.analyze_tone_shift(doc1, doc2);
        let mut lines = vec![
            format!("Document 1 Tone: {}", shift.document1_tone),
            format!("Document 2 Tone: {}", shift.document2_tone),
            format!(
                "Tone Shift Detected: {}",
                if shift.tone_shift_detected { "Yes" } else { "No" }
            ),
            format!("Details: {}", shift.tone_shift_details),
        ];
        let sections = [
            ("Compliance Flags in Document 1:", self.compliance_flags(doc1)),
            ("Compliance Flags in Document 2:", self.compliance_flags(doc2)),
            ("Important Points in Document 1:", important_points(doc1)),
            ("Important Points in Document 2:", important_points(doc2)),
        ];
        for (heading, items) in sections {
            if !items.is_empty() {
                lines.push(heading.to_string());
                lines.extend(items);
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SentimentLabel, TextAnalysis};

    /// Sentiment from the words "good"/"bad"; emotions from "name=value"
    /// tokens.
    struct Keyed;

    impl TextAnalyzer for Keyed {
        fn analyze_text(&self, text: &str) -> TextAnalysis {
            let lower = text.to_lowercase();
            let sentiment = if lower.contains("bad") {
                SentimentLabel::Negative
            } else if lower.contains("good") {
                SentimentLabel::Positive
            } else {
                SentimentLabel::Neutral
            };
            let emotions: BTreeMap<String, f64> = text
                .split_whitespace()
                .filter_map(|tok| {
                    let (name, value) = tok.split_once('=')?;
                    Some((name.to_string(), value.parse().ok()?))
                })
                .collect();
            TextAnalysis {
                key_phrases: vec![],
                entities: vec![],
                sentiment,
                confidence_scores: BTreeMap::from([(sentiment, 0.8)]),
                emotions: (!emotions.is_empty()).then_some(emotions),
                topics: None,
            }
        }
    }

    fn tone() -> ToneAnalyzer<'static> {
        ToneAnalyzer::new(&Keyed)
    }

    #[test]
    fn test_detect_tone_and_shift() {
        let t = tone();
        assert_eq!(t.detect_tone("good news"), Tone::Positive);
        let shift = t.analyze_tone_shift("good news", "bad news");
        assert!(shift.tone_shift_detected);
        assert_eq!(shift.tone_shift_details, "Tone shifted from 'Positive' to 'Negative'.");

        let same = t.analyze_tone_shift("plain", "plain too");
        assert_eq!(same.tone_shift_details, "No tone shift detected. Both documents are 'Neutral'.");
    }

    #[test]
    fn test_change_summary_one_based() {
        let docs = ["good", "good", "bad"];
        assert_eq!(
            tone().tone_change_summary(&docs),
            "Tone changed from 'Positive' to 'Negative' at document 3"
        );
        assert_eq!(tone().tone_shift_indices(&docs), vec![2]);
        assert_eq!(tone().tone_change_summary(&["good"]), "No tone changes detected.");
    }

    #[test]
    fn test_compliance_flags_order() {
        let flags = tone().compliance_flags("Audit found a bad breach of POLICY.");
        assert_eq!(
            flags,
            vec![
                "Compliance keyword detected: 'policy'",
                "Compliance keyword detected: 'breach'",
                "Compliance keyword detected: 'audit'",
                NEGATIVE_TONE_FLAG,
            ]
        );
        assert!(tone().compliance_flags("good quarter").is_empty());
    }

    #[test]
    fn test_controversy_needs_emotions() {
        let t = tone();
        assert_eq!(t.is_tone_controversial("plain"), None);
        assert_eq!(t.is_tone_controversial("joy=0.5 anger=0.3"), Some(true));
        assert_eq!(t.is_tone_controversial("joy=0.5 anger=0.1"), Some(false));
    }

    #[test]
    fn test_important_and_emphasized() {
        let doc = "You must sign today. The office is open. We are happy! Nothing else.";
        assert_eq!(important_points(doc), vec!["You must sign today.", "We are happy!"]);
        assert_eq!(emphasized_sentences(doc), vec!["You must sign today.", "We are happy!"]);
    }

    #[test]
    fn test_tone_scores_sources() {
        let t = tone();
        assert_eq!(t.tone_scores("joy=0.4")["joy"], 0.4);
        assert_eq!(t.tone_scores("good")["positive"], 0.8);

        let diff = t.compare_tone_scores("good", "bad");
        assert_eq!(diff["positive"], 0.8);
        assert_eq!(diff["negative"], -0.8);
    }

    #[test]
    fn test_tone_confidence() {
        let t = tone();
        assert_eq!(t.tone_confidence("joy=0.2 fear=0.6"), Some(("fear".to_string(), 0.6)));
        assert_eq!(t.tone_confidence("bad"), Some(("negative".to_string(), 0.8)));
    }

    #[test]
    fn test_tone_segments() {
        let doc = "good one. good two. good three. bad four. bad five";
        let segments = tone().tone_segments(doc, 3);
        assert_eq!(segments, vec![(1, Tone::Positive), (2, Tone::Negative)]);
    }

    #[test]
    fn test_summary_and_report() {
        let t = tone();
        assert_eq!(
            t.summarize_tone_analysis(&["good", "bad"]),
            "Tone Distribution: Positive: 1, Negative: 1\nTone Shift Indices: [1]\nTotal Shifts: 1"
        );
        let report = t.tone_shift_report("good plan", "bad audit. Act immediately.");
        assert!(report.contains("Tone Shift Detected: Yes"));
        assert!(report.contains("Compliance Flags in Document 2:\nCompliance keyword detected: 'audit'"));
        assert!(report.contains("Important Points in Document 2:\nAct immediately."));
        assert!(!report.contains("Document 1:\n"));
    }
}
