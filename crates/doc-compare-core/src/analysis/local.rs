//! Lexicon-based analyzer that runs without any remote service.
//!
//! - Sentiment: mean polarity of sentiment-bearing words, with a preceding
//!   negator flipping the sign. Polarity above `0.2` is positive, below
//!   `-0.2` negative, anything else neutral.
//! - Key phrases: maximal runs of non-stopwords inside a clause,
//!   lowercased and deduplicated in first-seen order.
//! - Entities: capitalized words that do not open a sentence.
//! - Emotions: emotion-word counts divided by the document word count;
//!   absent when no emotion word occurs.
//! - Topics: never produced.

use std::collections::BTreeMap;
use unicode_segmentation::UnicodeSegmentation;

use super::lexicon;
use super::{SentimentAnalyzer, TextAnalyzer};
use crate::models::{Entity, SentimentLabel, SentimentResult, TextAnalysis};

const POLARITY_CUTOFF: f64 = 0.2;
const CLAUSE_BREAKS: &[char] = &[',', ';', ':', '(', ')', '"', '\n'];

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAnalyzer;

impl LocalAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Mean polarity of the sentiment-bearing words in `text`, in `[-1, 1]`.
    pub fn polarity(&self, text: &str) -> f64 {
        let mut total = 0.0;
        let mut scored = 0usize;
        let mut negate = false;
        for word in text.unicode_words() {
            let word = word.to_lowercase();
            if lexicon::is_negator(&word) {
                negate = true;
                continue;
            }
            if let Some(p) = lexicon::polarity(&word) {
                total += if negate { -p * 0.5 } else { p };
                scored += 1;
                negate = false;
            }
        }
        if scored == 0 {
            return 0.0;
        }
        (total / scored as f64).clamp(-1.0, 1.0)
    }

    pub fn key_phrases(&self, text: &str) -> Vec<String> {
        let mut phrases: Vec<String> = Vec::new();
        let mut push = |run: &mut Vec<String>| {
            if !run.is_empty() {
                let phrase = run.join(" ");
                if !phrases.contains(&phrase) {
                    phrases.push(phrase);
                }
                run.clear();
            }
        };

        for sentence in text.unicode_sentences() {
            for clause in sentence.split(CLAUSE_BREAKS) {
                let mut run = Vec::new();
                for word in clause.unicode_words() {
                    let lower = word.to_lowercase();
                    if lexicon::is_stopword(&lower) || lower.chars().all(|c| c.is_numeric()) {
                        push(&mut run);
                    } else {
                        run.push(lower);
                    }
                }
                push(&mut run);
            }
        }
        phrases
    }

    pub fn entities(&self, text: &str) -> Vec<Entity> {
        let mut entities: Vec<Entity> = Vec::new();
        for sentence in text.unicode_sentences() {
            for word in sentence.unicode_words().skip(1) {
                if is_capitalized(word) && !entities.iter().any(|e| e.text == word) {
                    entities.push(Entity {
                        text: word.to_string(),
                        category: "Unknown".to_string(),
                    });
                }
            }
        }
        entities
    }

    pub fn emotions(&self, text: &str) -> Option<BTreeMap<String, f64>> {
        let mut counts: BTreeMap<String, f64> = BTreeMap::new();
        let mut words = 0usize;
        for word in text.unicode_words() {
            words += 1;
            if let Some(emotion) = lexicon::emotion(&word.to_lowercase()) {
                *counts.entry(emotion.to_string()).or_default() += 1.0;
            }
        }
        if counts.is_empty() {
            return None;
        }
        for value in counts.values_mut() {
            *value /= words as f64;
        }
        Some(counts)
    }
}

/// `Xxxx`: one uppercase letter followed by lowercase letters only.
fn is_capitalized(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let rest: Vec<char> = chars.collect();
            !rest.is_empty() && rest.iter().all(|c| c.is_lowercase())
        }
        _ => false,
    }
}

impl SentimentAnalyzer for LocalAnalyzer {
    fn get_sentiment(&self, text: &str) -> SentimentResult {
        let p = self.polarity(text);
        if p > POLARITY_CUTOFF {
            SentimentResult::new(SentimentLabel::Positive, p, 1.0 - p.abs(), 0.0)
        } else if p < -POLARITY_CUTOFF {
            SentimentResult::new(SentimentLabel::Negative, 0.0, 1.0 - p.abs(), -p)
        } else {
            SentimentResult::new(SentimentLabel::Neutral, 0.0, 1.0, 0.0)
        }
    }
}

impl TextAnalyzer for LocalAnalyzer {
    fn analyze_text(&self, text: &str) -> TextAnalysis {
        let sentiment = self.get_sentiment(text);
        TextAnalysis {
            key_phrases: self.key_phrases(text),
            entities: self.entities(text),
            sentiment: sentiment.sentiment,
            confidence_scores: sentiment.confidence_scores,
            emotions: self.emotions(text),
            topics: None,
        }
    }
}
