//! Text-analysis capability traits.
//!
//! The comparators in this crate never call a backend directly; they take
//! a `&dyn TextAnalyzer` or `&dyn SentimentAnalyzer` and work from the
//! plain data those return. [`LocalAnalyzer`] is the built-in heuristic
//! implementation of both; any other backend plugs in through the same
//! traits.
//!
//! Both traits are synchronous and infallible: a backend that cannot
//! answer returns a neutral analysis rather than an error, so every
//! consumer can always build its report.

mod lexicon;
mod local;

pub use local::LocalAnalyzer;

use crate::models::{SentimentResult, TextAnalysis};

/// Produces key phrases, entities, sentiment and (optionally) emotions and
/// topics for a text.
pub trait TextAnalyzer: Send + Sync {
    fn analyze_text(&self, text: &str) -> TextAnalysis;
}

/// Produces a sentiment label with per-label confidence scores.
pub trait SentimentAnalyzer: Send + Sync {
    fn get_sentiment(&self, text: &str) -> SentimentResult;
}
