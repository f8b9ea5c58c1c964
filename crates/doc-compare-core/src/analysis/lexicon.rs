//! Word lists for the local heuristic analyzer.

/// Polarity of sentiment-bearing words, in `[-1, 1]`.
pub(super) const POLARITY: &[(&str, f64)] = &[
    ("excellent", 1.0),
    ("outstanding", 1.0),
    ("wonderful", 1.0),
    ("great", 0.8),
    ("amazing", 0.8),
    ("love", 0.8),
    ("happy", 0.8),
    ("delighted", 0.8),
    ("good", 0.7),
    ("pleased", 0.6),
    ("success", 0.6),
    ("successful", 0.6),
    ("benefit", 0.5),
    ("improved", 0.5),
    ("improvement", 0.5),
    ("positive", 0.5),
    ("strong", 0.4),
    ("nice", 0.6),
    ("helpful", 0.5),
    ("clear", 0.3),
    ("safe", 0.4),
    ("secure", 0.4),
    ("growth", 0.4),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("worst", -1.0),
    ("bad", -0.7),
    ("poor", -0.6),
    ("hate", -0.8),
    ("angry", -0.7),
    ("sad", -0.6),
    ("failure", -0.7),
    ("failed", -0.6),
    ("fail", -0.6),
    ("loss", -0.5),
    ("risk", -0.3),
    ("problem", -0.5),
    ("problems", -0.5),
    ("negative", -0.5),
    ("weak", -0.4),
    ("unsafe", -0.6),
    ("breach", -0.6),
    ("violation", -0.6),
    ("penalty", -0.5),
    ("decline", -0.4),
    ("delay", -0.3),
    ("wrong", -0.5),
];

/// Words that flip the polarity of the next sentiment-bearing word.
pub(super) const NEGATORS: &[&str] = &["not", "no", "never", "neither", "nor", "without"];

/// Emotion categories keyed by trigger word.
pub(super) const EMOTIONS: &[(&str, &str)] = &[
    ("happy", "joy"),
    ("delighted", "joy"),
    ("love", "joy"),
    ("excited", "joy"),
    ("glad", "joy"),
    ("angry", "anger"),
    ("furious", "anger"),
    ("outraged", "anger"),
    ("hate", "anger"),
    ("afraid", "fear"),
    ("worried", "fear"),
    ("concerned", "fear"),
    ("risk", "fear"),
    ("threat", "fear"),
    ("sad", "sadness"),
    ("unfortunately", "sadness"),
    ("regret", "sadness"),
    ("loss", "sadness"),
    ("surprised", "surprise"),
    ("unexpected", "surprise"),
    ("sudden", "surprise"),
    ("trust", "trust"),
    ("reliable", "trust"),
    ("confident", "trust"),
];

/// Function words that break key-phrase runs.
pub(super) const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "may",
    "me", "might", "more", "most", "must", "my", "no", "nor", "not", "now", "of", "off", "on",
    "once", "only", "or", "other", "our", "ours", "out", "over", "own", "same", "shall", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "would", "you", "your", "yours",
];

pub(super) fn polarity(word: &str) -> Option<f64> {
    POLARITY.iter().find(|(w, _)| *w == word).map(|(_, p)| *p)
}

pub(super) fn emotion(word: &str) -> Option<&'static str> {
    EMOTIONS.iter().find(|(w, _)| *w == word).map(|(_, e)| *e)
}

pub(super) fn is_stopword(word: &str) -> bool {
    STOPWORDS.binary_search(&word).is_ok()
}

pub(super) fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwords_sorted_for_binary_search() {
        assert!(STOPWORDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_polarity_in_range() {
        assert!(POLARITY.iter().all(|(_, p)| (-1.0..=1.0).contains(p)));
    }
}
