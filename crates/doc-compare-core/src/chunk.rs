//! Fixed-size character chunker for remote request bodies.
//!
//! Remote translation and language-detection services cap the size of a
//! single request, so long documents are split into bounded pieces and
//! each piece is sent on its own.
//!
//! # Guarantees
//!
//! - Chunks are cut on `char` boundaries, never inside a UTF-8 sequence.
//! - Every chunk holds at most `max_chars` characters.
//! - Concatenating the chunks in order reproduces the input exactly.
//! - Empty input yields no chunks.
//!
//! # Example
//!
//! ```rust
//! use doc_compare_core::chunk::chunk_text;
//!
//! let chunks = chunk_text("abcdefgh", 3);
//! assert_eq!(chunks, vec!["abc", "def", "gh"]);
//! ```

/// Default chunk size for translation bodies.
pub const TRANSLATE_CHUNK_CHARS: usize = 4000;

/// Default chunk size for language detection bodies.
pub const DETECT_CHUNK_CHARS: usize = 1000;

/// Split `text` into consecutive slices of at most `max_chars` characters.
///
/// A `max_chars` of zero is treated as one.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}
