//! Word streams for RSVP playback.

pub mod chapters;

use alloc::{string::String, vec::Vec};
use core::ops::Range;

/// Ordered, immutable list of non-empty words in reading order.
///
/// Words are kept as byte spans into one owned copy of the text so the whole
/// sequence costs a single allocation for the text plus one for the spans.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WordSequence {
    text: String,
    spans: Vec<Range<usize>>,
}

impl WordSequence {
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.spans.get(index).map(|span| &self.text[span.clone()])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans.iter().map(|span| &self.text[span.clone()])
    }
}

/// Split already-normalized text on single spaces, dropping empty tokens.
pub fn tokenize(text: &str) -> WordSequence {
    let mut spans = Vec::new();
    let mut cursor = 0usize;

    while let Some((span, next_cursor)) = next_word_at(text, cursor) {
        spans.push(span);
        cursor = next_cursor;
    }

    WordSequence {
        text: String::from(text),
        spans,
    }
}

/// Collapse every whitespace run into one space and trim both ends.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());

    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }

    out
}

/// Whether a word closes a sentence (`.`, `!` or `?` as its last char).
///
/// Abbreviations such as "Mr." count as sentence ends too.
pub fn ends_sentence(word: &str) -> bool {
    matches!(word.chars().next_back(), Some('.' | '!' | '?'))
}

fn next_word_at(text: &str, mut cursor: usize) -> Option<(Range<usize>, usize)> {
    let bytes = text.as_bytes();
    let len = bytes.len();

    while cursor < len && bytes[cursor] == b' ' {
        cursor += 1;
    }
    if cursor >= len {
        return None;
    }

    let start = cursor;
    while cursor < len && bytes[cursor] != b' ' {
        cursor += 1;
    }

    Some((start..cursor, cursor))
}
