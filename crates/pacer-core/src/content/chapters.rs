//! Line-heuristic chapter index.
//!
//! Markers are informational: playback never consults them.

use alloc::{string::String, vec::Vec};

use serde::{Deserialize, Serialize};

/// Lines longer than this many chars are treated as headings as well.
pub const LONG_LINE_CHARS: usize = 60;

const CHAPTER_TOKEN: &str = "chapter";

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChapterMarker {
    /// Zero-based line number, counting runs of newlines as one break.
    #[serde(rename = "index")]
    pub line_index: usize,
    pub title: String,
}

/// Scan raw (not yet normalized) text for chapter-like lines.
pub fn detect_chapters(raw: &str) -> Vec<ChapterMarker> {
    raw.split('\n')
        .filter(|line| !line.is_empty())
        .enumerate()
        .filter(|(_, line)| looks_like_heading(line))
        .map(|(line_index, line)| ChapterMarker {
            line_index,
            title: String::from(line.trim()),
        })
        .collect()
}

fn looks_like_heading(line: &str) -> bool {
    contains_ignore_ascii_case(line, CHAPTER_TOKEN) || line.chars().count() > LONG_LINE_CHARS
}

fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

pub fn encode_chapters(chapters: &[ChapterMarker]) -> Result<String, serde_json::Error> {
    serde_json::to_string(chapters)
}

pub fn decode_chapters(encoded: &str) -> Result<Vec<ChapterMarker>, serde_json::Error> {
    serde_json::from_str(encoded)
}
