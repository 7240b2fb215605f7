//! Fixation (pivot) letter selection.

/// Largest offset [`pivot_offset`] can return.
pub const MAX_PIVOT_OFFSET: usize = 4;

/// Char offset of the fixation letter, near the centre-left of the word.
pub fn pivot_offset(word: &str) -> usize {
    offset_for_len(word.chars().count())
}

pub fn offset_for_len(char_count: usize) -> usize {
    match char_count {
        0 | 1 => 0,
        2..=5 => 1,
        6..=9 => 2,
        10..=13 => 3,
        _ => MAX_PIVOT_OFFSET,
    }
}

/// Split `word` around the char at `offset`.
///
/// Out-of-range offsets yield the whole word on the left with empty pivot and
/// right parts.
pub fn split_at_pivot(word: &str, offset: usize) -> (&str, &str, &str) {
    let Some((start, ch)) = word.char_indices().nth(offset) else {
        return (word, "", "");
    };
    let end = start + ch.len_utf8();

    (&word[..start], &word[start..end], &word[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        assert_eq!(pivot_offset(""), 0);
        assert_eq!(pivot_offset("a"), 0);
        assert_eq!(pivot_offset("ab"), 1);
        assert_eq!(pivot_offset("hello"), 1);
        assert_eq!(pivot_offset("reading"), 2);
        assert_eq!(pivot_offset("wonderful"), 2);
        assert_eq!(pivot_offset("remarkables"), 3);
        assert_eq!(pivot_offset("encyclopaedia"), 3);
        assert_eq!(pivot_offset("encyclopaedias"), 4);
    }

    #[test]
    fn offset_is_monotonic_and_bounded() {
        let mut previous = 0;
        for len in 0..64 {
            let offset = offset_for_len(len);
            assert!(offset >= previous, "offset dropped at len {len}");
            assert!(offset <= MAX_PIVOT_OFFSET);
            previous = offset;
        }
    }

    #[test]
    fn splits_reading_around_a() {
        assert_eq!(split_at_pivot("reading", 2), ("re", "a", "ding"));
    }

    #[test]
    fn counts_chars_not_bytes() {
        assert_eq!(pivot_offset("año"), 1);
        assert_eq!(split_at_pivot("año", 1), ("a", "ñ", "o"));
    }

    #[test]
    fn out_of_range_offset_does_not_panic() {
        assert_eq!(split_at_pivot("", 0), ("", "", ""));
        assert_eq!(split_at_pivot("ab", 5), ("ab", "", ""));
    }
}
