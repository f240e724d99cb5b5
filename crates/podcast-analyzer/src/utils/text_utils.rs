//! Text helpers shared by prompt construction and the simulator

use std::borrow::Cow;
use regex::Regex;
use lazy_static::lazy_static;

lazy_static! {
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

pub struct TextUtils;

impl TextUtils {
    /// Case-insensitive substring check
    pub fn contains_ignore_case(text: &str, pattern: &str) -> bool {
        if pattern.len() > text.len() {
            return false;
        }
        text.to_lowercase().contains(&pattern.to_lowercase())
    }

    /// True if any of the (already lowercase) needles occur in `lowered`
    pub fn contains_any(lowered: &str, needles: &[&str]) -> bool {
        needles.iter().any(|needle| lowered.contains(needle))
    }

    pub fn normalize_whitespace(text: &str) -> Cow<'_, str> {
        if WHITESPACE_REGEX.is_match(text) {
            Cow::Owned(WHITESPACE_REGEX.replace_all(text, " ").trim().to_string())
        } else {
            Cow::Borrowed(text)
        }
    }

    /// First `max_chars` characters, never splitting a code point
    pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &text[..byte_idx],
            None => text,
        }
    }

    /// Truncate to `max_len` characters, ending in `...` when shortened
    pub fn truncate_with_ellipsis(text: &str, max_len: usize) -> Cow<'_, str> {
        if text.chars().count() <= max_len {
            Cow::Borrowed(text)
        } else if max_len <= 3 {
            Cow::Borrowed("...")
        } else {
            let mut result = String::with_capacity(max_len);
            result.push_str(Self::truncate_chars(text, max_len - 3));
            result.push_str("...");
            Cow::Owned(result)
        }
    }

    /// Whether the decimal form of any number in `range` occurs in `text`.
    ///
    /// Plain substring match: "2024" contains "20" and "24".
    pub fn has_number_in(text: &str, range: std::ops::RangeInclusive<u32>) -> bool {
        range.into_iter().any(|n| text.contains(n.to_string().as_str()))
    }

    pub fn count_words(text: &str) -> usize {
        text.split_whitespace().count()
    }
}
