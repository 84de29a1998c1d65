//! Frequency-based keyword extraction.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Function words never reported as keywords or proper-noun candidates.
pub(crate) const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "can", "this", "that", "these", "those", "i",
    "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

/// Terms with this many characters or fewer are ignored.
const MIN_TERM_CHARS: usize = 3;

/// A keyword and the number of times it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keyword {
    pub term: String,
    pub frequency: usize,
}

pub(crate) fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Word tokens (`\b\w+\b`) in order of appearance.
pub(crate) fn words(text: &str) -> impl Iterator<Item = &str> {
    static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid regex"));

    WORD_RE.find_iter(text).map(|m| m.as_str())
}

/// Return the `max_keywords` most frequent non-stopword terms.
///
/// Ties are broken by first appearance in the text, so the output is a pure
/// function of the input.
pub fn extract_keywords(text: &str, max_keywords: usize) -> Vec<Keyword> {
    if text.trim().is_empty() || max_keywords == 0 {
        return Vec::new();
    }

    let lowered = text.to_lowercase();

    // term -> (frequency, first position)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, word) in words(&lowered).enumerate() {
        if word.chars().count() <= MIN_TERM_CHARS || is_stopword(word) {
            continue;
        }
        counts.entry(word).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(term, (freq, first))| (term, freq, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(max_keywords)
        .map(|(term, frequency, _)| Keyword {
            term: term.to_string(),
            frequency,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_orders_by_frequency() {
        let text = "Rust compilers love Rust. Compilers check borrowing; rust wins.";
        let keywords = extract_keywords(text, 10);
        assert_eq!(keywords[0].term, "rust");
        assert_eq!(keywords[0].frequency, 3);
        assert_eq!(keywords[1].term, "compilers");
        assert_eq!(keywords[1].frequency, 2);
    }

    #[test]
    fn ties_break_by_first_appearance() {
        let keywords = extract_keywords("zebra apple mango zebra apple mango", 3);
        let terms: Vec<&str> = keywords.iter().map(|k| k.term.as_str()).collect();
        assert_eq!(terms, ["zebra", "apple", "mango"]);
    }

    #[test]
    fn never_returns_stopwords_or_short_terms() {
        let text = "The cat and the dog were with those that have been here before them.";
        for keyword in extract_keywords(text, 50) {
            assert!(keyword.term.chars().count() > MIN_TERM_CHARS);
            assert!(!is_stopword(&keyword.term));
        }
    }

    #[test]
    fn respects_limit() {
        let text = "alpha bravo charlie delta echo foxtrot";
        assert_eq!(extract_keywords(text, 2).len(), 2);
        assert!(extract_keywords(text, 0).is_empty());
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(extract_keywords("", 10).is_empty());
        assert!(extract_keywords("   ", 10).is_empty());
    }
}
