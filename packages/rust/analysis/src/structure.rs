//! Structural metrics, sentence/paragraph splitting, and section packing.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::keywords::words;

/// Average adult reading speed used for reading-time estimates.
const WORDS_PER_MINUTE: usize = 200;

/// Words longer than this count towards the complexity score.
const LONG_WORD_CHARS: usize = 6;

/// Countable shape of a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructureMetrics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub avg_words_per_sentence: f64,
    pub avg_words_per_paragraph: f64,
    pub reading_time_minutes: usize,
    /// Share of words longer than six characters, in `[0, 1]`.
    pub complexity_score: f64,
    pub character_count: usize,
    pub long_word_count: usize,
}

/// A run of whole paragraphs produced by [`split_sections`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// 1-based position.
    pub number: usize,
    pub content: String,
    pub word_count: usize,
    pub character_count: usize,
}

/// Non-empty, trimmed sentences split on `.`, `!` and `?`.
pub(crate) fn sentences(text: &str) -> Vec<&str> {
    static SENTENCE_END_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

    SENTENCE_END_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Non-empty, trimmed paragraphs separated by blank lines.
pub(crate) fn paragraphs(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Compute word/sentence/paragraph counts and derived readability figures.
pub fn analyze_structure(text: &str) -> StructureMetrics {
    if text.trim().is_empty() {
        return StructureMetrics::default();
    }

    let word_list: Vec<&str> = words(text).collect();
    let word_count = word_list.len();
    let sentence_count = sentences(text).len();
    let paragraph_count = paragraphs(text).len();
    let long_word_count = word_list
        .iter()
        .filter(|w| w.chars().count() > LONG_WORD_CHARS)
        .count();

    StructureMetrics {
        word_count,
        sentence_count,
        paragraph_count,
        avg_words_per_sentence: round_to(word_count as f64 / sentence_count.max(1) as f64, 1),
        avg_words_per_paragraph: round_to(word_count as f64 / paragraph_count.max(1) as f64, 1),
        reading_time_minutes: (word_count / WORDS_PER_MINUTE).max(1),
        complexity_score: round_to(long_word_count as f64 / word_count.max(1) as f64, 2),
        character_count: text.chars().count(),
        long_word_count,
    }
}

/// Pack whole paragraphs into sections of at most `max_section_length` characters.
///
/// A paragraph is never split: one longer than the limit becomes its own
/// oversized section. Joining the sections' contents with blank lines yields
/// the original paragraph sequence.
pub fn split_sections(text: &str, max_section_length: usize) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = String::new();

    for paragraph in paragraphs(text) {
        if current.is_empty() {
            current = paragraph;
            continue;
        }

        // +2 for the "\n\n" separator
        let candidate_len = current.chars().count() + 2 + paragraph.chars().count();
        if candidate_len <= max_section_length {
            current.push_str("\n\n");
            current.push_str(&paragraph);
        } else {
            push_section(&mut sections, std::mem::replace(&mut current, paragraph));
        }
    }

    if !current.is_empty() {
        push_section(&mut sections, current);
    }

    sections
}

fn push_section(sections: &mut Vec<Section>, content: String) {
    sections.push(Section {
        number: sections.len() + 1,
        word_count: words(&content).count(),
        character_count: content.chars().count(),
        content,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_for_simple_text() {
        let text = "First sentence here. Second one follows!\n\nA new paragraph begins?";
        let m = analyze_structure(text);
        assert_eq!(m.word_count, 10);
        assert_eq!(m.sentence_count, 3);
        assert_eq!(m.paragraph_count, 2);
        assert_eq!(m.avg_words_per_sentence, 3.3);
        assert_eq!(m.avg_words_per_paragraph, 5.0);
        assert_eq!(m.reading_time_minutes, 1);
        // sentence, follows, paragraph
        assert_eq!(m.long_word_count, 3);
        assert_eq!(m.complexity_score, 0.3);
    }

    #[test]
    fn reading_time_scales_with_length() {
        let text = "word ".repeat(650);
        assert_eq!(analyze_structure(&text).reading_time_minutes, 3);
    }

    #[test]
    fn empty_text_is_zeroed() {
        assert_eq!(analyze_structure(""), StructureMetrics::default());
        assert_eq!(analyze_structure("  \n "), StructureMetrics::default());
    }

    #[test]
    fn sentences_skip_empty_pieces() {
        assert_eq!(sentences("One. Two!! Three?"), ["One", "Two", "Three"]);
        assert!(sentences("...").is_empty());
    }

    #[test]
    fn split_sections_packs_paragraphs() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        let sections = split_sections(text, 10);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].content, "aaaa\n\nbbbb");
        assert_eq!(sections[0].number, 1);
        assert_eq!(sections[1].content, "cccc");
        assert_eq!(sections[1].number, 2);
    }

    #[test]
    fn oversized_paragraph_stands_alone() {
        let long = "x".repeat(50);
        let text = format!("short\n\n{long}\n\ntail");
        let sections = split_sections(&text, 20);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1].content, long);
        assert_eq!(sections[1].character_count, 50);
    }

    #[test]
    fn sections_reassemble_to_paragraphs() {
        let text = "One para here.\n\nTwo para here.\r\n\r\nThree is a bit longer than the rest.\n\n\n\nFour.";
        for limit in [1, 10, 30, 60, 1000] {
            let sections = split_sections(text, limit);
            let joined = sections
                .iter()
                .map(|s| s.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            assert_eq!(joined, paragraphs(text).join("\n\n"));
            for section in &sections {
                let single_paragraph = !section.content.contains("\n\n");
                assert!(section.character_count <= limit || single_paragraph);
            }
        }
    }

    #[test]
    fn split_sections_empty() {
        assert!(split_sections("", 100).is_empty());
    }
}
