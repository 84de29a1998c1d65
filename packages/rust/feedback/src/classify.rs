//! Heuristic classification of free-text feedback.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use postcraft_shared::{FeedbackAnalysis, IssueTag, SectionTag, Sentiment, Severity};

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "perfect",
    "like",
    "love",
    "helpful",
    "clear",
    "well-written",
    "informative",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "poor",
    "terrible",
    "awful",
    "hate",
    "dislike",
    "confusing",
    "unclear",
    "boring",
    "repetitive",
    "wrong",
];

/// Negative hits above this count raise severity to medium.
const MEDIUM_SEVERITY_THRESHOLD: usize = 2;

const ISSUE_TRIGGERS: &[(IssueTag, &[&str])] = &[
    (IssueTag::Length, &["too long", "too short", "lengthy", "brief"]),
    (
        IssueTag::Clarity,
        &["unclear", "confusing", "hard to understand", "complicated"],
    ),
    (
        IssueTag::Structure,
        &["poorly structured", "disorganized", "messy layout"],
    ),
    (
        IssueTag::Tone,
        &["wrong tone", "too formal", "too casual", "inappropriate"],
    ),
    (
        IssueTag::Content,
        &["missing information", "incomplete", "lacks detail", "superficial"],
    ),
    (
        IssueTag::Formatting,
        &["bad formatting", "poor layout", "formatting issues"],
    ),
];

const SECTION_KEYWORDS: &[(SectionTag, &[&str])] = &[
    (SectionTag::Title, &["title", "heading", "header"]),
    (
        SectionTag::Introduction,
        &["introduction", "intro", "opening", "beginning"],
    ),
    (
        SectionTag::MainContent,
        &["content", "body", "main section", "article"],
    ),
    (
        SectionTag::Conclusion,
        &["conclusion", "ending", "summary", "wrap-up"],
    ),
    (
        SectionTag::Formatting,
        &["format", "layout", "structure", "organization"],
    ),
];

/// Lower-cased word tokens, keeping inner hyphens (`well-written`).
fn tokens(text: &str) -> HashSet<&str> {
    static TOKEN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\w+(?:-\w+)*").expect("valid regex"));

    TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Classify feedback into sentiment, issues, affected sections and severity.
///
/// Sentiment words are matched as whole tokens so `unclear` does not also
/// count as `clear`. Issue and section triggers are substring matches, which
/// lets multi-word phrases fire. Empty input yields the neutral default.
pub fn classify(feedback: &str) -> FeedbackAnalysis {
    let lowered = feedback.to_lowercase();
    if lowered.trim().is_empty() {
        return FeedbackAnalysis::default();
    }

    let words = tokens(&lowered);
    let positive_hits = POSITIVE_WORDS.iter().filter(|w| words.contains(*w)).count();
    let negative_hits = NEGATIVE_WORDS.iter().filter(|w| words.contains(*w)).count();

    let sentiment = match positive_hits.cmp(&negative_hits) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    };

    let severity = if sentiment == Sentiment::Negative && negative_hits > MEDIUM_SEVERITY_THRESHOLD {
        Severity::Medium
    } else {
        Severity::Low
    };

    let issues = ISSUE_TRIGGERS
        .iter()
        .filter(|(_, phrases)| phrases.iter().any(|p| lowered.contains(*p)))
        .map(|(tag, _)| *tag)
        .collect();

    let affected_sections = SECTION_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lowered.contains(*k)))
        .map(|(tag, _)| *tag)
        .collect();

    FeedbackAnalysis {
        sentiment,
        issues,
        affected_sections,
        severity,
        positive_hits,
        negative_hits,
    }
}
