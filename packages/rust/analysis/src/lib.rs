//! Content analysis for extracted source text.
//!
//! Turns raw text from an upstream fetcher into the artifacts a downstream
//! generator consumes: cleaned text, keywords, summaries, structural metrics,
//! entities, sections and a duplicate-detection fingerprint.
//!
//! Every function here is pure and tolerates empty or malformed input by
//! returning empty/zeroed output; nothing in this crate returns an error.

mod cleanup;
mod entities;
mod keywords;
mod markdown;
mod structure;
mod summary;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use postcraft_shared::AnalysisOptions;

pub use cleanup::clean;
pub use entities::{Entities, extract_entities};
pub use keywords::{Keyword, extract_keywords};
pub use markdown::format_markdown;
pub use structure::{Section, StructureMetrics, analyze_structure, split_sections};
pub use summary::summarize;

/// Character budget of [`ContentDocument::short_summary`].
const SHORT_SUMMARY_LENGTH: usize = 150;
/// Sentence budget of [`ContentDocument::short_summary`].
const SHORT_SUMMARY_SENTENCES: usize = 2;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Raw text plus whatever metadata the upstream fetcher supplied.
#[derive(Debug, Clone, Default)]
pub struct SourceText {
    pub text: String,
    pub title: Option<String>,
    pub source_url: Option<String>,
}

/// Broad subject areas recognised by [`detect_topics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Technology,
    Business,
    Science,
    Education,
    News,
}

const TOPIC_KEYWORDS: &[(Topic, &[&str])] = &[
    (
        Topic::Technology,
        &["technology", "software", "programming", "computer", "digital", "ai", "machine learning"],
    ),
    (
        Topic::Business,
        &["business", "company", "market", "revenue", "profit", "strategy"],
    ),
    (
        Topic::Science,
        &["research", "study", "experiment", "data", "analysis", "scientific"],
    ),
    (
        Topic::Education,
        &["learn", "education", "tutorial", "guide", "course", "teaching"],
    ),
    (
        Topic::News,
        &["news", "report", "announced", "today", "recently", "update"],
    ),
];

/// Coarse quality signals for generated content planning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QualityIndicators {
    pub has_sufficient_content: bool,
    pub good_readability: bool,
    pub well_structured: bool,
    pub keyword_rich: bool,
}

/// All analysis artifacts derived from one piece of source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub raw_text: String,
    pub cleaned_text: String,
    pub keywords: Vec<Keyword>,
    pub entities: Entities,
    pub summary: String,
    pub short_summary: String,
    pub metrics: StructureMetrics,
    pub sections: Vec<Section>,
    pub quality: QualityIndicators,
    pub topics: Vec<Topic>,
    pub fingerprint: String,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Analyze bare text with no source metadata.
pub fn analyze(text: &str, opts: &AnalysisOptions) -> ContentDocument {
    analyze_source(
        &SourceText {
            text: text.to_string(),
            ..SourceText::default()
        },
        opts,
    )
}

/// Analyze text supplied by the upstream fetcher.
///
/// Keywords and summaries are computed on cleaned text. Metrics, entities and
/// sections use the raw text: cleaning folds paragraph breaks and drops the
/// `@` of e-mail addresses.
#[instrument(skip_all, fields(len = source.text.len()))]
pub fn analyze_source(source: &SourceText, opts: &AnalysisOptions) -> ContentDocument {
    let raw = source.text.as_str();
    let cleaned = clean(raw);

    if cleaned.is_empty() {
        debug!("empty input, returning degenerate document");
    }

    let keywords = extract_keywords(&cleaned, opts.max_keywords);
    let metrics = analyze_structure(raw);
    let quality = QualityIndicators {
        has_sufficient_content: metrics.word_count >= 100,
        good_readability: metrics.word_count > 0 && metrics.avg_words_per_sentence <= 25.0,
        well_structured: metrics.paragraph_count >= 2,
        keyword_rich: keywords.len() >= 5,
    };

    let document = ContentDocument {
        title: source.title.clone(),
        source_url: source.source_url.clone(),
        raw_text: raw.to_string(),
        summary: summarize(&cleaned, opts.summary_max_length, opts.summary_max_sentences),
        short_summary: summarize(&cleaned, SHORT_SUMMARY_LENGTH, SHORT_SUMMARY_SENTENCES),
        entities: extract_entities(raw),
        sections: split_sections(raw, opts.max_section_length),
        topics: detect_topics(&cleaned),
        fingerprint: fingerprint(raw),
        keywords,
        metrics,
        quality,
        cleaned_text: cleaned,
    };

    debug!(
        words = document.metrics.word_count,
        keywords = document.keywords.len(),
        sections = document.sections.len(),
        "analysis complete"
    );

    document
}

/// SHA-256 hex digest of the lower-cased cleaned text.
///
/// Whitespace, quote and punctuation noise does not change the result, so
/// `fingerprint(t) == fingerprint(&clean(t))` for every `t`.
pub fn fingerprint(text: &str) -> String {
    let normalized = clean(text).to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Topics whose keyword list intersects the text.
///
/// Single-word keywords must match a whole word; phrases match as substrings.
pub fn detect_topics(text: &str) -> Vec<Topic> {
    let lowered = text.to_lowercase();
    let tokens: std::collections::HashSet<&str> = keywords::words(&lowered).collect();

    TOPIC_KEYWORDS
        .iter()
        .filter(|(_, words)| {
            words.iter().any(|w| {
                if w.contains(' ') {
                    lowered.contains(*w)
                } else {
                    tokens.contains(w)
                }
            })
        })
        .map(|(topic, _)| *topic)
        .collect()
}
