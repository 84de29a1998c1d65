//! Pattern-based entity extraction.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::keywords::is_stopword;

/// Entity candidates found in a document, grouped by category.
///
/// Lists keep document order. Only `capitalized_words` is deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Entities {
    pub urls: Vec<String>,
    pub emails: Vec<String>,
    pub dates: Vec<String>,
    pub numbers: Vec<String>,
    pub capitalized_words: Vec<String>,
}

impl Entities {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
            && self.emails.is_empty()
            && self.dates.is_empty()
            && self.numbers.is_empty()
            && self.capitalized_words.is_empty()
    }
}

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("valid regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});

// d/m/y or m/d/y with 2-4 digit year, and ISO-like y/m/d
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b|\b\d{4}[/-]\d{1,2}[/-]\d{1,2}\b")
        .expect("valid regex")
});

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("valid regex"));

static CAPITALIZED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+\b").expect("valid regex"));

fn find_all(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Extract URLs, e-mail addresses, dates, numbers and proper-noun candidates.
pub fn extract_entities(text: &str) -> Entities {
    if text.trim().is_empty() {
        return Entities::default();
    }

    let mut seen = HashSet::new();
    let capitalized_words = CAPITALIZED_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|w| w.len() > 2 && !is_stopword(&w.to_lowercase()))
        .filter(|w| seen.insert(*w))
        .map(str::to_string)
        .collect();

    Entities {
        urls: find_all(&URL_RE, text),
        emails: find_all(&EMAIL_RE, text),
        dates: find_all(&DATE_RE, text),
        numbers: find_all(&NUMBER_RE, text),
        capitalized_words,
    }
}
