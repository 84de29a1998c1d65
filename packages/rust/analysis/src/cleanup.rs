//! Text normalization pipeline.
//!
//! Each pass is a function `&str -> String` applied in sequence. The pass
//! order matters: no later pass may re-create a pattern an earlier pass
//! removed, which is what makes [`clean`] idempotent.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full cleanup pipeline on raw extracted text.
pub fn clean(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let mut result = normalize_typography(text);

    result = strip_disallowed(&result);
    result = collapse_whitespace(&result);
    result = tighten_punctuation(&result);
    result = collapse_repeated_punctuation(&result);
    result = space_sentences(&result);

    result.trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: Typographic quotes and dashes
// ---------------------------------------------------------------------------

/// Replace curly quotes and en/em dashes with their ASCII forms.
fn normalize_typography(text: &str) -> String {
    text.replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace('\u{2013}', "-")
        .replace('\u{2014}', "--")
}

// ---------------------------------------------------------------------------
// Pass 2: Strip disallowed characters
// ---------------------------------------------------------------------------

/// Keep word characters, whitespace and basic prose punctuation only.
fn strip_disallowed(text: &str) -> String {
    static DISALLOWED_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"[^\w\s.,!?;:()\-"'/]"#).expect("valid regex")
    });

    DISALLOWED_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Collapse whitespace
// ---------------------------------------------------------------------------

/// Collapse every whitespace run (newlines included) into a single space.
fn collapse_whitespace(text: &str) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    WS_RE.replace_all(text, " ").to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: No space before punctuation
// ---------------------------------------------------------------------------

fn tighten_punctuation(text: &str) -> String {
    static SPACE_BEFORE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\s+([,.!?;:])").expect("valid regex"));

    SPACE_BEFORE_RE.replace_all(text, "$1").to_string()
}

// ---------------------------------------------------------------------------
// Pass 5: Collapse repeated terminal punctuation
// ---------------------------------------------------------------------------

/// `"Wait...!?"` becomes `"Wait."`: the first mark of a run wins.
fn collapse_repeated_punctuation(text: &str) -> String {
    static REPEAT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"([.!?])[.!?]+").expect("valid regex"));

    REPEAT_RE.replace_all(text, "$1").to_string()
}

// ---------------------------------------------------------------------------
// Pass 6: One space between sentences
// ---------------------------------------------------------------------------

fn space_sentences(text: &str) -> String {
    static SENTENCE_GAP_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"([.!?])\s*([A-Z])").expect("valid regex"));

    SENTENCE_GAP_RE.replace_all(text, "$1 $2").to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_typography_replaces_curly_quotes() {
        let input = "\u{201c}Hi\u{201d} \u{2018}there\u{2019} \u{2013} now\u{2014}then";
        assert_eq!(normalize_typography(input), "\"Hi\" 'there' - now--then");
    }

    #[test]
    fn strip_disallowed_removes_symbols() {
        assert_eq!(strip_disallowed("a+b = c & d #tag"), "ab  c  d tag");
        assert_eq!(strip_disallowed("keep (this), ok?"), "keep (this), ok?");
    }

    #[test]
    fn collapse_whitespace_joins_lines() {
        assert_eq!(collapse_whitespace("a \n\n b\t\tc"), "a b c");
    }

    #[test]
    fn tighten_punctuation_removes_gap() {
        assert_eq!(tighten_punctuation("Hello , world !"), "Hello, world!");
    }

    #[test]
    fn collapse_repeated_punctuation_keeps_first() {
        assert_eq!(collapse_repeated_punctuation("Wait...!? Really??"), "Wait. Really?");
    }

    #[test]
    fn space_sentences_inserts_gap() {
        assert_eq!(space_sentences("One.Two!Three"), "One. Two! Three");
        assert_eq!(space_sentences("v1.2 stays"), "v1.2 stays");
    }

    #[test]
    fn clean_full_pipeline() {
        let input = "  Hello\u{2019}s   world !!  This is\n\n a test...Right ? ";
        assert_eq!(clean(input), "Hello's world! This is a test. Right?");
    }

    #[test]
    fn clean_empty_and_blank() {
        assert_eq!(clean(""), "");
        assert_eq!(clean(" \n\t "), "");
    }

    #[test]
    fn clean_is_idempotent() {
        let inputs = [
            "a . . b",
            "x. .Y",
            " .A",
            "Plain text with no issues.",
            "Mixed \u{201c}quotes\u{201d}\u{2014}and dashes ,, right?!?Next",
            "Emoji \u{1F600} and symbols @#$% removed... OK",
            "\n\nParagraph one.\n\nParagraph two!!\n\n",
            "a ,. b ; c :d",
        ];
        for input in inputs {
            let once = clean(input);
            let twice = clean(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }
}
