//! Extractive lead summaries.

use crate::structure::sentences;

const ELLIPSIS: &str = "...";

/// Greedily take leading sentences while both budgets hold.
///
/// Each accepted sentence is re-terminated with `". "`. When not even the
/// first sentence fits in `max_length` characters, the text is truncated
/// instead so a non-empty input never produces an empty summary.
pub fn summarize(text: &str, max_length: usize, max_sentences: usize) -> String {
    if text.trim().is_empty() || max_length == 0 || max_sentences == 0 {
        return String::new();
    }

    let mut summary = String::new();
    let mut summary_len = 0;

    for sentence in sentences(text).into_iter().take(max_sentences) {
        let added = sentence.chars().count() + 2;
        if summary_len + added > max_length {
            break;
        }
        summary.push_str(sentence);
        summary.push_str(". ");
        summary_len += added;
    }

    if summary.is_empty() {
        tracing::debug!(max_length, "no sentence fits summary budget, truncating");
        return truncate(text.trim(), max_length);
    }

    summary.trim_end().to_string()
}

/// Cut `text` to at most `max_length` characters, marking the cut with an ellipsis.
fn truncate(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    if max_length <= ELLIPSIS.len() {
        return text.chars().take(max_length).collect();
    }
    let head: String = text.chars().take(max_length - ELLIPSIS.len()).collect();
    format!("{}{ELLIPSIS}", head.trim_end())
}
