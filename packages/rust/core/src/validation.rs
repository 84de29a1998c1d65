//! Placeholder scanning and structural checks for template content.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Matches `{name}` placeholders; group 1 is the variable name.
pub(crate) static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("valid regex"));

/// Outcome of [`validate`]. Only `issues` make a template invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateValidation {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub found_variables: Vec<String>,
}

/// Distinct placeholder names in order of first appearance.
pub fn extract_placeholders(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PLACEHOLDER_RE
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Check template content, optionally against the variables it should use.
pub fn validate(content: &str, expected: Option<&[String]>) -> TemplateValidation {
    let mut report = TemplateValidation {
        is_valid: true,
        ..TemplateValidation::default()
    };

    if content.trim().is_empty() {
        report.is_valid = false;
        report.issues.push("Template content is empty".into());
        return report;
    }

    let found = extract_placeholders(content);

    if let Some(expected) = expected.filter(|e| !e.is_empty()) {
        let missing: Vec<&str> = expected
            .iter()
            .filter(|v| !found.contains(v))
            .map(String::as_str)
            .collect();
        let extra: Vec<&str> = found
            .iter()
            .filter(|v| !expected.contains(v))
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            report.warnings.push(format!(
                "Expected variables not found in template: {}",
                missing.join(", ")
            ));
        }
        if !extra.is_empty() {
            report.warnings.push(format!(
                "Unexpected variables found in template: {}",
                extra.join(", ")
            ));
        }
    }

    if !content.contains('#') {
        report
            .warnings
            .push("Template lacks proper heading structure".into());
    }

    let open = content.matches('{').count();
    let close = content.matches('}').count();
    if open != close {
        report.is_valid = false;
        report
            .issues
            .push(format!("Unbalanced braces: {open} open, {close} close"));
    }

    if !found.iter().any(|v| v == "title") {
        report
            .suggestions
            .push("Consider adding a {title} variable for the post title".into());
    }
    if !found.iter().any(|v| v == "content" || v == "main_content") {
        report
            .suggestions
            .push("Consider adding a content variable for the main post body".into());
    }

    report.found_variables = found;
    report
}
