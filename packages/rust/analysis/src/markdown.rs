//! Plain text to Markdown formatting for downstream generators.

use crate::cleanup::clean;
use crate::structure::paragraphs;

/// Render extracted text as Markdown.
///
/// Each paragraph is cleaned on its own so paragraph breaks survive. Short
/// all-caps paragraphs become `##` headings, other short paragraphs that do
/// not end in a period become `###` headings, everything else is body text.
pub fn format_markdown(content: &str, title: Option<&str>) -> String {
    let mut blocks: Vec<String> = Vec::new();

    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        blocks.push(format!("# {title}"));
    }

    for paragraph in paragraphs(content) {
        let text = clean(&paragraph);
        if text.is_empty() {
            continue;
        }

        let chars = text.chars().count();
        if chars < 100 && is_shouting(&text) {
            blocks.push(format!("## {}", title_case(&text)));
        } else if chars < 80 && !text.ends_with('.') {
            blocks.push(format!("### {text}"));
        } else {
            blocks.push(text);
        }
    }

    blocks.join("\n\n")
}

/// At least one letter and no lowercase letters.
fn is_shouting(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_headings_and_body() {
        let input = "GETTING STARTED\n\nInstall the tool\n\nRun the installer and follow the prompts on screen.";
        let md = format_markdown(input, Some("Guide"));
        assert_eq!(
            md,
            "# Guide\n\n## Getting Started\n\n### Install the tool\n\nRun the installer and follow the prompts on screen."
        );
    }

    #[test]
    fn skips_blank_title() {
        let md = format_markdown("Body text ends here.", Some("  "));
        assert_eq!(md, "Body text ends here.");
    }

    #[test]
    fn empty_content() {
        assert_eq!(format_markdown("", None), "");
    }
}
