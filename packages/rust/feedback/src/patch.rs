//! Deterministic content patches, one rule per proposal kind and section.
//!
//! Every rule checks for its own marker first, so applying the same proposal
//! twice leaves the content as it was after the first application.

use tracing::debug;

use postcraft_shared::{ChangeProposal, ProposalKind, SectionTag, Template};

const WRITING_GUIDELINES: &str = "\n\n## Writing Guidelines\n\n*Write clearly and concisely. Use simple language and short sentences.*";
const TARGET_LENGTH: &str = "\n\n*Target length: 500-1000 words*";
const TONE_GUIDELINES: &str =
    "\n\n## Tone\n\n*Keep a consistent, audience-appropriate tone throughout.*";
const ADDITIONAL_INFO: &str = "\n\n## Additional Information\n\n{additional_info}";

const OVERVIEW_LAYOUT: &str = "## Overview\n\n{overview}\n\n## Details\n\n{main_content}";
const INTRO_NOTE: &str = "\n\n*Make this introduction engaging and informative*";
const CONCLUSION_NOTE: &str = "\n\n*Provide a strong conclusion with key takeaways*";

fn add_variable(template: &mut Template, name: &str) {
    if !template.variables.iter().any(|v| v == name) {
        template.variables.push(name.to_string());
    }
}

/// Put `note` right after the first `placeholder`, unless it is already there.
fn annotate_placeholder(content: &mut String, placeholder: &str, note: &str) -> bool {
    if content.contains(note.trim()) {
        return false;
    }
    match content.find(placeholder) {
        Some(pos) => {
            content.insert_str(pos + placeholder.len(), note);
            true
        }
        None => false,
    }
}

fn apply_one(template: &mut Template, proposal: &ChangeProposal) -> Option<&'static str> {
    let content = &mut template.content;
    match (proposal.kind, proposal.section) {
        (ProposalKind::ClarityImprovement, _) => {
            if content.contains("## Writing Guidelines") {
                return None;
            }
            content.push_str(WRITING_GUIDELINES);
            Some("Added clarity guidelines")
        }
        (ProposalKind::ContentAdjustment, _) => {
            let lowered = content.to_lowercase();
            if lowered.contains("target length") || lowered.contains("word count") {
                return None;
            }
            content.push_str(TARGET_LENGTH);
            Some("Added length guidelines")
        }
        (ProposalKind::StructuralImprovement, _) => {
            if content.matches("##").count() >= 2 || !content.contains("{main_content}") {
                return None;
            }
            *content = content.replacen("{main_content}", OVERVIEW_LAYOUT, 1);
            add_variable(template, "overview");
            Some("Improved section structure")
        }
        (ProposalKind::ToneAdjustment, _) => {
            if content.contains("## Tone") {
                return None;
            }
            content.push_str(TONE_GUIDELINES);
            Some("Added tone guidelines")
        }
        (ProposalKind::ContentAddition, _) => {
            if content.contains("{additional_info}") {
                return None;
            }
            content.push_str(ADDITIONAL_INFO);
            add_variable(template, "additional_info");
            Some("Added additional information section")
        }
        (ProposalKind::SectionImprovement, Some(SectionTag::Introduction)) => {
            annotate_placeholder(content, "{introduction}", INTRO_NOTE)
                .then_some("Enhanced introduction section")
        }
        (ProposalKind::SectionImprovement, Some(SectionTag::Conclusion)) => {
            annotate_placeholder(content, "{conclusion}", CONCLUSION_NOTE)
                .then_some("Enhanced conclusion section")
        }
        (ProposalKind::SectionImprovement, _) => None,
    }
}

/// Apply each proposal's patch to the template in order.
///
/// Returns a description of every patch that actually changed the content.
/// Metadata (version, history, timestamps) is left to the caller.
pub fn apply_proposals(template: &mut Template, proposals: &[ChangeProposal]) -> Vec<String> {
    let mut applied = Vec::new();
    for proposal in proposals {
        match apply_one(template, proposal) {
            Some(description) => applied.push(description.to_string()),
            None => debug!(kind = proposal.kind.as_str(), "patch already present or not applicable"),
        }
    }
    applied
}
