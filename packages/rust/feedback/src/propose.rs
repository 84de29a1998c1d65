//! Mapping from feedback analysis to typed change proposals.

use std::collections::{BTreeSet, HashSet};

use postcraft_shared::{
    ChangeProposal, Effort, FeedbackAnalysis, ImpactAssessment, ImpactLevel, IssueTag, Priority,
    ProposalKind, SectionTag, Template,
};

/// Impact class of a single proposal kind.
fn kind_impact(kind: ProposalKind) -> ImpactLevel {
    match kind {
        ProposalKind::StructuralImprovement => ImpactLevel::High,
        ProposalKind::ContentAdjustment | ProposalKind::SectionImprovement => ImpactLevel::Medium,
        ProposalKind::ClarityImprovement
        | ProposalKind::ToneAdjustment
        | ProposalKind::ContentAddition => ImpactLevel::Low,
    }
}

fn proposal(
    kind: ProposalKind,
    section: Option<SectionTag>,
    description: &str,
    priority: Priority,
) -> ChangeProposal {
    ChangeProposal {
        kind,
        section,
        description: description.to_string(),
        priority,
        impact: kind_impact(kind),
    }
}

fn issue_proposal(issue: IssueTag) -> Option<ChangeProposal> {
    let p = match issue {
        IssueTag::Length => proposal(
            ProposalKind::ContentAdjustment,
            None,
            "Adjust content length guidelines in template",
            Priority::Medium,
        ),
        IssueTag::Clarity => proposal(
            ProposalKind::ClarityImprovement,
            None,
            "Improve clarity and readability instructions",
            Priority::High,
        ),
        IssueTag::Structure => proposal(
            ProposalKind::StructuralImprovement,
            None,
            "Improve template organization and flow",
            Priority::High,
        ),
        IssueTag::Tone => proposal(
            ProposalKind::ToneAdjustment,
            None,
            "Adjust tone and writing style guidelines",
            Priority::Medium,
        ),
        IssueTag::Content => proposal(
            ProposalKind::ContentAddition,
            None,
            "Add a section for supplementary information",
            Priority::Medium,
        ),
        IssueTag::Formatting => return None,
    };
    Some(p)
}

fn section_proposal(section: SectionTag) -> Option<ChangeProposal> {
    let description = match section {
        SectionTag::Introduction => "Improve introduction section based on feedback",
        SectionTag::Conclusion => "Improve conclusion section based on feedback",
        _ => return None,
    };
    Some(proposal(
        ProposalKind::SectionImprovement,
        Some(section),
        description,
        Priority::Medium,
    ))
}

/// Build the ordered proposal list for an analysis.
///
/// Issue-level proposals come first in issue order, then section-level ones.
/// Duplicates by `(kind, section)` are dropped, keeping the first. The
/// template is accepted for symmetry with the apply step; the rules do not
/// currently depend on its content.
pub fn propose(analysis: &FeedbackAnalysis, _template: &Template) -> Vec<ChangeProposal> {
    let candidates = analysis
        .issues
        .iter()
        .filter_map(|i| issue_proposal(*i))
        .chain(
            analysis
                .affected_sections
                .iter()
                .filter_map(|s| section_proposal(*s)),
        );

    let mut seen = HashSet::new();
    candidates.filter(|p| seen.insert(p.key())).collect()
}

/// Aggregate impact of a proposal set.
///
/// Any structural proposal makes the set high impact; otherwise more than one
/// medium-impact proposal makes it medium. Confirmation is always required.
pub fn assess_impact(proposals: &[ChangeProposal]) -> ImpactAssessment {
    let high = proposals
        .iter()
        .filter(|p| kind_impact(p.kind) == ImpactLevel::High)
        .count();
    let medium = proposals
        .iter()
        .filter(|p| kind_impact(p.kind) == ImpactLevel::Medium)
        .count();

    let mut assessment = ImpactAssessment::default();
    if high > 0 {
        assessment.overall = ImpactLevel::High;
        assessment.risk_level = ImpactLevel::Medium;
        assessment.estimated_effort = Effort::Significant;
        assessment.backward_compatible = false;
    } else if medium > 1 {
        assessment.overall = ImpactLevel::Medium;
        assessment.estimated_effort = Effort::Moderate;
    }

    let components: BTreeSet<&str> = proposals
        .iter()
        .flat_map(|p| p.section.map(|s| s.as_str()).into_iter().chain([p.kind.as_str()]))
        .collect();
    assessment.affected_components = components.into_iter().map(str::to_string).collect();

    assessment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify;

    fn template() -> Template {
        Template::new("t1", "Test", "", "# {title}\n{main_content}", vec![])
    }

    fn kinds(proposals: &[ChangeProposal]) -> Vec<ProposalKind> {
        proposals.iter().map(|p| p.kind).collect()
    }

    #[test]
    fn length_and_clarity() {
        let proposals = propose(&classify("this is too long and confusing"), &template());
        assert_eq!(
            kinds(&proposals),
            [ProposalKind::ContentAdjustment, ProposalKind::ClarityImprovement]
        );
        assert_eq!(proposals[0].priority, Priority::Medium);
        assert_eq!(proposals[1].priority, Priority::High);
    }

    #[test]
    fn sections_follow_issues() {
        let analysis = FeedbackAnalysis {
            issues: vec![IssueTag::Tone],
            affected_sections: vec![
                SectionTag::Title,
                SectionTag::Introduction,
                SectionTag::Conclusion,
            ],
            ..FeedbackAnalysis::default()
        };
        let proposals = propose(&analysis, &template());
        assert_eq!(
            kinds(&proposals),
            [
                ProposalKind::ToneAdjustment,
                ProposalKind::SectionImprovement,
                ProposalKind::SectionImprovement
            ]
        );
        assert_eq!(proposals[1].section, Some(SectionTag::Introduction));
        assert_eq!(proposals[2].section, Some(SectionTag::Conclusion));
    }

    #[test]
    fn duplicates_keep_first() {
        let analysis = FeedbackAnalysis {
            issues: vec![IssueTag::Length, IssueTag::Length, IssueTag::Formatting],
            affected_sections: vec![SectionTag::Introduction, SectionTag::Introduction],
            ..FeedbackAnalysis::default()
        };
        let proposals = propose(&analysis, &template());
        assert_eq!(proposals.len(), 2);
    }

    #[test]
    fn no_issues_no_proposals() {
        assert!(propose(&classify("great, I love it"), &template()).is_empty());
    }

    #[test]
    fn structural_is_high_impact() {
        let analysis = FeedbackAnalysis {
            issues: vec![IssueTag::Structure],
            ..FeedbackAnalysis::default()
        };
        let impact = assess_impact(&propose(&analysis, &template()));
        assert_eq!(impact.overall, ImpactLevel::High);
        assert_eq!(impact.risk_level, ImpactLevel::Medium);
        assert_eq!(impact.estimated_effort, Effort::Significant);
        assert!(!impact.backward_compatible);
        assert!(impact.requires_confirmation);
    }

    #[test]
    fn two_medium_proposals_are_medium() {
        let analysis = FeedbackAnalysis {
            issues: vec![IssueTag::Length],
            affected_sections: vec![SectionTag::Conclusion],
            ..FeedbackAnalysis::default()
        };
        let impact = assess_impact(&propose(&analysis, &template()));
        assert_eq!(impact.overall, ImpactLevel::Medium);
        assert_eq!(impact.estimated_effort, Effort::Moderate);
        assert_eq!(
            impact.affected_components,
            ["conclusion", "content_adjustment", "section_improvement"]
        );
    }

    #[test]
    fn single_medium_is_low() {
        let analysis = FeedbackAnalysis {
            issues: vec![IssueTag::Length, IssueTag::Clarity],
            ..FeedbackAnalysis::default()
        };
        let impact = assess_impact(&propose(&analysis, &template()));
        assert_eq!(impact.overall, ImpactLevel::Low);
        assert!(impact.requires_confirmation);
    }

    #[test]
    fn empty_set_is_low() {
        let impact = assess_impact(&[]);
        assert_eq!(impact, ImpactAssessment::default());
    }
}
