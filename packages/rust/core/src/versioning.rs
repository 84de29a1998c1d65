//! Version manager: the two-phase propose → confirm → apply gate.
//!
//! [`TemplateService::analyze_and_propose`] is read-only. Only
//! [`TemplateService::apply_confirmed`] writes, and each write appends one
//! history entry and bumps the patch version by exactly one.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument, warn};

use postcraft_feedback::{apply_proposals, assess_impact, classify, propose};
use postcraft_shared::{
    ChangeProposal, FeedbackAnalysis, FeedbackEntry, ImpactAssessment, PostcraftError, Result,
    Version,
};
use postcraft_storage::TemplateRepository;

use crate::templates::TemplateService;

/// Read-only result of analyzing feedback against a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalSet {
    pub template_id: String,
    pub current_version: Version,
    pub analysis: FeedbackAnalysis,
    pub proposals: Vec<ChangeProposal>,
    pub impact: ImpactAssessment,
}

/// What a confirmed application did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// No proposal fired; nothing was written.
    NoChange { analysis: FeedbackAnalysis },
    /// The template was patched and persisted under a new version.
    Applied {
        previous_version: Version,
        new_version: Version,
        entry: FeedbackEntry,
    },
}

fn require_feedback(feedback: &str) -> Result<&str> {
    let trimmed = feedback.trim();
    if trimmed.is_empty() {
        return Err(PostcraftError::MissingFeedback);
    }
    Ok(trimmed)
}

impl<R: TemplateRepository> TemplateService<R> {
    /// Classify feedback and propose changes without touching the template.
    #[instrument(skip(self, feedback))]
    pub async fn analyze_and_propose(&self, id: &str, feedback: &str) -> Result<ProposalSet> {
        let feedback = require_feedback(feedback)?;
        let template = self.load(id).await?;

        let analysis = classify(feedback);
        let proposals = propose(&analysis, &template);
        let impact = assess_impact(&proposals);

        tracing::debug!(
            issues = analysis.issues.len(),
            proposals = proposals.len(),
            "feedback analyzed"
        );

        Ok(ProposalSet {
            template_id: template.id,
            current_version: template.version,
            analysis,
            proposals,
            impact,
        })
    }

    /// Apply confirmed changes and persist the new version.
    ///
    /// `proposals` may carry a list computed earlier by
    /// [`analyze_and_propose`](Self::analyze_and_propose); `None` re-derives
    /// it from the feedback. An empty list is a no-op. On any persistence
    /// failure nothing is written and the stored version stays as it was.
    #[instrument(skip(self, feedback, proposals))]
    pub async fn apply_confirmed(
        &self,
        id: &str,
        feedback: &str,
        proposals: Option<Vec<ChangeProposal>>,
    ) -> Result<ApplyOutcome> {
        let feedback = require_feedback(feedback)?;

        let _guard = self.locks.lock(id).await;
        let mut template = self.load(id).await?;

        let analysis = classify(feedback);
        let proposals = proposals.unwrap_or_else(|| propose(&analysis, &template));
        if proposals.is_empty() {
            info!(id, "no changes proposed, template left as is");
            return Ok(ApplyOutcome::NoChange { analysis });
        }

        let previous_version = template.version;
        let new_version = previous_version.bump_patch();
        let patches = apply_proposals(&mut template, &proposals);

        let now = Utc::now();
        let entry = FeedbackEntry {
            timestamp: now,
            feedback: feedback.to_string(),
            analysis,
            changes_applied: proposals,
            patches,
            version: new_version,
        };
        template.feedback_history.push(entry.clone());
        template.version = new_version;
        template.updated_at = now;

        if let Err(e) = self
            .repository()
            .compare_and_swap(&template, previous_version)
            .await
        {
            warn!(id, error = %e, "confirmed update not persisted");
            return Err(e);
        }

        info!(
            id,
            from = %previous_version,
            to = %new_version,
            patches = entry.patches.len(),
            "feedback applied"
        );
        Ok(ApplyOutcome::Applied {
            previous_version,
            new_version,
            entry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postcraft_shared::{IssueTag, ProposalKind};
    use postcraft_storage::MemoryRepository;

    use crate::NewTemplate;

    async fn service_with(content: &str) -> (TemplateService<MemoryRepository>, String) {
        let svc = TemplateService::new(MemoryRepository::new());
        let t = svc
            .create(NewTemplate {
                name: "Post".into(),
                content: content.into(),
                ..NewTemplate::default()
            })
            .await
            .expect("create");
        (svc, t.id)
    }

    #[tokio::test]
    async fn propose_is_read_only() {
        let (svc, id) = service_with("# {title}\n{main_content}").await;
        let before = svc.load(&id).await.unwrap();

        for _ in 0..3 {
            let set = svc
                .analyze_and_propose(&id, "this is too long and confusing")
                .await
                .unwrap();
            assert_eq!(set.analysis.issues, [IssueTag::Length, IssueTag::Clarity]);
            assert_eq!(set.proposals.len(), 2);
            assert!(set.impact.requires_confirmation);
        }

        assert_eq!(svc.load(&id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn empty_feedback_is_rejected() {
        let (svc, id) = service_with("# {title}\n{main_content}").await;
        for feedback in ["", "   "] {
            let err = svc.analyze_and_propose(&id, feedback).await.unwrap_err();
            assert!(matches!(err, PostcraftError::MissingFeedback));
            assert_eq!(err.status(), "error");
            let err = svc.apply_confirmed(&id, feedback, None).await.unwrap_err();
            assert!(matches!(err, PostcraftError::MissingFeedback));
        }
        let t = svc.load(&id).await.unwrap();
        assert_eq!(t.version, Version::INITIAL);
        assert!(t.feedback_history.is_empty());
    }

    #[tokio::test]
    async fn no_proposals_is_no_change() {
        let (svc, id) = service_with("# {title}\n{main_content}").await;
        let outcome = svc.apply_confirmed(&id, "great, love it", None).await.unwrap();
        assert!(matches!(outcome, ApplyOutcome::NoChange { .. }));

        let outcome = svc
            .apply_confirmed(&id, "too long", Some(Vec::new()))
            .await
            .unwrap();
        assert!(matches!(outcome, ApplyOutcome::NoChange { .. }));
        assert_eq!(svc.load(&id).await.unwrap().version, Version::INITIAL);
    }

    #[tokio::test]
    async fn accepts_precomputed_proposals() {
        let (svc, id) = service_with("# {title}\n{main_content}").await;
        let set = svc
            .analyze_and_propose(&id, "this is too long and confusing")
            .await
            .unwrap();
        let clarity_only: Vec<ChangeProposal> = set
            .proposals
            .into_iter()
            .filter(|p| p.kind == ProposalKind::ClarityImprovement)
            .collect();

        let outcome = svc
            .apply_confirmed(&id, "this is too long and confusing", Some(clarity_only))
            .await
            .unwrap();
        let ApplyOutcome::Applied { entry, .. } = outcome else {
            panic!("expected applied outcome");
        };
        assert_eq!(entry.patches, ["Added clarity guidelines"]);

        let t = svc.load(&id).await.unwrap();
        assert!(t.content.contains("## Writing Guidelines"));
        assert!(!t.content.contains("Target length"));
    }

    #[tokio::test]
    async fn unknown_template() {
        let svc = TemplateService::new(MemoryRepository::new());
        let err = svc.analyze_and_propose("nope", "too long").await.unwrap_err();
        assert_eq!(err.status(), "not_found");
        let err = svc.apply_confirmed("nope", "too long", None).await.unwrap_err();
        assert_eq!(err.status(), "not_found");
    }

    #[tokio::test]
    async fn outcome_serializes_with_status() {
        let (svc, id) = service_with("# {title}\n{main_content}").await;
        let outcome = svc.apply_confirmed(&id, "too long", None).await.unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "applied");
        assert_eq!(json["new_version"], "1.0.1");
    }
}
