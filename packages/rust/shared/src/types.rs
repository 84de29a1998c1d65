//! Core domain types for postcraft templates and feedback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PostcraftError;

/// Feedback score assigned to a template that has never been rated.
pub const DEFAULT_FEEDBACK_SCORE: f64 = 5.0;

/// Inclusive bounds for a template's feedback score.
pub const FEEDBACK_SCORE_RANGE: (f64, f64) = (0.0, 10.0);

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// Semantic template version, persisted as a `major.minor.patch` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// The version every new template starts at.
    pub const INITIAL: Version = Version {
        major: 1,
        minor: 0,
        patch: 0,
    };

    /// Next patch release.
    pub fn bump_patch(self) -> Self {
        Self {
            patch: self.patch + 1,
            ..self
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl std::str::FromStr for Version {
    type Err = PostcraftError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || PostcraftError::validation(format!("invalid version '{s}'"));
        let mut parts = s.trim().split('.');
        let mut next = || -> std::result::Result<u64, PostcraftError> {
            parts
                .next()
                .and_then(|p| p.parse::<u64>().ok())
                .ok_or_else(invalid)
        };
        let version = Self {
            major: next()?,
            minor: next()?,
            patch: next()?,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl TryFrom<String> for Version {
    type Error = PostcraftError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}

// ---------------------------------------------------------------------------
// Feedback analysis
// ---------------------------------------------------------------------------

/// Overall tone of a piece of feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// Problem categories detected in feedback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueTag {
    Length,
    Clarity,
    Structure,
    Tone,
    Content,
    Formatting,
}

impl IssueTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Clarity => "clarity",
            Self::Structure => "structure",
            Self::Tone => "tone",
            Self::Content => "content",
            Self::Formatting => "formatting",
        }
    }
}

/// Template regions a piece of feedback refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionTag {
    Title,
    Introduction,
    MainContent,
    Conclusion,
    Formatting,
}

impl SectionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Introduction => "introduction",
            Self::MainContent => "main_content",
            Self::Conclusion => "conclusion",
            Self::Formatting => "formatting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Low,
    Medium,
}

/// Result of classifying one piece of free-text feedback.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedbackAnalysis {
    pub sentiment: Sentiment,
    /// Detected issues, in fixed tag order, without duplicates.
    pub issues: Vec<IssueTag>,
    /// Mentioned template sections, in fixed tag order, without duplicates.
    pub affected_sections: Vec<SectionTag>,
    pub severity: Severity,
    #[serde(default)]
    pub positive_hits: usize,
    #[serde(default)]
    pub negative_hits: usize,
}

impl FeedbackAnalysis {
    pub fn has_issue(&self, tag: IssueTag) -> bool {
        self.issues.contains(&tag)
    }
}

// ---------------------------------------------------------------------------
// Change proposals
// ---------------------------------------------------------------------------

/// What a proposal changes in the template body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    ContentAdjustment,
    ClarityImprovement,
    StructuralImprovement,
    ToneAdjustment,
    ContentAddition,
    SectionImprovement,
}

impl ProposalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentAdjustment => "content_adjustment",
            Self::ClarityImprovement => "clarity_improvement",
            Self::StructuralImprovement => "structural_improvement",
            Self::ToneAdjustment => "tone_adjustment",
            Self::ContentAddition => "content_addition",
            Self::SectionImprovement => "section_improvement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// A typed suggestion for modifying a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeProposal {
    pub kind: ProposalKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionTag>,
    pub description: String,
    pub priority: Priority,
    pub impact: ImpactLevel,
}

impl ChangeProposal {
    /// Deduplication key: one proposal per kind and section.
    pub fn key(&self) -> (ProposalKind, Option<SectionTag>) {
        (self.kind, self.section)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effort {
    #[default]
    Minimal,
    Moderate,
    Significant,
}

/// Aggregate risk of applying a set of proposals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactAssessment {
    pub overall: ImpactLevel,
    pub risk_level: ImpactLevel,
    pub estimated_effort: Effort,
    pub backward_compatible: bool,
    /// Sections and proposal kinds touched, sorted and deduplicated.
    pub affected_components: Vec<String>,
    /// Always `true`: impact never authorizes an unconfirmed apply.
    pub requires_confirmation: bool,
}

impl Default for ImpactAssessment {
    fn default() -> Self {
        Self {
            overall: ImpactLevel::Low,
            risk_level: ImpactLevel::Low,
            estimated_effort: Effort::Minimal,
            backward_compatible: true,
            affected_components: Vec::new(),
            requires_confirmation: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// Audit record of one confirmed, feedback-driven template change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub timestamp: DateTime<Utc>,
    pub feedback: String,
    pub analysis: FeedbackAnalysis,
    pub changes_applied: Vec<ChangeProposal>,
    /// Patches that actually altered the template body.
    #[serde(default)]
    pub patches: Vec<String>,
    /// Template version produced by this change.
    #[serde(default)]
    pub version: Version,
}

/// A named, versioned text body with `{placeholder}` substitution points.
///
/// Field names form the durable storage contract. Every field except the
/// identity and body has a serde default so older records load cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub version: Version,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default = "default_feedback_score")]
    pub feedback_score: f64,
    #[serde(default)]
    pub feedback_history: Vec<FeedbackEntry>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_feedback_score() -> f64 {
    DEFAULT_FEEDBACK_SCORE
}

fn default_true() -> bool {
    true
}

impl Template {
    /// A fresh template at version 1.0.0 with no usage and a neutral score.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
        variables: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            content: content.into(),
            version: Version::INITIAL,
            variables,
            usage_count: 0,
            feedback_score: DEFAULT_FEEDBACK_SCORE,
            feedback_history: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            version: self.version,
            usage_count: self.usage_count,
            feedback_score: self.feedback_score,
            is_active: self.is_active,
            updated_at: self.updated_at,
        }
    }
}

/// Listing view of a template (no body, no history).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: Version,
    pub usage_count: u64,
    pub feedback_score: f64,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}
