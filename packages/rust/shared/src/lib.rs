//! Shared types, error model, and configuration for postcraft.
//!
//! This crate is the foundation depended on by all other postcraft crates.
//! It provides:
//! - [`PostcraftError`]: the unified error type
//! - Domain types ([`Template`], [`FeedbackEntry`], [`FeedbackAnalysis`], [`ChangeProposal`], [`Version`])
//! - Configuration ([`AppConfig`], [`AnalysisOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AnalysisConfig, AnalysisOptions, AppConfig, StorageConfig, TemplatesConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_db_path,
};
pub use error::{ErrorKind, PostcraftError, Result};
pub use types::{
    ChangeProposal, DEFAULT_FEEDBACK_SCORE, Effort, FEEDBACK_SCORE_RANGE, FeedbackAnalysis,
    FeedbackEntry, ImpactAssessment, ImpactLevel, IssueTag, Priority, ProposalKind, SectionTag,
    Sentiment, Severity, Template, TemplateSummary, Version,
};
