//! Feedback analysis and template change proposals.
//!
//! Three pure stages, all synchronous and free of shared state:
//! - [`classify`] turns free-text feedback into a [`FeedbackAnalysis`](postcraft_shared::FeedbackAnalysis)
//! - [`propose`] / [`assess_impact`] map an analysis to typed proposals
//! - [`apply_proposals`] patches a template body in place
//!
//! Persisting the patched template is the caller's job.

mod classify;
mod patch;
mod propose;

pub use classify::classify;
pub use patch::apply_proposals;
pub use propose::{assess_impact, propose};
