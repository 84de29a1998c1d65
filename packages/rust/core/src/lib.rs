//! Template store, renderer and feedback-driven version manager for postcraft.
//!
//! [`TemplateService`] is the single entry point. It wraps a
//! [`TemplateRepository`](postcraft_storage::TemplateRepository) and exposes:
//! - template CRUD, listing, validation and rendering (`templates`)
//! - the propose → confirm → apply gate (`versioning`)
//!
//! Mutations of one template id are serialized through [`KeyedLocks`];
//! different ids never wait on each other.

mod defaults;
mod locks;
mod templates;
mod validation;
mod versioning;

pub use defaults::default_templates;
pub use locks::{KeyGuard, KeyedLocks};
pub use templates::{NewTemplate, TemplateService};
pub use validation::{TemplateValidation, extract_placeholders, validate};
pub use versioning::{ApplyOutcome, ProposalSet};
