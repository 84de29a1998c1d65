//! Template persistence.
//!
//! [`TemplateRepository`] is the keyed-record interface the template service
//! writes through. Two backends ship here:
//! - [`MemoryRepository`]: process-local map, used by tests and embedders
//! - [`SqlRepository`]: libSQL embedded database (offline, single file)
//!
//! Every write replaces a whole record in one statement, so a record is
//! either written in full or not at all. Content updates go through
//! [`TemplateRepository::compare_and_swap`], which only succeeds when the
//! stored version still matches the version the caller read.

mod memory;
mod migrations;
mod sql;

use std::future::Future;

use postcraft_shared::{Result, Template, Version};

pub use memory::MemoryRepository;
pub use sql::SqlRepository;

/// Keyed template store.
///
/// `usage_count` is owned by [`increment_usage`](Self::increment_usage):
/// `compare_and_swap` leaves the stored counter untouched so concurrent
/// renders are never lost to a slower read-modify-write.
pub trait TemplateRepository: Send + Sync {
    /// Fetch a template by id.
    fn get(&self, id: &str) -> impl Future<Output = Result<Option<Template>>> + Send;

    /// All stored templates, active or not, in no particular order.
    fn list(&self) -> impl Future<Output = Result<Vec<Template>>> + Send;

    /// Store `template` unless its id is taken. Returns `false` if it was.
    fn insert(&self, template: &Template) -> impl Future<Output = Result<bool>> + Send;

    /// Store `template`, replacing any record with the same id.
    fn upsert(&self, template: &Template) -> impl Future<Output = Result<()>> + Send;

    /// Replace the stored record only if its version equals `expected`.
    ///
    /// Fails with `NotFound` when the id is unknown and `VersionConflict`
    /// when another writer moved the version first.
    fn compare_and_swap(
        &self,
        template: &Template,
        expected: Version,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Atomically add one to the usage counter and return the new value.
    fn increment_usage(&self, id: &str) -> impl Future<Output = Result<u64>> + Send;
}
