//! Template store and renderer.
//!
//! [`TemplateService`] owns a [`TemplateRepository`] plus the per-template
//! locks that serialize read-modify-write cycles. All mutations of a given
//! template id run under its lock and are persisted with a compare-and-swap
//! on the version read at the start of the cycle.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use postcraft_shared::{
    FEEDBACK_SCORE_RANGE, PostcraftError, Result, Template, TemplateSummary,
};
use postcraft_storage::TemplateRepository;

use crate::defaults::default_templates;
use crate::locks::KeyedLocks;
use crate::validation::{PLACEHOLDER_RE, extract_placeholders, validate};

/// Length of generated template ids.
const ID_LENGTH: usize = 8;
/// Attempts at drawing an unused id before giving up.
const ID_ATTEMPTS: usize = 5;

/// Fields accepted by [`TemplateService::create`].
#[derive(Debug, Clone, Default)]
pub struct NewTemplate {
    pub name: String,
    pub description: String,
    pub content: String,
    /// Explicit variable list. `None` derives it from the content.
    pub variables: Option<Vec<String>>,
}

/// Template operations over a repository.
pub struct TemplateService<R> {
    repo: R,
    pub(crate) locks: KeyedLocks,
}

impl<R: TemplateRepository> TemplateService<R> {
    /// Wrap a repository without seeding anything.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            locks: KeyedLocks::new(),
        }
    }

    /// Wrap a repository, optionally seeding the built-in templates.
    pub async fn open(repo: R, seed_defaults: bool) -> Result<Self> {
        let service = Self::new(repo);
        if seed_defaults {
            service.seed_defaults().await?;
        }
        Ok(service)
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Insert each built-in template whose id is not taken yet.
    ///
    /// Existing records are never overwritten. Returns how many were added.
    pub async fn seed_defaults(&self) -> Result<usize> {
        let mut seeded = 0;
        for template in default_templates() {
            if self.repo.insert(&template).await? {
                info!(id = %template.id, "seeded built-in template");
                seeded += 1;
            }
        }
        Ok(seeded)
    }

    /// Create a template at version 1.0.0 under a fresh id.
    ///
    /// Invalid content (empty, unbalanced braces) is rejected before anything
    /// is written.
    #[instrument(skip_all, fields(name = %new.name))]
    pub async fn create(&self, new: NewTemplate) -> Result<Template> {
        if new.name.trim().is_empty() {
            return Err(PostcraftError::validation("template name is empty"));
        }

        let report = validate(&new.content, new.variables.as_deref());
        if !report.is_valid {
            return Err(PostcraftError::validation(report.issues.join("; ")));
        }

        let variables = new
            .variables
            .unwrap_or_else(|| extract_placeholders(&new.content));

        for _ in 0..ID_ATTEMPTS {
            let id: String = Uuid::new_v4().simple().to_string()[..ID_LENGTH].to_string();
            let template = Template::new(
                id,
                new.name.trim(),
                new.description.trim(),
                new.content.as_str(),
                variables.clone(),
            );
            if self.repo.insert(&template).await? {
                info!(id = %template.id, variables = template.variables.len(), "template created");
                return Ok(template);
            }
            warn!(id = %template.id, "generated template id already taken, retrying");
        }

        Err(PostcraftError::Storage(
            "could not allocate an unused template id".into(),
        ))
    }

    /// Fetch a template or fail with `NotFound`.
    pub async fn load(&self, id: &str) -> Result<Template> {
        match self.repo.get(id).await? {
            Some(template) => Ok(template),
            None => {
                warn!(id, "template not found");
                Err(PostcraftError::not_found(id))
            }
        }
    }

    /// Write back editable metadata, stamping `updated_at`.
    ///
    /// Only `name`, `description`, `variables` and `is_active` are taken from
    /// `template`. Version, history, usage, score and content stay as stored:
    /// a record read at an older version fails with `VersionConflict`, and a
    /// content change fails with `Validation` since content only moves
    /// through confirmed feedback. Missing fields were already backfilled by
    /// serde defaults when the record was read.
    #[instrument(skip_all, fields(id = %template.id))]
    pub async fn save(&self, template: Template) -> Result<Template> {
        let report = validate(&template.content, Some(template.variables.as_slice()));
        if !report.is_valid {
            return Err(PostcraftError::validation(report.issues.join("; ")));
        }
        if template.name.trim().is_empty() {
            return Err(PostcraftError::validation("template name is empty"));
        }

        let _guard = self.locks.lock(&template.id).await;
        let stored = self.load(&template.id).await?;

        if template.version != stored.version {
            warn!(read = %template.version, stored = %stored.version, "stale record not saved");
            return Err(PostcraftError::VersionConflict {
                id: stored.id,
                expected: template.version,
            });
        }
        if template.content != stored.content {
            return Err(PostcraftError::validation(
                "template content changes only through confirmed feedback",
            ));
        }

        let expected = stored.version;
        let merged = Template {
            name: template.name.trim().to_string(),
            description: template.description.trim().to_string(),
            variables: template.variables,
            is_active: template.is_active,
            updated_at: Utc::now(),
            ..stored
        };
        self.repo.compare_and_swap(&merged, expected).await?;
        info!("template metadata saved");
        Ok(merged)
    }

    /// Summaries of every template, most used first.
    ///
    /// Order: usage count descending, feedback score descending, then name
    /// and id ascending so equal templates always list the same way.
    pub async fn list(&self) -> Result<Vec<TemplateSummary>> {
        let mut templates = self.repo.list().await?;
        templates.sort_by(|a, b| {
            b.usage_count
                .cmp(&a.usage_count)
                .then_with(|| b.feedback_score.total_cmp(&a.feedback_score))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(templates.iter().map(Template::summary).collect())
    }

    /// Substitute bound placeholders and count the use.
    ///
    /// Placeholders without a binding stay verbatim. Substitution is a single
    /// pass, so values that themselves contain `{name}` are not expanded.
    #[instrument(skip(self, variables), fields(bound = variables.len()))]
    pub async fn render(&self, id: &str, variables: &HashMap<String, String>) -> Result<String> {
        let template = self.load(id).await?;

        let rendered = PLACEHOLDER_RE.replace_all(&template.content, |caps: &regex::Captures| {
            variables
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        });

        let usage = self.repo.increment_usage(id).await?;
        tracing::debug!(usage, "template rendered");
        Ok(rendered.into_owned())
    }

    /// Fold a rating into the running weighted average.
    ///
    /// The rating is clamped into the allowed range first; the result is
    /// rounded to two decimals, so a first rating of 7.333 is stored as
    /// 7.33. Returns the new score.
    #[instrument(skip(self))]
    pub async fn update_feedback_score(&self, id: &str, score: f64) -> Result<f64> {
        if !score.is_finite() {
            return Err(PostcraftError::validation(format!(
                "feedback score must be a number, got {score}"
            )));
        }
        let (lo, hi) = FEEDBACK_SCORE_RANGE;
        let score = score.clamp(lo, hi);

        let _guard = self.locks.lock(id).await;
        let mut template = self.load(id).await?;

        let usage = template.usage_count as f64;
        let averaged = (template.feedback_score * usage + score) / (usage + 1.0);
        template.feedback_score = ((averaged * 100.0).round() / 100.0).clamp(lo, hi);
        template.updated_at = Utc::now();

        self.repo
            .compare_and_swap(&template, template.version)
            .await?;
        info!(id, score = template.feedback_score, "feedback score updated");
        Ok(template.feedback_score)
    }

    /// Activate or deactivate a template. Templates are never deleted.
    pub async fn set_active(&self, id: &str, active: bool) -> Result<Template> {
        let _guard = self.locks.lock(id).await;
        let mut template = self.load(id).await?;
        if template.is_active == active {
            return Ok(template);
        }

        template.is_active = active;
        template.updated_at = Utc::now();
        self.repo
            .compare_and_swap(&template, template.version)
            .await?;
        info!(id, active, "template activation changed");
        Ok(template)
    }
}
