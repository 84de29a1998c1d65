use std::collections::HashMap;

use tokio::sync::RwLock;

use postcraft_shared::{PostcraftError, Result, Template, Version};

use crate::TemplateRepository;

/// In-process template store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    templates: RwLock<HashMap<String, Template>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateRepository for MemoryRepository {
    async fn get(&self, id: &str) -> Result<Option<Template>> {
        Ok(self.templates.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Template>> {
        Ok(self.templates.read().await.values().cloned().collect())
    }

    async fn insert(&self, template: &Template) -> Result<bool> {
        let mut map = self.templates.write().await;
        if map.contains_key(&template.id) {
            return Ok(false);
        }
        map.insert(template.id.clone(), template.clone());
        Ok(true)
    }

    async fn upsert(&self, template: &Template) -> Result<()> {
        self.templates
            .write()
            .await
            .insert(template.id.clone(), template.clone());
        Ok(())
    }

    async fn compare_and_swap(&self, template: &Template, expected: Version) -> Result<()> {
        let mut map = self.templates.write().await;
        let stored = map
            .get_mut(&template.id)
            .ok_or_else(|| PostcraftError::not_found(&template.id))?;

        if stored.version != expected {
            return Err(PostcraftError::VersionConflict {
                id: template.id.clone(),
                expected,
            });
        }

        let usage_count = stored.usage_count;
        *stored = Template {
            usage_count,
            ..template.clone()
        };
        Ok(())
    }

    async fn increment_usage(&self, id: &str) -> Result<u64> {
        let mut map = self.templates.write().await;
        let stored = map.get_mut(id).ok_or_else(|| PostcraftError::not_found(id))?;
        stored.usage_count += 1;
        Ok(stored.usage_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str) -> Template {
        Template::new(id, "Sample", "", "# {title}", vec!["title".into()])
    }

    #[tokio::test]
    async fn insert_does_not_overwrite() {
        let repo = MemoryRepository::new();
        assert!(repo.insert(&sample("a")).await.unwrap());

        let mut other = sample("a");
        other.name = "Other".into();
        assert!(!repo.insert(&other).await.unwrap());
        assert_eq!(repo.get("a").await.unwrap().unwrap().name, "Sample");
    }

    #[tokio::test]
    async fn cas_rejects_stale_version() {
        let repo = MemoryRepository::new();
        let mut t = sample("a");
        repo.insert(&t).await.unwrap();

        t.version = t.version.bump_patch();
        repo.compare_and_swap(&t, Version::INITIAL).await.unwrap();

        let err = repo
            .compare_and_swap(&t, Version::INITIAL)
            .await
            .unwrap_err();
        assert!(matches!(err, PostcraftError::VersionConflict { .. }));
        assert_eq!(
            repo.get("a").await.unwrap().unwrap().version.to_string(),
            "1.0.1"
        );
    }

    #[tokio::test]
    async fn cas_keeps_usage_count() {
        let repo = MemoryRepository::new();
        let t = sample("a");
        repo.insert(&t).await.unwrap();
        repo.increment_usage("a").await.unwrap();
        repo.increment_usage("a").await.unwrap();

        // t still carries usage_count 0 from before the renders
        repo.compare_and_swap(&t, Version::INITIAL).await.unwrap();
        assert_eq!(repo.get("a").await.unwrap().unwrap().usage_count, 2);
    }

    #[tokio::test]
    async fn missing_ids() {
        let repo = MemoryRepository::new();
        assert!(repo.get("nope").await.unwrap().is_none());
        assert!(matches!(
            repo.increment_usage("nope").await,
            Err(PostcraftError::NotFound { .. })
        ));
        assert!(matches!(
            repo.compare_and_swap(&sample("nope"), Version::INITIAL).await,
            Err(PostcraftError::NotFound { .. })
        ));
    }
}
