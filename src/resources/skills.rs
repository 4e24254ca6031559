use super::parse_count;
use crate::Client;
use crate::cache::Cache;
use crate::errors::PfolioError;
use crate::fanout::settle_all;
use crate::http::common::Endpoint;
use crate::models::{ABOUT_SKILL_CATEGORIES, PUBLIC_SKILL_CATEGORIES, Skill, SkillsByCategory};
use crate::request::ApiRequest;
use tracing::{debug, warn};

/// Cache key for the about-page skill summary.
pub const ABOUT_SKILLS_CACHE_KEY: &str = "skills_cache";

fn require_name(name: &str) -> Result<(), PfolioError> {
    if name.trim().is_empty() {
        Err(PfolioError::InvalidInput("Skill name is required".to_string()))
    } else {
        Ok(())
    }
}

impl Client {
    /// Lists every skill.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn list_skills(&self) -> Result<Vec<Skill>, PfolioError> {
        self.fetch(ApiRequest::get(Endpoint::SkillsAll.to_path()))
            .await
    }

    /// Lists the skills in `category`, failing fast on a slow backend.
    ///
    /// An empty response is treated as an empty list.
    ///
    /// # Errors
    ///
    /// See [`Client::send`].
    pub async fn skills_by_category(&self, category: &str) -> Result<Vec<Skill>, PfolioError> {
        let request = ApiRequest::get(Endpoint::SkillsByCategory { category }.to_path())
            .timeout(self.config.timeouts.quick)
            .header("Cache-Control", "no-cache");
        let payload = self.send(request).await?;
        if payload.is_empty() {
            return Ok(Vec::new());
        }
        payload.into_json(&format!("skills in category '{category}'"))
    }

    /// # Errors
    ///
    /// See [`Client::send`]; a non-numeric body is [`PfolioError::Parse`].
    pub async fn count_skills(&self) -> Result<u64, PfolioError> {
        let request = ApiRequest::get(Endpoint::SkillsCount.to_path())
            .timeout(self.config.timeouts.extended);
        parse_count(&self.fetch_text(request).await?, "skill")
    }

    /// Adds a skill and returns the backend's confirmation text.
    ///
    /// # Errors
    ///
    /// Returns [`PfolioError::InvalidInput`] for a blank name or category,
    /// otherwise see [`Client::send`].
    pub async fn add_skill(&self, skill: &Skill) -> Result<String, PfolioError> {
        skill.validate()?;
        let request = ApiRequest::post(Endpoint::SkillAdd.to_path()).json_body(skill)?;
        self.fetch_text(request).await
    }

    /// Replaces the skill currently named `name`.
    ///
    /// # Errors
    ///
    /// A missing skill is reported by the backend as a 404.
    pub async fn update_skill(&self, name: &str, skill: &Skill) -> Result<String, PfolioError> {
        require_name(name)?;
        skill.validate()?;
        let request = ApiRequest::put(Endpoint::SkillUpdate { name }.to_path()).json_body(skill)?;
        self.fetch_text(request).await
    }

    /// # Errors
    ///
    /// A missing skill is reported by the backend as a 404.
    pub async fn delete_skill(&self, name: &str) -> Result<String, PfolioError> {
        require_name(name)?;
        self.fetch_text(ApiRequest::delete(Endpoint::SkillDelete { name }.to_path()))
            .await
    }

    /// Fetches several categories concurrently.
    ///
    /// A category that fails to load maps to an empty list; the failure is
    /// logged and never fails the whole call.
    pub async fn skills_for_categories(&self, categories: &[&str]) -> SkillsByCategory {
        let tasks: Vec<_> = categories
            .iter()
            .map(|&category| (category.to_string(), self.skills_by_category(category)))
            .collect();

        settle_all(tasks)
            .await
            .into_iter()
            .map(|(category, result)| {
                let skills = result.unwrap_or_else(|e| {
                    warn!("Failed to load {category} skills: {e}");
                    Vec::new()
                });
                (category, skills)
            })
            .collect()
    }

    /// Skills for the public skills page, one entry per
    /// [`PUBLIC_SKILL_CATEGORIES`] category.
    ///
    /// Every category is present in the result; one that fails to load is
    /// empty.
    pub async fn public_skills(&self) -> SkillsByCategory {
        self.skills_for_categories(&PUBLIC_SKILL_CATEGORIES).await
    }

    /// Skills for the about page, served from `cache` while fresh.
    ///
    /// A stale or missing entry triggers a fan-out over
    /// [`ABOUT_SKILL_CATEGORIES`] whose result replaces the cached value.
    pub async fn about_skills(&self, cache: &dyn Cache) -> SkillsByCategory {
        if let Some(cached) = cache.get(ABOUT_SKILLS_CACHE_KEY).await
            && cached.is_fresh
        {
            match serde_json::from_value(cached.value) {
                Ok(skills) => {
                    debug!("Serving about skills from cache");
                    return skills;
                }
                Err(e) => warn!("Discarding unreadable skills cache: {e}"),
            }
        }

        let skills = self.skills_for_categories(&ABOUT_SKILL_CATEGORIES).await;
        match serde_json::to_value(&skills) {
            Ok(value) => cache.set(ABOUT_SKILLS_CACHE_KEY, value).await,
            Err(e) => warn!("Failed to cache about skills: {e}"),
        }
        skills
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blank_skill_name_rejected_without_io() {
        let client = Client::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(
            client.delete_skill("  ").await,
            Err(PfolioError::InvalidInput(_))
        ));
        assert!(matches!(
            client.update_skill("", &Skill::new("Rust", "Languages")).await,
            Err(PfolioError::InvalidInput(_))
        ));
        assert!(matches!(
            client.add_skill(&Skill::new("Rust", "")).await,
            Err(PfolioError::InvalidInput(_))
        ));
    }
}
