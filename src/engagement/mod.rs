//! Engagement & Badge Engine
//! Mission: Derive each user's badge set from their activity counters
//!
//! Badges are recomputed wholesale. A recomputation reads all four counters
//! first and only then replaces the stored record, so a failed read never
//! leaves a partial set behind.

pub mod analytics;

pub use analytics::{EngagementAnalytics, UserEngagement};

use crate::models::{ActivityAction, BadgeRecord};
use crate::store::ContentStore;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Minimum thresholds for one badge. Undeclared thresholds stay at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeCriterion {
    pub name: &'static str,
    pub articles_written: u64,
    pub comments_made: u64,
    pub articles_viewed: u64,
    pub comments_received: u64,
}

impl BadgeCriterion {
    const fn named(name: &'static str) -> Self {
        Self {
            name,
            articles_written: 0,
            comments_made: 0,
            articles_viewed: 0,
            comments_received: 0,
        }
    }

    const fn articles_written(mut self, n: u64) -> Self {
        self.articles_written = n;
        self
    }

    const fn comments_made(mut self, n: u64) -> Self {
        self.comments_made = n;
        self
    }

    const fn articles_viewed(mut self, n: u64) -> Self {
        self.articles_viewed = n;
        self
    }

    const fn comments_received(mut self, n: u64) -> Self {
        self.comments_received = n;
        self
    }

    /// Every threshold must be met at once
    pub fn is_met_by(&self, counts: &EngagementCounts) -> bool {
        counts.articles_written >= self.articles_written
            && counts.comments_made >= self.comments_made
            && counts.articles_viewed >= self.articles_viewed
            && counts.comments_received >= self.comments_received
    }
}

pub const BADGE_CRITERIA: [BadgeCriterion; 6] = [
    BadgeCriterion::named("Contributor").articles_written(1),
    BadgeCriterion::named("Commenter").comments_made(5),
    BadgeCriterion::named("Engaged").articles_viewed(10),
    BadgeCriterion::named("Top Contributor").articles_written(5),
    BadgeCriterion::named("Discussion Starter").comments_received(10),
    BadgeCriterion::named("Power User")
        .articles_written(5)
        .comments_made(50)
        .articles_viewed(100),
];

/// Counters a badge decision is made from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngagementCounts {
    pub articles_written: u64,
    pub comments_made: u64,
    pub articles_viewed: u64,
    pub comments_received: u64,
}

/// Badge names earned by `counts`, in criteria order
pub fn evaluate_badges(counts: &EngagementCounts) -> Vec<String> {
    BADGE_CRITERIA
        .iter()
        .filter(|criterion| criterion.is_met_by(counts))
        .map(|criterion| criterion.name.to_string())
        .collect()
}

/// Recomputes and stores badge sets
#[derive(Clone)]
pub struct BadgeEngine {
    store: Arc<dyn ContentStore>,
}

impl BadgeEngine {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn gather_counts(&self, user_id: Uuid) -> Result<EngagementCounts> {
        let store = &self.store;

        let (articles_written, comments_made, articles_viewed, comments_received) = tokio::try_join!(
            store.count_articles_by_author(user_id),
            store.count_comments_by_user(user_id),
            store.count_activity(user_id, ActivityAction::ViewedArticle),
            store.count_comments_received(user_id),
        )?;

        Ok(EngagementCounts {
            articles_written,
            comments_made,
            articles_viewed,
            comments_received,
        })
    }

    /// Recompute the user's badges and replace the stored set
    pub async fn assign_badges(&self, user_id: Uuid) -> Result<Vec<String>> {
        let counts = self
            .gather_counts(user_id)
            .await
            .with_context(|| format!("Failed to gather engagement counts for {}", user_id))?;
        let badges = evaluate_badges(&counts);

        self.store
            .upsert_badges(&BadgeRecord {
                user_id,
                badges: badges.clone(),
                updated_at: Utc::now(),
            })
            .await?;

        info!("🏅 Badges for {}: {:?}", user_id, badges);
        Ok(badges)
    }

    /// Stored badges, empty if never computed
    pub async fn user_badges(&self, user_id: Uuid) -> Result<Vec<String>> {
        Ok(self
            .store
            .find_badges(user_id)
            .await?
            .map(|record| record.badges)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityRecord, Article, Comment};
    use crate::store::MemoryStore;
    use serde_json::{json, Map};

    const ALL_BADGES: [&str; 6] = [
        "Contributor",
        "Commenter",
        "Engaged",
        "Top Contributor",
        "Discussion Starter",
        "Power User",
    ];

    #[test]
    fn test_all_thresholds_met_grants_every_badge() {
        let counts = EngagementCounts {
            articles_written: 5,
            comments_made: 50,
            articles_viewed: 100,
            comments_received: 10,
        };
        assert_eq!(evaluate_badges(&counts), ALL_BADGES);
    }

    #[test]
    fn test_zero_counts_grant_nothing() {
        assert!(evaluate_badges(&EngagementCounts::default()).is_empty());
    }

    #[test]
    fn test_power_user_needs_every_threshold() {
        let almost = EngagementCounts {
            articles_written: 5,
            comments_made: 50,
            articles_viewed: 99,
            comments_received: 0,
        };
        let badges = evaluate_badges(&almost);
        assert!(!badges.contains(&"Power User".to_string()));
        assert!(badges.contains(&"Top Contributor".to_string()));
        assert!(badges.contains(&"Engaged".to_string()));
    }

    async fn seed_active_user(store: &MemoryStore, user: Uuid) {
        let other = Uuid::new_v4();
        let mut own_articles = Vec::new();
        for i in 0..5 {
            let article = Article::new(&format!("Article {}", i), "Body", Some(user));
            store.insert_article(&article).await.unwrap();
            own_articles.push(article.id);
        }

        let elsewhere = Article::new("Someone else's", "Body", Some(other));
        store.insert_article(&elsewhere).await.unwrap();

        for i in 0..10 {
            store
                .insert_comment(&Comment::new(own_articles[i % 5], other, "great"))
                .await
                .unwrap();
        }
        for _ in 0..50 {
            store
                .insert_comment(&Comment::new(elsewhere.id, user, "reply"))
                .await
                .unwrap();
        }
        for i in 0..100 {
            let mut meta = Map::new();
            meta.insert("article_id".into(), json!(format!("a{}", i % 7)));
            store
                .insert_activity(&ActivityRecord::new(
                    user,
                    ActivityAction::ViewedArticle,
                    meta,
                ))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_gather_counts_from_store() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        seed_active_user(&store, user).await;

        let engine = BadgeEngine::new(store);
        let counts = engine.gather_counts(user).await.unwrap();
        assert_eq!(
            counts,
            EngagementCounts {
                articles_written: 5,
                comments_made: 50,
                articles_viewed: 100,
                comments_received: 10,
            }
        );
    }

    #[tokio::test]
    async fn test_assign_badges_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        seed_active_user(&store, user).await;
        let engine = BadgeEngine::new(store.clone());

        let first = engine.assign_badges(user).await.unwrap();
        let second = engine.assign_badges(user).await.unwrap();
        assert_eq!(first, ALL_BADGES);
        assert_eq!(first, second);
        assert_eq!(engine.user_badges(user).await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_badges_no_longer_met_are_dropped() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let article = Article::new("Only one", "Body", Some(user));
        store.insert_article(&article).await.unwrap();

        let engine = BadgeEngine::new(store.clone());
        assert_eq!(engine.assign_badges(user).await.unwrap(), ["Contributor"]);

        store.delete_article(article.id).await.unwrap();
        assert!(engine.assign_badges(user).await.unwrap().is_empty());
        assert!(engine.user_badges(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_read_leaves_stored_badges_untouched() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        store
            .insert_article(&Article::new("Mine", "Body", Some(user)))
            .await
            .unwrap();

        let engine = BadgeEngine::new(store.clone());
        engine.assign_badges(user).await.unwrap();
        let before = store.find_badges(user).await.unwrap().unwrap();

        store
            .insert_article(&Article::new("Another", "Body", Some(user)))
            .await
            .unwrap();
        store.fail_counts(true);
        assert!(engine.assign_badges(user).await.is_err());
        store.fail_counts(false);

        let after = store.find_badges(user).await.unwrap().unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_badges() {
        let engine = BadgeEngine::new(Arc::new(MemoryStore::new()));
        assert!(engine.user_badges(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
