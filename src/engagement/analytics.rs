//! Engagement analytics: leaderboards over activity and comments

use crate::models::{ArticleCommentCount, ArticleViewCount, UserActivityCount};
use crate::store::ContentStore;
use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_LEADERBOARD_SIZE: usize = 5;
pub const MAX_LEADERBOARD_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserEngagement {
    pub user_id: Uuid,
    pub articles_written: u64,
    pub comments_made: u64,
}

fn clamp_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_LEADERBOARD_SIZE)
        .clamp(1, MAX_LEADERBOARD_SIZE)
}

#[derive(Clone)]
pub struct EngagementAnalytics {
    store: Arc<dyn ContentStore>,
}

impl EngagementAnalytics {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn top_users(&self, limit: Option<usize>) -> Result<Vec<UserActivityCount>> {
        self.store.most_active_users(clamp_limit(limit)).await
    }

    pub async fn top_articles(&self, limit: Option<usize>) -> Result<Vec<ArticleViewCount>> {
        self.store.most_viewed_articles(clamp_limit(limit)).await
    }

    pub async fn most_commented(&self, limit: Option<usize>) -> Result<Vec<ArticleCommentCount>> {
        self.store.most_commented_articles(clamp_limit(limit)).await
    }

    pub async fn user_engagement(&self, user_id: Uuid) -> Result<UserEngagement> {
        let (articles_written, comments_made) = tokio::try_join!(
            self.store.count_articles_by_author(user_id),
            self.store.count_comments_by_user(user_id),
        )?;

        Ok(UserEngagement {
            user_id,
            articles_written,
            comments_made,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityAction, ActivityRecord, Article, Comment};
    use crate::store::MemoryStore;
    use serde_json::Map;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_LEADERBOARD_SIZE);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LEADERBOARD_SIZE);
        assert_eq!(clamp_limit(Some(7)), 7);
    }

    #[tokio::test]
    async fn test_leaderboards() {
        let store = Arc::new(MemoryStore::new());
        let busy = Uuid::new_v4();
        let quiet = Uuid::new_v4();

        for _ in 0..4 {
            store
                .insert_activity(&ActivityRecord::new(busy, ActivityAction::Liked, Map::new()))
                .await
                .unwrap();
        }
        store
            .insert_activity(&ActivityRecord::new(quiet, ActivityAction::Shared, Map::new()))
            .await
            .unwrap();

        let hot = Article::new("Hot", "Body", Some(busy));
        let cold = Article::new("Cold", "Body", Some(busy));
        store.insert_article(&hot).await.unwrap();
        store.insert_article(&cold).await.unwrap();
        for _ in 0..3 {
            store
                .insert_comment(&Comment::new(hot.id, quiet, "!"))
                .await
                .unwrap();
        }
        store
            .insert_comment(&Comment::new(cold.id, quiet, "?"))
            .await
            .unwrap();

        let analytics = EngagementAnalytics::new(store);

        let users = analytics.top_users(None).await.unwrap();
        assert_eq!(users[0].user_id, busy);
        assert_eq!(users[0].activity_count, 4);
        assert_eq!(users.len(), 2);

        let commented = analytics.most_commented(Some(1)).await.unwrap();
        assert_eq!(commented.len(), 1);
        assert_eq!(commented[0].article_id, hot.id);
        assert_eq!(commented[0].comment_count, 3);

        let engagement = analytics.user_engagement(busy).await.unwrap();
        assert_eq!(engagement.articles_written, 2);
        assert_eq!(engagement.comments_made, 0);

        let engagement = analytics.user_engagement(quiet).await.unwrap();
        assert_eq!(engagement.comments_made, 4);
    }
}
