//! In-memory store for tests and throwaway runs

use super::ContentStore;
use crate::auth::models::{AccountStatus, User};
use crate::auth::roles::Role;
use crate::models::{
    ActivityAction, ActivityRecord, Article, ArticleCommentCount, ArticleStatus, ArticleUpdate,
    ArticleViewCount, BadgeRecord, Comment, CommentStatus, Contribution, ContributionAction,
    ContributionStatus, UserActivityCount,
};
use anyhow::{bail, Result};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    articles: HashMap<Uuid, Article>,
    comments: HashMap<Uuid, Comment>,
    contributions: Vec<Contribution>,
    activity: Vec<ActivityRecord>,
    activity_counters: HashMap<(Uuid, ActivityAction), u64>,
    badges: HashMap<Uuid, BadgeRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    #[cfg(test)]
    fail_counts: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every count query fail until switched off again
    #[cfg(test)]
    pub(crate) fn fail_counts(&self, on: bool) {
        self.fail_counts
            .store(on, std::sync::atomic::Ordering::SeqCst);
    }

    fn check_counts(&self) -> Result<()> {
        #[cfg(test)]
        if self.fail_counts.load(std::sync::atomic::Ordering::SeqCst) {
            bail!("count query failed (injected)");
        }
        Ok(())
    }
}

fn newest_first<T: Clone>(
    items: impl Iterator<Item = T>,
    key: impl Fn(&T) -> chrono::DateTime<Utc>,
    limit: usize,
) -> Vec<T> {
    let mut out: Vec<T> = items.collect();
    out.sort_by_key(|item| std::cmp::Reverse(key(item)));
    out.truncate(limit);
    out
}

fn top_counts<K: Ord + Clone>(counts: HashMap<K, u64>, limit: usize) -> Vec<(K, u64)> {
    let mut rows: Vec<(K, u64)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows.truncate(limit);
    rows
}

#[async_trait::async_trait]
impl ContentStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let mut t = self.tables.write();
        if t.users.values().any(|u| u.email == user.email) {
            bail!("Email already registered: {}", user.email);
        }
        t.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let t = self.tables.read();
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let t = self.tables.read();
        let mut users: Vec<User> = t.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn set_user_status(&self, id: Uuid, status: AccountStatus) -> Result<bool> {
        let mut t = self.tables.write();
        Ok(match t.users.get_mut(&id) {
            Some(user) => {
                user.status = status;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> Result<bool> {
        let mut t = self.tables.write();
        Ok(match t.users.get_mut(&id) {
            Some(user) => {
                user.role = role;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let mut t = self.tables.write();
        Ok(match t.users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.write().users.remove(&id).is_some())
    }

    async fn insert_article(&self, article: &Article) -> Result<()> {
        self.tables
            .write()
            .articles
            .insert(article.id, article.clone());
        Ok(())
    }

    async fn find_article(&self, id: Uuid) -> Result<Option<Article>> {
        Ok(self.tables.read().articles.get(&id).cloned())
    }

    async fn list_articles(&self, limit: usize) -> Result<Vec<Article>> {
        let t = self.tables.read();
        Ok(newest_first(t.articles.values().cloned(), |a| a.created_at, limit))
    }

    async fn list_articles_by_status(
        &self,
        status: ArticleStatus,
        limit: usize,
    ) -> Result<Vec<Article>> {
        let t = self.tables.read();
        let matching = t.articles.values().filter(|a| a.status == status).cloned();
        Ok(newest_first(matching, |a| a.created_at, limit))
    }

    async fn update_article(&self, id: Uuid, update: &ArticleUpdate) -> Result<bool> {
        let mut t = self.tables.write();
        Ok(match t.articles.get_mut(&id) {
            Some(article) => {
                update.apply(article);
                true
            }
            None => false,
        })
    }

    async fn set_article_status(&self, id: Uuid, status: ArticleStatus) -> Result<bool> {
        let mut t = self.tables.write();
        Ok(match t.articles.get_mut(&id) {
            Some(article) => {
                article.status = status;
                article.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete_article(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.write().articles.remove(&id).is_some())
    }

    async fn count_articles_by_author(&self, author_id: Uuid) -> Result<u64> {
        self.check_counts()?;
        let t = self.tables.read();
        Ok(t.articles
            .values()
            .filter(|a| a.author_id == Some(author_id))
            .count() as u64)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.tables
            .write()
            .comments
            .insert(comment.id, comment.clone());
        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        Ok(self.tables.read().comments.get(&id).cloned())
    }

    async fn list_comments_for_article(
        &self,
        article_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Comment>> {
        let t = self.tables.read();
        let matching = t
            .comments
            .values()
            .filter(|c| c.article_id == article_id)
            .cloned();
        Ok(newest_first(matching, |c| c.created_at, limit))
    }

    async fn list_comments_by_status(
        &self,
        status: CommentStatus,
        limit: usize,
    ) -> Result<Vec<Comment>> {
        let t = self.tables.read();
        let matching = t.comments.values().filter(|c| c.status == status).cloned();
        Ok(newest_first(matching, |c| c.created_at, limit))
    }

    async fn update_comment_content(&self, id: Uuid, content: &str) -> Result<bool> {
        let mut t = self.tables.write();
        Ok(match t.comments.get_mut(&id) {
            Some(comment) => {
                comment.content = content.to_string();
                comment.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn set_comment_status(&self, id: Uuid, status: CommentStatus) -> Result<bool> {
        let mut t = self.tables.write();
        Ok(match t.comments.get_mut(&id) {
            Some(comment) => {
                comment.status = status;
                comment.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.write().comments.remove(&id).is_some())
    }

    async fn count_comments_by_user(&self, user_id: Uuid) -> Result<u64> {
        self.check_counts()?;
        let t = self.tables.read();
        Ok(t.comments.values().filter(|c| c.user_id == user_id).count() as u64)
    }

    async fn count_comments_received(&self, author_id: Uuid) -> Result<u64> {
        self.check_counts()?;
        let t = self.tables.read();
        let authored: HashSet<Uuid> = t
            .articles
            .values()
            .filter(|a| a.author_id == Some(author_id))
            .map(|a| a.id)
            .collect();
        Ok(t.comments
            .values()
            .filter(|c| authored.contains(&c.article_id))
            .count() as u64)
    }

    async fn insert_contribution(&self, contribution: &Contribution) -> Result<()> {
        self.tables.write().contributions.push(contribution.clone());
        Ok(())
    }

    async fn contributions_by_user(&self, user_id: Uuid, limit: usize) -> Result<Vec<Contribution>> {
        let t = self.tables.read();
        let matching = t
            .contributions
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned();
        Ok(newest_first(matching, |c| c.timestamp, limit))
    }

    async fn contributions_by_article(
        &self,
        article_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Contribution>> {
        let t = self.tables.read();
        let matching = t
            .contributions
            .iter()
            .filter(|c| c.article_id == article_id)
            .cloned();
        Ok(newest_first(matching, |c| c.timestamp, limit))
    }

    async fn find_contribution(&self, id: Uuid) -> Result<Option<Contribution>> {
        let t = self.tables.read();
        Ok(t.contributions.iter().find(|c| c.id == id).cloned())
    }

    async fn list_contributions_by_status(
        &self,
        status: ContributionStatus,
        limit: usize,
    ) -> Result<Vec<Contribution>> {
        let t = self.tables.read();
        let matching = t
            .contributions
            .iter()
            .filter(|c| c.action == ContributionAction::Submitted && c.status == status)
            .cloned();
        Ok(newest_first(matching, |c| c.timestamp, limit))
    }

    async fn review_contribution(&self, id: Uuid, status: ContributionStatus) -> Result<bool> {
        let mut t = self.tables.write();
        Ok(match t.contributions.iter_mut().find(|c| c.id == id) {
            Some(contribution) if contribution.is_reviewable() => {
                contribution.status = status;
                true
            }
            _ => false,
        })
    }

    async fn insert_activity(&self, record: &ActivityRecord) -> Result<()> {
        let mut t = self.tables.write();
        t.activity.push(record.clone());
        *t.activity_counters
            .entry((record.user_id, record.action))
            .or_insert(0) += 1;
        Ok(())
    }

    async fn activity_for_user(&self, user_id: Uuid, limit: usize) -> Result<Vec<ActivityRecord>> {
        let t = self.tables.read();
        let matching = t.activity.iter().filter(|a| a.user_id == user_id).cloned();
        Ok(newest_first(matching, |a| a.timestamp, limit))
    }

    async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityRecord>> {
        let t = self.tables.read();
        Ok(newest_first(t.activity.iter().cloned(), |a| a.timestamp, limit))
    }

    async fn count_activity(&self, user_id: Uuid, action: ActivityAction) -> Result<u64> {
        self.check_counts()?;
        let t = self.tables.read();
        Ok(t.activity_counters
            .get(&(user_id, action))
            .copied()
            .unwrap_or(0))
    }

    async fn upsert_badges(&self, record: &BadgeRecord) -> Result<()> {
        self.tables
            .write()
            .badges
            .insert(record.user_id, record.clone());
        Ok(())
    }

    async fn find_badges(&self, user_id: Uuid) -> Result<Option<BadgeRecord>> {
        Ok(self.tables.read().badges.get(&user_id).cloned())
    }

    async fn most_active_users(&self, limit: usize) -> Result<Vec<UserActivityCount>> {
        let t = self.tables.read();
        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        for record in &t.activity {
            *counts.entry(record.user_id).or_insert(0) += 1;
        }
        Ok(top_counts(counts, limit)
            .into_iter()
            .map(|(user_id, activity_count)| UserActivityCount {
                user_id,
                activity_count,
            })
            .collect())
    }

    async fn most_viewed_articles(&self, limit: usize) -> Result<Vec<ArticleViewCount>> {
        let t = self.tables.read();
        let mut counts: HashMap<String, u64> = HashMap::new();
        for record in &t.activity {
            if record.action != ActivityAction::ViewedArticle {
                continue;
            }
            if let Some(article_id) = record.article_ref() {
                *counts.entry(article_id).or_insert(0) += 1;
            }
        }
        Ok(top_counts(counts, limit)
            .into_iter()
            .map(|(article_id, view_count)| ArticleViewCount {
                article_id,
                view_count,
            })
            .collect())
    }

    async fn most_commented_articles(&self, limit: usize) -> Result<Vec<ArticleCommentCount>> {
        let t = self.tables.read();
        let mut counts: HashMap<Uuid, u64> = HashMap::new();
        for comment in t.comments.values() {
            *counts.entry(comment.article_id).or_insert(0) += 1;
        }
        Ok(top_counts(counts, limit)
            .into_iter()
            .map(|(article_id, comment_count)| ArticleCommentCount {
                article_id,
                comment_count,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn user(email: &str) -> User {
        User::new(email, email, "hash".into(), Role::Reader)
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@b.com")).await.unwrap();
        assert!(store.insert_user(&user("a@b.com")).await.is_err());
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_activity_counter_tracks_inserts() {
        let store = MemoryStore::new();
        let uid = Uuid::new_v4();

        for _ in 0..3 {
            store
                .insert_activity(&ActivityRecord::new(
                    uid,
                    ActivityAction::ViewedArticle,
                    Map::new(),
                ))
                .await
                .unwrap();
        }
        store
            .insert_activity(&ActivityRecord::new(uid, ActivityAction::Liked, Map::new()))
            .await
            .unwrap();

        assert_eq!(
            store
                .count_activity(uid, ActivityAction::ViewedArticle)
                .await
                .unwrap(),
            3
        );
        assert_eq!(
            store.count_activity(uid, ActivityAction::Liked).await.unwrap(),
            1
        );
        assert_eq!(
            store
                .count_activity(Uuid::new_v4(), ActivityAction::Liked)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_most_viewed_articles_groups_by_metadata() {
        let store = MemoryStore::new();
        let uid = Uuid::new_v4();

        for article in ["a", "b", "b", "c", "b", "a"] {
            let mut meta = Map::new();
            meta.insert("article_id".into(), json!(article));
            store
                .insert_activity(&ActivityRecord::new(
                    uid,
                    ActivityAction::ViewedArticle,
                    meta,
                ))
                .await
                .unwrap();
        }

        let top = store.most_viewed_articles(2).await.unwrap();
        assert_eq!(
            top,
            vec![
                ArticleViewCount {
                    article_id: "b".into(),
                    view_count: 3
                },
                ArticleViewCount {
                    article_id: "a".into(),
                    view_count: 2
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_contribution_reviewed_once() {
        let store = MemoryStore::new();
        let article = Uuid::new_v4();
        let submission = Contribution::submitted(Uuid::new_v4(), article, "Add a source");
        let history = Contribution::new(Uuid::new_v4(), article, ContributionAction::Created);
        store.insert_contribution(&submission).await.unwrap();
        store.insert_contribution(&history).await.unwrap();

        let pending = store
            .list_contributions_by_status(ContributionStatus::Pending, 10)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, submission.id);

        assert!(store
            .review_contribution(submission.id, ContributionStatus::Rejected)
            .await
            .unwrap());
        assert!(!store
            .review_contribution(submission.id, ContributionStatus::Approved)
            .await
            .unwrap());
        assert!(!store
            .review_contribution(history.id, ContributionStatus::Rejected)
            .await
            .unwrap());

        let stored = store.find_contribution(submission.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ContributionStatus::Rejected);
    }

    #[tokio::test]
    async fn test_comments_received_counts_only_own_articles() {
        let store = MemoryStore::new();
        let author = Uuid::new_v4();
        let mine = Article::new("Mine", "Body", Some(author));
        let theirs = Article::new("Theirs", "Body", Some(Uuid::new_v4()));
        store.insert_article(&mine).await.unwrap();
        store.insert_article(&theirs).await.unwrap();

        let reader = Uuid::new_v4();
        for article in [mine.id, mine.id, theirs.id] {
            store
                .insert_comment(&Comment::new(article, reader, "hi"))
                .await
                .unwrap();
        }

        assert_eq!(store.count_comments_received(author).await.unwrap(), 2);
        assert_eq!(store.count_comments_received(reader).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_rows_report_false() {
        let store = MemoryStore::new();
        let ghost = Uuid::new_v4();

        assert!(!store.delete_article(ghost).await.unwrap());
        assert!(!store.delete_comment(ghost).await.unwrap());
        assert!(!store
            .set_user_status(ghost, AccountStatus::Banned)
            .await
            .unwrap());
        assert!(!store
            .update_article(ghost, &ArticleUpdate::default())
            .await
            .unwrap());
        assert!(!store
            .review_contribution(ghost, ContributionStatus::Approved)
            .await
            .unwrap());
    }
}
