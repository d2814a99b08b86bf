//! Document Storage
//! Mission: One async seam over users, articles, comments, contributions,
//! activity and badges, with an in-memory and a SQLite backend

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::auth::models::{AccountStatus, User};
use crate::auth::roles::Role;
use crate::models::{
    ActivityAction, ActivityRecord, Article, ArticleCommentCount, ArticleStatus, ArticleUpdate,
    ArticleViewCount, BadgeRecord, Comment, CommentStatus, Contribution, ContributionStatus,
    UserActivityCount,
};
use anyhow::Result;
use uuid::Uuid;

/// Default page size for list queries
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Storage collaborator.
///
/// Mutations that target a single row return whether a row was changed.
/// Lists are newest first.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    // ----- users -----
    /// Fails if the email is already registered
    async fn insert_user(&self, user: &User) -> Result<()>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn set_user_status(&self, id: Uuid, status: AccountStatus) -> Result<bool>;
    async fn set_user_role(&self, id: Uuid, role: Role) -> Result<bool>;
    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool>;
    async fn delete_user(&self, id: Uuid) -> Result<bool>;

    // ----- articles -----
    async fn insert_article(&self, article: &Article) -> Result<()>;
    async fn find_article(&self, id: Uuid) -> Result<Option<Article>>;
    async fn list_articles(&self, limit: usize) -> Result<Vec<Article>>;
    async fn list_articles_by_status(&self, status: ArticleStatus, limit: usize)
        -> Result<Vec<Article>>;
    async fn update_article(&self, id: Uuid, update: &ArticleUpdate) -> Result<bool>;
    async fn set_article_status(&self, id: Uuid, status: ArticleStatus) -> Result<bool>;
    async fn delete_article(&self, id: Uuid) -> Result<bool>;
    async fn count_articles_by_author(&self, author_id: Uuid) -> Result<u64>;

    // ----- comments -----
    async fn insert_comment(&self, comment: &Comment) -> Result<()>;
    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>>;
    async fn list_comments_for_article(&self, article_id: Uuid, limit: usize)
        -> Result<Vec<Comment>>;
    async fn list_comments_by_status(&self, status: CommentStatus, limit: usize)
        -> Result<Vec<Comment>>;
    async fn update_comment_content(&self, id: Uuid, content: &str) -> Result<bool>;
    async fn set_comment_status(&self, id: Uuid, status: CommentStatus) -> Result<bool>;
    async fn delete_comment(&self, id: Uuid) -> Result<bool>;
    async fn count_comments_by_user(&self, user_id: Uuid) -> Result<u64>;
    /// Comments left on any article written by `author_id`
    async fn count_comments_received(&self, author_id: Uuid) -> Result<u64>;

    // ----- contributions -----
    async fn insert_contribution(&self, contribution: &Contribution) -> Result<()>;
    async fn contributions_by_user(&self, user_id: Uuid, limit: usize)
        -> Result<Vec<Contribution>>;
    async fn contributions_by_article(&self, article_id: Uuid, limit: usize)
        -> Result<Vec<Contribution>>;
    async fn find_contribution(&self, id: Uuid) -> Result<Option<Contribution>>;
    async fn list_contributions_by_status(&self, status: ContributionStatus, limit: usize)
        -> Result<Vec<Contribution>>;
    /// Move a pending submission to `status`. False if the row is missing,
    /// not a submission, or already reviewed.
    async fn review_contribution(&self, id: Uuid, status: ContributionStatus) -> Result<bool>;

    // ----- activity -----
    /// Append a record and bump the per-(user, action) counter together
    async fn insert_activity(&self, record: &ActivityRecord) -> Result<()>;
    async fn activity_for_user(&self, user_id: Uuid, limit: usize) -> Result<Vec<ActivityRecord>>;
    async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityRecord>>;
    /// Pre-aggregated count of activity rows for one user and action
    async fn count_activity(&self, user_id: Uuid, action: ActivityAction) -> Result<u64>;

    // ----- badges -----
    async fn upsert_badges(&self, record: &BadgeRecord) -> Result<()>;
    async fn find_badges(&self, user_id: Uuid) -> Result<Option<BadgeRecord>>;

    // ----- aggregation -----
    async fn most_active_users(&self, limit: usize) -> Result<Vec<UserActivityCount>>;
    async fn most_viewed_articles(&self, limit: usize) -> Result<Vec<ArticleViewCount>>;
    async fn most_commented_articles(&self, limit: usize) -> Result<Vec<ArticleCommentCount>>;
}
