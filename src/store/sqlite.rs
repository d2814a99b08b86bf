//! SQLite Storage
//! Mission: Durable single-file backend for the content store

use super::ContentStore;
use crate::auth::models::{AccountStatus, User};
use crate::auth::roles::Role;
use crate::models::{
    ActivityAction, ActivityRecord, Article, ArticleCommentCount, ArticleStatus, ArticleUpdate,
    ArticleViewCount, BadgeRecord, Comment, CommentStatus, Contribution, ContributionAction,
    ContributionStatus, UserActivityCount,
};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL,
    status TEXT NOT NULL,
    bio TEXT,
    profile_picture TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS articles (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    img TEXT,
    tags_json TEXT NOT NULL,
    author_id TEXT,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_articles_author ON articles(author_id);

CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    article_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    content TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_comments_article ON comments(article_id);
CREATE INDEX IF NOT EXISTS idx_comments_user ON comments(user_id);

CREATE TABLE IF NOT EXISTS contributions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    article_id TEXT NOT NULL,
    action TEXT NOT NULL,
    content TEXT,
    status TEXT NOT NULL,
    timestamp TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_contributions_status ON contributions(status);

CREATE TABLE IF NOT EXISTS activity (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    action TEXT NOT NULL,
    metadata_json TEXT NOT NULL,
    timestamp TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_activity_user ON activity(user_id, timestamp);

CREATE TABLE IF NOT EXISTS activity_counters (
    user_id TEXT NOT NULL,
    action TEXT NOT NULL,
    count INTEGER NOT NULL,
    PRIMARY KEY (user_id, action)
);

CREATE TABLE IF NOT EXISTS badges (
    user_id TEXT PRIMARY KEY,
    badges_json TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, status, bio, profile_picture, created_at, updated_at";
const ARTICLE_COLUMNS: &str =
    "id, title, description, img, tags_json, author_id, status, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, article_id, user_id, content, status, created_at, updated_at";
const CONTRIBUTION_COLUMNS: &str = "id, user_id, article_id, action, content, status, timestamp";
const ACTIVITY_COLUMNS: &str = "id, user_id, action, metadata_json, timestamp";

/// SQLite-backed content store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize schema")?;

        info!("📦 Content store opened at {}", path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

// ============================================================================
// Column codecs
// ============================================================================

fn ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(
    idx: usize,
    e: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
}

fn get_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn get_opt_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn get_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn get_json<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn get_enum<T>(row: &Row<'_>, idx: usize, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| conversion_error(idx, format!("unrecognized value '{}'", raw)))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(4)?;
    let status: String = row.get(5)?;
    Ok(User {
        id: get_uuid(row, 0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: Role::parse(&role),
        status: AccountStatus::parse(&status),
        bio: row.get(6)?,
        profile_picture: row.get(7)?,
        created_at: get_ts(row, 8)?,
        updated_at: get_ts(row, 9)?,
    })
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: get_uuid(row, 0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        img: row.get(3)?,
        tags: get_json(row, 4)?,
        author_id: get_opt_uuid(row, 5)?,
        status: get_enum(row, 6, ArticleStatus::parse)?,
        created_at: get_ts(row, 7)?,
        updated_at: get_ts(row, 8)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: get_uuid(row, 0)?,
        article_id: get_uuid(row, 1)?,
        user_id: get_uuid(row, 2)?,
        content: row.get(3)?,
        status: get_enum(row, 4, CommentStatus::parse)?,
        created_at: get_ts(row, 5)?,
        updated_at: get_ts(row, 6)?,
    })
}

fn contribution_from_row(row: &Row<'_>) -> rusqlite::Result<Contribution> {
    Ok(Contribution {
        id: get_uuid(row, 0)?,
        user_id: get_uuid(row, 1)?,
        article_id: get_uuid(row, 2)?,
        action: get_enum(row, 3, ContributionAction::parse)?,
        content: row.get(4)?,
        status: get_enum(row, 5, ContributionStatus::parse)?,
        timestamp: get_ts(row, 6)?,
    })
}

fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<ActivityRecord> {
    Ok(ActivityRecord {
        id: get_uuid(row, 0)?,
        user_id: get_uuid(row, 1)?,
        action: get_enum(row, 2, ActivityAction::parse)?,
        metadata: get_json(row, 3)?,
        timestamp: get_ts(row, 4)?,
    })
}

fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

impl SqliteStore {
    fn query_list<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }

    fn query_one<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Option<T>> {
        let conn = self.conn.lock();
        Ok(conn.query_row(sql, params, map).optional()?)
    }

    fn count(&self, sql: &str, params: impl rusqlite::Params) -> Result<u64> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(sql, params, |row| row.get(0))?;
        Ok(count_to_u64(count))
    }

    fn execute(&self, sql: &str, params: impl rusqlite::Params) -> Result<bool> {
        let conn = self.conn.lock();
        Ok(conn.execute(sql, params)? > 0)
    }
}

#[async_trait::async_trait]
impl ContentStore for SqliteStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        let conn = self.conn.lock();
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1",
            params![user.email],
            |row| row.get(0),
        )?;
        if exists > 0 {
            bail!("Email already registered: {}", user.email);
        }

        conn.execute(
            &format!(
                "INSERT INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                USER_COLUMNS
            ),
            params![
                user.id.to_string(),
                user.username,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.status.as_str(),
                user.bio,
                user.profile_picture,
                ts(&user.created_at),
                ts(&user.updated_at),
            ],
        )
        .context("Failed to insert user")?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS),
            params![email],
            user_from_row,
        )
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            params![id.to_string()],
            user_from_row,
        )
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.query_list(
            &format!("SELECT {} FROM users ORDER BY created_at ASC", USER_COLUMNS),
            [],
            user_from_row,
        )
    }

    async fn set_user_status(&self, id: Uuid, status: AccountStatus) -> Result<bool> {
        self.execute(
            "UPDATE users SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), ts(&Utc::now()), id.to_string()],
        )
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> Result<bool> {
        self.execute(
            "UPDATE users SET role = ?1, updated_at = ?2 WHERE id = ?3",
            params![role.as_str(), ts(&Utc::now()), id.to_string()],
        )
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        self.execute(
            "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3",
            params![password_hash, ts(&Utc::now()), id.to_string()],
        )
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool> {
        self.execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])
    }

    async fn insert_article(&self, article: &Article) -> Result<()> {
        let tags = serde_json::to_string(&article.tags)?;
        self.execute(
            &format!(
                "INSERT INTO articles ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                ARTICLE_COLUMNS
            ),
            params![
                article.id.to_string(),
                article.title,
                article.description,
                article.img,
                tags,
                article.author_id.map(|id| id.to_string()),
                article.status.as_str(),
                ts(&article.created_at),
                ts(&article.updated_at),
            ],
        )
        .context("Failed to insert article")?;
        Ok(())
    }

    async fn find_article(&self, id: Uuid) -> Result<Option<Article>> {
        self.query_one(
            &format!("SELECT {} FROM articles WHERE id = ?1", ARTICLE_COLUMNS),
            params![id.to_string()],
            article_from_row,
        )
    }

    async fn list_articles(&self, limit: usize) -> Result<Vec<Article>> {
        self.query_list(
            &format!(
                "SELECT {} FROM articles ORDER BY created_at DESC LIMIT ?1",
                ARTICLE_COLUMNS
            ),
            params![limit_param(limit)],
            article_from_row,
        )
    }

    async fn list_articles_by_status(
        &self,
        status: ArticleStatus,
        limit: usize,
    ) -> Result<Vec<Article>> {
        self.query_list(
            &format!(
                "SELECT {} FROM articles WHERE status = ?1 ORDER BY created_at DESC LIMIT ?2",
                ARTICLE_COLUMNS
            ),
            params![status.as_str(), limit_param(limit)],
            article_from_row,
        )
    }

    async fn update_article(&self, id: Uuid, update: &ArticleUpdate) -> Result<bool> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let current = tx
            .query_row(
                &format!("SELECT {} FROM articles WHERE id = ?1", ARTICLE_COLUMNS),
                params![id.to_string()],
                article_from_row,
            )
            .optional()?;
        let Some(mut article) = current else {
            return Ok(false);
        };

        update.apply(&mut article);
        tx.execute(
            "UPDATE articles SET title = ?1, description = ?2, img = ?3, tags_json = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                article.title,
                article.description,
                article.img,
                serde_json::to_string(&article.tags)?,
                ts(&article.updated_at),
                id.to_string(),
            ],
        )?;
        tx.commit()?;
        Ok(true)
    }

    async fn set_article_status(&self, id: Uuid, status: ArticleStatus) -> Result<bool> {
        self.execute(
            "UPDATE articles SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), ts(&Utc::now()), id.to_string()],
        )
    }

    async fn delete_article(&self, id: Uuid) -> Result<bool> {
        self.execute("DELETE FROM articles WHERE id = ?1", params![id.to_string()])
    }

    async fn count_articles_by_author(&self, author_id: Uuid) -> Result<u64> {
        self.count(
            "SELECT COUNT(*) FROM articles WHERE author_id = ?1",
            params![author_id.to_string()],
        )
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.execute(
            &format!(
                "INSERT INTO comments ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                COMMENT_COLUMNS
            ),
            params![
                comment.id.to_string(),
                comment.article_id.to_string(),
                comment.user_id.to_string(),
                comment.content,
                comment.status.as_str(),
                ts(&comment.created_at),
                ts(&comment.updated_at),
            ],
        )
        .context("Failed to insert comment")?;
        Ok(())
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        self.query_one(
            &format!("SELECT {} FROM comments WHERE id = ?1", COMMENT_COLUMNS),
            params![id.to_string()],
            comment_from_row,
        )
    }

    async fn list_comments_for_article(
        &self,
        article_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Comment>> {
        self.query_list(
            &format!(
                "SELECT {} FROM comments WHERE article_id = ?1 ORDER BY created_at DESC LIMIT ?2",
                COMMENT_COLUMNS
            ),
            params![article_id.to_string(), limit_param(limit)],
            comment_from_row,
        )
    }

    async fn list_comments_by_status(
        &self,
        status: CommentStatus,
        limit: usize,
    ) -> Result<Vec<Comment>> {
        self.query_list(
            &format!(
                "SELECT {} FROM comments WHERE status = ?1 ORDER BY created_at DESC LIMIT ?2",
                COMMENT_COLUMNS
            ),
            params![status.as_str(), limit_param(limit)],
            comment_from_row,
        )
    }

    async fn update_comment_content(&self, id: Uuid, content: &str) -> Result<bool> {
        self.execute(
            "UPDATE comments SET content = ?1, updated_at = ?2 WHERE id = ?3",
            params![content, ts(&Utc::now()), id.to_string()],
        )
    }

    async fn set_comment_status(&self, id: Uuid, status: CommentStatus) -> Result<bool> {
        self.execute(
            "UPDATE comments SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), ts(&Utc::now()), id.to_string()],
        )
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        self.execute("DELETE FROM comments WHERE id = ?1", params![id.to_string()])
    }

    async fn count_comments_by_user(&self, user_id: Uuid) -> Result<u64> {
        self.count(
            "SELECT COUNT(*) FROM comments WHERE user_id = ?1",
            params![user_id.to_string()],
        )
    }

    async fn count_comments_received(&self, author_id: Uuid) -> Result<u64> {
        self.count(
            "SELECT COUNT(*) FROM comments
             WHERE article_id IN (SELECT id FROM articles WHERE author_id = ?1)",
            params![author_id.to_string()],
        )
    }

    async fn insert_contribution(&self, contribution: &Contribution) -> Result<()> {
        self.execute(
            &format!(
                "INSERT INTO contributions ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                CONTRIBUTION_COLUMNS
            ),
            params![
                contribution.id.to_string(),
                contribution.user_id.to_string(),
                contribution.article_id.to_string(),
                contribution.action.as_str(),
                contribution.content,
                contribution.status.as_str(),
                ts(&contribution.timestamp),
            ],
        )
        .context("Failed to insert contribution")?;
        Ok(())
    }

    async fn contributions_by_user(&self, user_id: Uuid, limit: usize) -> Result<Vec<Contribution>> {
        self.query_list(
            &format!(
                "SELECT {} FROM contributions WHERE user_id = ?1 ORDER BY timestamp DESC LIMIT ?2",
                CONTRIBUTION_COLUMNS
            ),
            params![user_id.to_string(), limit_param(limit)],
            contribution_from_row,
        )
    }

    async fn contributions_by_article(
        &self,
        article_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Contribution>> {
        self.query_list(
            &format!(
                "SELECT {} FROM contributions WHERE article_id = ?1 ORDER BY timestamp DESC LIMIT ?2",
                CONTRIBUTION_COLUMNS
            ),
            params![article_id.to_string(), limit_param(limit)],
            contribution_from_row,
        )
    }

    async fn find_contribution(&self, id: Uuid) -> Result<Option<Contribution>> {
        self.query_one(
            &format!("SELECT {} FROM contributions WHERE id = ?1", CONTRIBUTION_COLUMNS),
            params![id.to_string()],
            contribution_from_row,
        )
    }

    async fn list_contributions_by_status(
        &self,
        status: ContributionStatus,
        limit: usize,
    ) -> Result<Vec<Contribution>> {
        self.query_list(
            &format!(
                "SELECT {} FROM contributions WHERE action = ?1 AND status = ?2
                 ORDER BY timestamp DESC LIMIT ?3",
                CONTRIBUTION_COLUMNS
            ),
            params![
                ContributionAction::Submitted.as_str(),
                status.as_str(),
                limit_param(limit)
            ],
            contribution_from_row,
        )
    }

    async fn review_contribution(&self, id: Uuid, status: ContributionStatus) -> Result<bool> {
        self.execute(
            "UPDATE contributions SET status = ?1 WHERE id = ?2 AND action = ?3 AND status = ?4",
            params![
                status.as_str(),
                id.to_string(),
                ContributionAction::Submitted.as_str(),
                ContributionStatus::Pending.as_str(),
            ],
        )
    }

    async fn insert_activity(&self, record: &ActivityRecord) -> Result<()> {
        let metadata = serde_json::to_string(&record.metadata)?;

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO activity ({}) VALUES (?1, ?2, ?3, ?4, ?5)",
                ACTIVITY_COLUMNS
            ),
            params![
                record.id.to_string(),
                record.user_id.to_string(),
                record.action.as_str(),
                metadata,
                ts(&record.timestamp),
            ],
        )?;
        tx.execute(
            "INSERT INTO activity_counters (user_id, action, count) VALUES (?1, ?2, 1)
             ON CONFLICT(user_id, action) DO UPDATE SET count = count + 1",
            params![record.user_id.to_string(), record.action.as_str()],
        )?;
        tx.commit().context("Failed to record activity")?;
        Ok(())
    }

    async fn activity_for_user(&self, user_id: Uuid, limit: usize) -> Result<Vec<ActivityRecord>> {
        self.query_list(
            &format!(
                "SELECT {} FROM activity WHERE user_id = ?1 ORDER BY timestamp DESC LIMIT ?2",
                ACTIVITY_COLUMNS
            ),
            params![user_id.to_string(), limit_param(limit)],
            activity_from_row,
        )
    }

    async fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityRecord>> {
        self.query_list(
            &format!(
                "SELECT {} FROM activity ORDER BY timestamp DESC LIMIT ?1",
                ACTIVITY_COLUMNS
            ),
            params![limit_param(limit)],
            activity_from_row,
        )
    }

    async fn count_activity(&self, user_id: Uuid, action: ActivityAction) -> Result<u64> {
        let conn = self.conn.lock();
        let count: Option<i64> = conn
            .query_row(
                "SELECT count FROM activity_counters WHERE user_id = ?1 AND action = ?2",
                params![user_id.to_string(), action.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.map(count_to_u64).unwrap_or(0))
    }

    async fn upsert_badges(&self, record: &BadgeRecord) -> Result<()> {
        self.execute(
            "INSERT INTO badges (user_id, badges_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET badges_json = excluded.badges_json,
                                                updated_at = excluded.updated_at",
            params![
                record.user_id.to_string(),
                serde_json::to_string(&record.badges)?,
                ts(&record.updated_at),
            ],
        )
        .context("Failed to store badges")?;
        Ok(())
    }

    async fn find_badges(&self, user_id: Uuid) -> Result<Option<BadgeRecord>> {
        self.query_one(
            "SELECT user_id, badges_json, updated_at FROM badges WHERE user_id = ?1",
            params![user_id.to_string()],
            |row| {
                Ok(BadgeRecord {
                    user_id: get_uuid(row, 0)?,
                    badges: get_json(row, 1)?,
                    updated_at: get_ts(row, 2)?,
                })
            },
        )
    }

    async fn most_active_users(&self, limit: usize) -> Result<Vec<UserActivityCount>> {
        self.query_list(
            "SELECT user_id, COUNT(*) AS activity_count FROM activity
             GROUP BY user_id ORDER BY activity_count DESC, user_id ASC LIMIT ?1",
            params![limit_param(limit)],
            |row| {
                Ok(UserActivityCount {
                    user_id: get_uuid(row, 0)?,
                    activity_count: count_to_u64(row.get(1)?),
                })
            },
        )
    }

    async fn most_viewed_articles(&self, limit: usize) -> Result<Vec<ArticleViewCount>> {
        self.query_list(
            "SELECT article_id, COUNT(*) AS view_count FROM (
                 SELECT CAST(json_extract(metadata_json, '$.article_id') AS TEXT) AS article_id
                 FROM activity WHERE action = ?1
             )
             WHERE article_id IS NOT NULL
             GROUP BY article_id ORDER BY view_count DESC, article_id ASC LIMIT ?2",
            params![ActivityAction::ViewedArticle.as_str(), limit_param(limit)],
            |row| {
                Ok(ArticleViewCount {
                    article_id: row.get(0)?,
                    view_count: count_to_u64(row.get(1)?),
                })
            },
        )
    }

    async fn most_commented_articles(&self, limit: usize) -> Result<Vec<ArticleCommentCount>> {
        self.query_list(
            "SELECT article_id, COUNT(*) AS comment_count FROM comments
             GROUP BY article_id ORDER BY comment_count DESC, article_id ASC LIMIT ?1",
            params![limit_param(limit)],
            |row| {
                Ok(ArticleCommentCount {
                    article_id: get_uuid(row, 0)?,
                    comment_count: count_to_u64(row.get(1)?),
                })
            },
        )
    }
}
