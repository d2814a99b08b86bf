//! Content entities shared by the store, the engagement engine and the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Articles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Pending,
    Approved,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Pending => "pending",
            ArticleStatus::Approved => "approved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ArticleStatus::Pending),
            "approved" => Some(ArticleStatus::Approved),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub img: Option<String>,
    pub tags: Vec<String>,
    /// None for generated articles
    pub author_id: Option<Uuid>,
    pub status: ArticleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn new(title: &str, description: &str, author_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            img: None,
            tags: Vec::new(),
            author_id,
            status: ArticleStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial article update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub img: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl ArticleUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.img.is_none() && self.tags.is_none()
    }

    pub fn apply(&self, article: &mut Article) {
        if let Some(title) = &self.title {
            article.title = title.clone();
        }
        if let Some(description) = &self.description {
            article.description = description.clone();
        }
        if let Some(img) = &self.img {
            article.img = Some(img.clone());
        }
        if let Some(tags) = &self.tags {
            article.tags = tags.clone();
        }
        article.updated_at = Utc::now();
    }
}

// ============================================================================
// Comments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Visible,
    Flagged,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Visible => "visible",
            CommentStatus::Flagged => "flagged",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "visible" => Some(CommentStatus::Visible),
            "flagged" => Some(CommentStatus::Flagged),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub article_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(article_id: Uuid, user_id: Uuid, content: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            article_id,
            user_id,
            content: content.to_string(),
            status: CommentStatus::Visible,
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Contributions
// ============================================================================

/// `Created` and `Edited` are recorded by the article flows; `Submitted` is a
/// user's proposed addition awaiting review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionAction {
    Created,
    Edited,
    Submitted,
}

impl ContributionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionAction::Created => "created",
            ContributionAction::Edited => "edited",
            ContributionAction::Submitted => "submitted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(ContributionAction::Created),
            "edited" => Some(ContributionAction::Edited),
            "submitted" => Some(ContributionAction::Submitted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionStatus {
    Pending,
    Approved,
    Rejected,
}

impl ContributionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionStatus::Pending => "pending",
            ContributionStatus::Approved => "approved",
            ContributionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ContributionStatus::Pending),
            "approved" => Some(ContributionStatus::Approved),
            "rejected" => Some(ContributionStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: Uuid,
    pub user_id: Uuid,
    pub article_id: Uuid,
    pub action: ContributionAction,
    /// Body of a submitted contribution; None for edit-history rows
    pub content: Option<String>,
    pub status: ContributionStatus,
    pub timestamp: DateTime<Utc>,
}

impl Contribution {
    /// Edit-history row for an article change that already happened
    pub fn new(user_id: Uuid, article_id: Uuid, action: ContributionAction) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            article_id,
            action,
            content: None,
            status: ContributionStatus::Approved,
            timestamp: Utc::now(),
        }
    }

    /// User-submitted contribution, pending until reviewed
    pub fn submitted(user_id: Uuid, article_id: Uuid, content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            status: ContributionStatus::Pending,
            ..Self::new(user_id, article_id, ContributionAction::Submitted)
        }
    }

    pub fn is_reviewable(&self) -> bool {
        self.action == ContributionAction::Submitted && self.status == ContributionStatus::Pending
    }
}

// ============================================================================
// Activity
// ============================================================================

/// Trackable user actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    ViewedArticle,
    Commented,
    Liked,
    Shared,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::ViewedArticle => "viewed_article",
            ActivityAction::Commented => "commented",
            ActivityAction::Liked => "liked",
            ActivityAction::Shared => "shared",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "viewed_article" => Some(ActivityAction::ViewedArticle),
            "commented" => Some(ActivityAction::Commented),
            "liked" => Some(ActivityAction::Liked),
            "shared" => Some(ActivityAction::Shared),
            _ => None,
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable activity log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action: ActivityAction,
    pub metadata: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl ActivityRecord {
    pub fn new(user_id: Uuid, action: ActivityAction, metadata: Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            action,
            metadata,
            timestamp: Utc::now(),
        }
    }

    /// `metadata.article_id` rendered as a string, if set
    pub fn article_ref(&self) -> Option<String> {
        match self.metadata.get("article_id")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

// ============================================================================
// Badges
// ============================================================================

/// One record per user; replaced wholesale on every recomputation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeRecord {
    pub user_id: Uuid,
    pub badges: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Aggregation rows
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserActivityCount {
    pub user_id: Uuid,
    pub activity_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleViewCount {
    pub article_id: String,
    pub view_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleCommentCount {
    pub article_id: Uuid,
    pub comment_count: u64,
}
