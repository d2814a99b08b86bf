//! Authentication Models
//! Mission: Define user accounts, resolved principals and token claims

use crate::auth::roles::{Capabilities, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: Role,
    pub status: AccountStatus,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: &str, email: &str, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role,
            status: AccountStatus::Active,
            bio: None,
            profile_picture: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Account status. Anything unrecognised is treated as banned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AccountStatus {
    Active,
    Banned,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Banned => "banned",
        }
    }

    pub fn is_banned(&self) -> bool {
        *self == AccountStatus::Banned
    }

    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("active") {
            AccountStatus::Active
        } else {
            AccountStatus::Banned
        }
    }
}

impl From<String> for AccountStatus {
    fn from(s: String) -> Self {
        AccountStatus::parse(&s)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated identity attached to a single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub status: AccountStatus,
}

impl Principal {
    pub fn capabilities(&self) -> Capabilities {
        self.role.capabilities()
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
            status: user.status,
        }
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>, // subject (user email)
    pub exp: i64, // expiration timestamp
}

impl Claims {
    /// Non-empty subject, if present
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref().filter(|s| !s.is_empty())
    }
}

/// Signup request body
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64, // seconds until expiration
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// User response (sanitized)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            status: user.status,
            bio: user.bio.clone(),
            profile_picture: user.profile_picture.clone(),
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new("alice", "alice@example.com", "hash".into(), Role::Reader);
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "reader");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn test_unknown_status_is_banned() {
        assert_eq!(AccountStatus::parse("ACTIVE"), AccountStatus::Active);
        assert_eq!(AccountStatus::parse("suspended"), AccountStatus::Banned);
        assert_eq!(AccountStatus::parse(""), AccountStatus::Banned);
    }

    #[test]
    fn test_principal_from_user() {
        let user = User::new("bob", "bob@example.com", "hash".into(), Role::Contributor);
        let principal = Principal::from(&user);

        assert_eq!(principal.id, user.id);
        assert_eq!(principal.email, "bob@example.com");
        assert!(principal.capabilities().can_edit_articles);
        assert!(!principal.capabilities().can_delete_articles);
    }

    #[test]
    fn test_claims_subject() {
        let claims = Claims {
            sub: Some("a@b.com".into()),
            exp: 0,
        };
        assert_eq!(claims.subject(), Some("a@b.com"));

        let empty = Claims {
            sub: Some(String::new()),
            exp: 0,
        };
        assert_eq!(empty.subject(), None);

        let parsed: Claims = serde_json::from_str(r#"{"exp": 10}"#).unwrap();
        assert_eq!(parsed.subject(), None);
    }
}
