//! Role Capability Model
//! Mission: Map any role string to a fixed capability set, failing closed

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform roles for RBAC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    Admin,       // Full access, including user management
    Contributor, // Create + edit articles
    #[default]
    Reader, // Read-only
}

/// A named permission boolean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CreateArticles,
    EditArticles,
    DeleteArticles,
    ManageUsers,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::CreateArticles,
        Capability::EditArticles,
        Capability::DeleteArticles,
        Capability::ManageUsers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CreateArticles => "can_create_articles",
            Capability::EditArticles => "can_edit_articles",
            Capability::DeleteArticles => "can_delete_articles",
            Capability::ManageUsers => "can_manage_users",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability set granted to a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub can_create_articles: bool,
    pub can_edit_articles: bool,
    pub can_delete_articles: bool,
    pub can_manage_users: bool,
}

const ADMIN_CAPABILITIES: Capabilities = Capabilities {
    can_create_articles: true,
    can_edit_articles: true,
    can_delete_articles: true,
    can_manage_users: true,
};

const CONTRIBUTOR_CAPABILITIES: Capabilities = Capabilities {
    can_create_articles: true,
    can_edit_articles: true,
    can_delete_articles: false,
    can_manage_users: false,
};

const READER_CAPABILITIES: Capabilities = Capabilities {
    can_create_articles: false,
    can_edit_articles: false,
    can_delete_articles: false,
    can_manage_users: false,
};

impl Capabilities {
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::CreateArticles => self.can_create_articles,
            Capability::EditArticles => self.can_edit_articles,
            Capability::DeleteArticles => self.can_delete_articles,
            Capability::ManageUsers => self.can_manage_users,
        }
    }

    /// Capabilities that are switched on, in declaration order
    pub fn granted(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.allows(*c))
            .collect()
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Contributor => "contributor",
            Role::Reader => "reader",
        }
    }

    /// Parse a role name. Unknown or malformed names degrade to `Reader`.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else if s.eq_ignore_ascii_case("contributor") {
            Role::Contributor
        } else {
            Role::Reader
        }
    }

    pub const fn capabilities(self) -> Capabilities {
        match self {
            Role::Admin => ADMIN_CAPABILITIES,
            Role::Contributor => CONTRIBUTOR_CAPABILITIES,
            Role::Reader => READER_CAPABILITIES,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        Role::parse(&s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability set for a raw role string. Total over all inputs.
pub fn capabilities_for(role: &str) -> Capabilities {
    Role::parse(role).capabilities()
}
