//! Authorization Guards
//! Mission: Decide allow/deny from role capabilities and resource ownership
//!
//! Guards are pure. They read the principal and the resource owner only and
//! never touch storage.

use crate::auth::{error::AccessError, models::Principal, roles::Capability};
use uuid::Uuid;

/// Allow iff the principal's role grants `capability`
pub fn require(capability: Capability, principal: &Principal) -> Result<(), AccessError> {
    if principal.capabilities().allows(capability) {
        Ok(())
    } else {
        Err(AccessError::Forbidden)
    }
}

/// Guarded operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateArticle,
    /// No ownership check: any editor may edit any article
    EditArticle,
    DeleteArticle,
    DeleteComment { author_id: Uuid },
    EditComment { author_id: Uuid },
    ManageUsers,
    ViewAnalytics,
}

pub fn authorize(principal: &Principal, action: Action) -> Result<(), AccessError> {
    match action {
        Action::CreateArticle => require(Capability::CreateArticles, principal),
        Action::EditArticle => require(Capability::EditArticles, principal),
        Action::DeleteArticle => require(Capability::DeleteArticles, principal),
        Action::DeleteComment { author_id } => {
            if principal.capabilities().allows(Capability::DeleteArticles)
                || principal.id == author_id
            {
                Ok(())
            } else {
                Err(AccessError::Forbidden)
            }
        }
        Action::EditComment { author_id } => {
            if principal.id == author_id {
                Ok(())
            } else {
                Err(AccessError::Forbidden)
            }
        }
        Action::ManageUsers | Action::ViewAnalytics => {
            require(Capability::ManageUsers, principal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::AccountStatus;
    use crate::auth::roles::Role;

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", role),
            username: role.to_string(),
            role,
            status: AccountStatus::Active,
        }
    }

    fn allowed(p: &Principal, action: Action) -> bool {
        authorize(p, action).is_ok()
    }

    #[test]
    fn test_article_guards_follow_capabilities() {
        let admin = principal(Role::Admin);
        let contributor = principal(Role::Contributor);
        let reader = principal(Role::Reader);

        assert!(allowed(&admin, Action::CreateArticle));
        assert!(allowed(&contributor, Action::CreateArticle));
        assert!(!allowed(&reader, Action::CreateArticle));

        assert!(allowed(&contributor, Action::EditArticle));
        assert!(!allowed(&reader, Action::EditArticle));

        assert!(allowed(&admin, Action::DeleteArticle));
        assert!(!allowed(&contributor, Action::DeleteArticle));
        assert!(!allowed(&reader, Action::DeleteArticle));
    }

    #[test]
    fn test_delete_comment_by_stranger_forbidden() {
        let author = Uuid::new_v4();
        for role in [Role::Reader, Role::Contributor] {
            let stranger = principal(role);
            assert!(matches!(
                authorize(&stranger, Action::DeleteComment { author_id: author }),
                Err(AccessError::Forbidden)
            ));
        }
    }

    #[test]
    fn test_delete_comment_by_author_or_capability() {
        let reader = principal(Role::Reader);
        assert!(allowed(
            &reader,
            Action::DeleteComment {
                author_id: reader.id
            }
        ));

        let admin = principal(Role::Admin);
        assert!(allowed(
            &admin,
            Action::DeleteComment {
                author_id: Uuid::new_v4()
            }
        ));
    }

    #[test]
    fn test_edit_comment_author_only() {
        let admin = principal(Role::Admin);
        assert!(!allowed(
            &admin,
            Action::EditComment {
                author_id: Uuid::new_v4()
            }
        ));
        assert!(allowed(&admin, Action::EditComment { author_id: admin.id }));

        let reader = principal(Role::Reader);
        assert!(allowed(
            &reader,
            Action::EditComment {
                author_id: reader.id
            }
        ));
    }

    #[test]
    fn test_user_management_admin_only() {
        assert!(allowed(&principal(Role::Admin), Action::ManageUsers));
        assert!(allowed(&principal(Role::Admin), Action::ViewAnalytics));
        assert!(!allowed(&principal(Role::Contributor), Action::ManageUsers));
        assert!(!allowed(&principal(Role::Reader), Action::ViewAnalytics));
    }

    #[test]
    fn test_require_matches_capability_table() {
        let contributor = principal(Role::Contributor);
        for capability in Capability::ALL {
            assert_eq!(
                require(capability, &contributor).is_ok(),
                contributor.capabilities().allows(capability)
            );
        }
    }
}
