//! Identity Resolution
//! Mission: Turn a bearer token into the principal behind the request

use crate::auth::{error::AccessError, jwt::JwtHandler, models::Principal};
use crate::store::ContentStore;
use axum::http::HeaderMap;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use std::sync::Arc;
use tracing::debug;

/// Pull the bearer token out of the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AccessError> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(AccessError::Unauthenticated)
}

/// Resolves tokens against the signing key and the user store
#[derive(Clone)]
pub struct IdentityResolver {
    jwt: Arc<JwtHandler>,
    store: Arc<dyn ContentStore>,
}

impl IdentityResolver {
    pub fn new(jwt: Arc<JwtHandler>, store: Arc<dyn ContentStore>) -> Self {
        Self { jwt, store }
    }

    /// Decode the token and return its subject. Never touches storage.
    pub fn resolve_subject(&self, token: &str) -> Result<String, AccessError> {
        let claims = self
            .jwt
            .decode_access_token(token)
            .map_err(|_| AccessError::Unauthenticated)?;

        claims
            .subject()
            .map(str::to_string)
            .ok_or(AccessError::Unauthenticated)
    }

    /// Full pipeline: decode, extract subject, then one lookup by email
    pub async fn resolve_principal(&self, token: &str) -> Result<Principal, AccessError> {
        let email = self.resolve_subject(token)?;

        let user = self
            .store
            .find_user_by_email(&email)
            .await
            .map_err(AccessError::Storage)?
            .ok_or_else(|| {
                debug!("Token subject {} has no account", email);
                AccessError::PrincipalNotFound
            })?;

        Ok(Principal::from(&user))
    }

    pub fn subject_from_headers(&self, headers: &HeaderMap) -> Result<String, AccessError> {
        self.resolve_subject(&bearer_token(headers)?)
    }

    pub async fn principal_from_headers(&self, headers: &HeaderMap) -> Result<Principal, AccessError> {
        let token = bearer_token(headers)?;
        self.resolve_principal(&token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::{AccountStatus, Claims, User};
    use crate::auth::roles::Role;
    use crate::store::MemoryStore;
    use axum::http::{header::AUTHORIZATION, HeaderValue};
    use chrono::{Duration, Utc};

    const SECRET: &str = "identity-test-secret";

    async fn resolver_with(users: &[User]) -> IdentityResolver {
        let store = Arc::new(MemoryStore::new());
        for user in users {
            store.insert_user(user).await.unwrap();
        }
        IdentityResolver::new(Arc::new(JwtHandler::new(SECRET)), store)
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(
            bearer_token(&headers_with("Bearer abc.def.ghi")).unwrap(),
            "abc.def.ghi"
        );
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AccessError::Unauthenticated)
        ));
        assert!(matches!(
            bearer_token(&headers_with("Basic dXNlcjpwYXNz")),
            Err(AccessError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_resolve_principal_loads_user() {
        let user = User::new("ada", "ada@example.com", "hash".into(), Role::Contributor);
        let resolver = resolver_with(&[user.clone()]).await;
        let token = resolver.jwt.create_access_token("ada@example.com").unwrap();

        let principal = resolver.resolve_principal(&token).await.unwrap();
        assert_eq!(principal.id, user.id);
        assert_eq!(principal.role, Role::Contributor);
        assert_eq!(principal.status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn test_unknown_subject_is_not_found() {
        let resolver = resolver_with(&[]).await;
        let token = resolver.jwt.create_access_token("ghost@example.com").unwrap();

        assert!(matches!(
            resolver.resolve_principal(&token).await,
            Err(AccessError::PrincipalNotFound)
        ));
        // subject-only resolution does not care whether the account exists
        assert_eq!(
            resolver.resolve_subject(&token).unwrap(),
            "ghost@example.com"
        );
    }

    #[tokio::test]
    async fn test_bad_tokens_are_unauthenticated() {
        let user = User::new("ada", "ada@example.com", "hash".into(), Role::Admin);
        let resolver = resolver_with(&[user]).await;

        let expired = resolver
            .jwt
            .create_access_token_with_ttl("ada@example.com", Duration::minutes(-1))
            .unwrap();
        let forged = JwtHandler::new("other")
            .create_access_token("ada@example.com")
            .unwrap();
        let no_subject = resolver
            .jwt
            .sign(&Claims {
                sub: None,
                exp: Utc::now().timestamp() + 60,
            })
            .unwrap();

        for token in [expired, forged, no_subject, "garbage".to_string()] {
            assert!(matches!(
                resolver.resolve_principal(&token).await,
                Err(AccessError::Unauthenticated)
            ));
        }
    }

    #[tokio::test]
    async fn test_resolution_from_headers() {
        let user = User::new("ada", "ada@example.com", "hash".into(), Role::Reader);
        let resolver = resolver_with(&[user]).await;
        let token = resolver.jwt.create_access_token("ada@example.com").unwrap();
        let headers = headers_with(&format!("Bearer {}", token));

        assert_eq!(
            resolver.subject_from_headers(&headers).unwrap(),
            "ada@example.com"
        );
        let principal = resolver.principal_from_headers(&headers).await.unwrap();
        assert_eq!(principal.email, "ada@example.com");

        assert!(matches!(
            resolver.principal_from_headers(&HeaderMap::new()).await,
            Err(AccessError::Unauthenticated)
        ));
    }
}
