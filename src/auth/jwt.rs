//! JWT Token Handler
//! Mission: Issue and verify short-lived HS256 access tokens

use crate::auth::models::Claims;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;
use tracing::debug;

pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 30;

/// Token failed verification. Forged, malformed and expired tokens are
/// deliberately indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidToken;

impl fmt::Display for InvalidToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid or expired token")
    }
}

impl std::error::Error for InvalidToken {}

/// JWT Handler for token operations
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key and the default 30 minute lifetime
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue an access token for `subject` with the configured lifetime
    pub fn create_access_token(&self, subject: &str) -> Result<String> {
        self.create_access_token_with_ttl(subject, self.ttl)
    }

    pub fn create_access_token_with_ttl(&self, subject: &str, ttl: Duration) -> Result<String> {
        let exp = Utc::now()
            .checked_add_signed(ttl)
            .context("Invalid timestamp")?
            .timestamp();

        debug!(
            "Generating access token for {}, expires in {}s",
            subject,
            ttl.num_seconds()
        );

        self.sign(&Claims {
            sub: Some(subject.to_string()),
            exp,
        })
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .context("Failed to generate JWT")
    }

    /// Verify signature, structure and expiry, then return the claims
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, InvalidToken> {
        let decoded = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Rejected access token: {}", e);
            InvalidToken
        })?;

        Ok(decoded.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-12345";

    #[test]
    fn test_token_round_trip() {
        let handler = JwtHandler::new(SECRET);

        let token = handler.create_access_token("a@b.com").unwrap();
        assert!(!token.is_empty());

        let claims = handler.decode_access_token(&token).unwrap();
        assert_eq!(claims.subject(), Some("a@b.com"));
        assert!(claims.exp > Utc::now().timestamp());
        assert!(claims.exp <= Utc::now().timestamp() + ACCESS_TOKEN_TTL_MINUTES * 60);
    }

    #[test]
    fn test_expired_token_rejected() {
        let handler = JwtHandler::new(SECRET);

        let token = handler
            .create_access_token_with_ttl("a@b.com", Duration::seconds(-5))
            .unwrap();
        assert_eq!(handler.decode_access_token(&token), Err(InvalidToken));
    }

    #[test]
    fn test_ttl_elapsed_with_short_lived_handler() {
        let handler = JwtHandler::new(SECRET).with_ttl(Duration::seconds(1));
        let token = handler.create_access_token("a@b.com").unwrap();
        assert!(handler.decode_access_token(&token).is_ok());

        std::thread::sleep(std::time::Duration::from_millis(2100));
        assert_eq!(handler.decode_access_token(&token), Err(InvalidToken));
    }

    #[test]
    fn test_invalid_token_rejected() {
        let handler = JwtHandler::new(SECRET);
        assert_eq!(
            handler.decode_access_token("invalid.token.here"),
            Err(InvalidToken)
        );
        assert_eq!(handler.decode_access_token(""), Err(InvalidToken));
    }

    #[test]
    fn test_different_secrets_reject() {
        let handler1 = JwtHandler::new("secret1");
        let handler2 = JwtHandler::new("secret2");

        let token = handler1.create_access_token("a@b.com").unwrap();
        assert_eq!(handler2.decode_access_token(&token), Err(InvalidToken));
    }

    #[test]
    fn test_expired_and_forged_look_the_same() {
        let handler = JwtHandler::new(SECRET);
        let other = JwtHandler::new("someone-else");

        let expired = handler
            .create_access_token_with_ttl("a@b.com", Duration::minutes(-1))
            .unwrap();
        let forged = other.create_access_token("a@b.com").unwrap();

        assert_eq!(
            handler.decode_access_token(&expired),
            handler.decode_access_token(&forged)
        );
    }

    #[test]
    fn test_token_without_subject_still_decodes() {
        let handler = JwtHandler::new(SECRET);
        let token = handler
            .sign(&Claims {
                sub: None,
                exp: Utc::now().timestamp() + 60,
            })
            .unwrap();

        let claims = handler.decode_access_token(&token).unwrap();
        assert_eq!(claims.subject(), None);
    }
}
