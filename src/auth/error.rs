//! Access failures surfaced by identity resolution and guards

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use tracing::error;

/// Terminal, non-retriable access failures
#[derive(Debug)]
pub enum AccessError {
    /// Missing, malformed, forged or expired token, or no subject claim
    Unauthenticated,
    /// Token was valid but no account matches its subject
    PrincipalNotFound,
    /// Authenticated but lacking capability or ownership
    Forbidden,
    /// The identity lookup itself failed
    Storage(anyhow::Error),
}

impl AccessError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccessError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AccessError::PrincipalNotFound => StatusCode::NOT_FOUND,
            AccessError::Forbidden => StatusCode::FORBIDDEN,
            AccessError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::Unauthenticated => write!(f, "Authentication required"),
            AccessError::PrincipalNotFound => write!(f, "User not found"),
            AccessError::Forbidden => write!(f, "Insufficient permissions"),
            AccessError::Storage(_) => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for AccessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AccessError::Storage(e) => Some(&**e),
            _ => None,
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        if let AccessError::Storage(e) = &self {
            error!("Identity lookup failed: {:#}", e);
        }

        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
