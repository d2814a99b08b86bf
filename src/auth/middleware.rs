//! Authentication Middleware
//! Mission: Resolve the caller before protected handlers run

use crate::auth::{error::AccessError, identity::IdentityResolver, models::Principal};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Token subject for routes that only need the caller's email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject(pub String);

/// Runs the full pipeline and stores the `Principal` in request extensions
pub async fn require_principal(
    State(resolver): State<IdentityResolver>,
    mut req: Request,
    next: Next,
) -> Result<Response, AccessError> {
    let principal = resolver.principal_from_headers(req.headers()).await?;
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Decodes the token only; stores a `Subject` without a storage read
pub async fn require_subject(
    State(resolver): State<IdentityResolver>,
    mut req: Request,
    next: Next,
) -> Result<Response, AccessError> {
    let subject = resolver.subject_from_headers(req.headers())?;
    req.extensions_mut().insert(Subject(subject));

    Ok(next.run(req).await)
}

/// Extract principal from request (use after `require_principal`)
pub fn extract_principal(req: &Request) -> Option<&Principal> {
    req.extensions().get::<Principal>()
}
