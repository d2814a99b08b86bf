//! Authentication API Endpoints
//! Mission: Provide signup, login and credential management endpoints

use crate::api::{error::ApiError, AppState};
use crate::auth::{
    error::AccessError,
    middleware::Subject,
    models::{
        ChangePasswordRequest, LoginRequest, LoginResponse, Principal, SignupRequest, User,
        UserResponse,
    },
    password::{hash_password, verify_password},
    roles::Role,
};
use crate::store::ContentStore;
use anyhow::Result;
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

pub const MIN_PASSWORD_LEN: usize = 8;

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn validate_signup(payload: &SignupRequest) -> Result<String, ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::BadRequest("Username is required".into()));
    }
    let email = normalize_email(&payload.email);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
        _ => return Err(ApiError::BadRequest("Invalid email address".into())),
    }
    validate_password(&payload.password)?;
    Ok(email)
}

/// Signup endpoint - POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let email = validate_signup(&payload)?;

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let mut user = User::new(payload.username.trim(), &email, password_hash, Role::Reader);
    user.bio = payload.bio;
    user.profile_picture = payload.profile_picture;

    state.store.insert_user(&user).await?;
    info!("✅ User created: {} ({})", user.username, user.email);

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = normalize_email(&payload.email);
    info!("🔐 Login attempt: {}", email);

    let user = match state.store.find_user_by_email(&email).await? {
        Some(user) if verify_password(&payload.password, &user.password_hash) => user,
        _ => {
            warn!("❌ Failed login attempt: {}", email);
            return Err(ApiError::InvalidCredentials);
        }
    };

    if user.status.is_banned() {
        warn!("🚫 Login refused for banned account: {}", email);
        return Err(ApiError::AccountBanned);
    }

    let token = state.jwt.create_access_token(&user.email)?;
    info!("✅ User logged in: {}", user.email);

    Ok(Json(LoginResponse {
        token,
        token_type: "bearer",
        expires_in: state.jwt.ttl().num_seconds(),
        user: UserResponse::from_user(&user),
    }))
}

/// Current identity from the token alone - GET /api/auth/me
pub async fn me(Extension(Subject(email)): Extension<Subject>) -> Json<Value> {
    Json(json!({ "email": email }))
}

/// Change own password - PUT /api/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .store
        .find_user_by_id(principal.id)
        .await?
        .ok_or(AccessError::PrincipalNotFound)?;

    if !verify_password(&payload.old_password, &user.password_hash) {
        warn!("❌ Password change with wrong current password: {}", user.email);
        return Err(ApiError::InvalidCredentials);
    }
    validate_password(&payload.new_password)?;

    let password_hash = hash_password(&payload.new_password)?;
    state.store.set_password_hash(user.id, &password_hash).await?;
    info!("🔑 Password changed: {}", user.email);

    Ok(Json(json!({ "message": "Password updated" })))
}

/// Create an admin account with the given credentials unless the email is taken
pub async fn seed_admin(store: &dyn ContentStore, email: &str, password: &str) -> Result<bool> {
    let email = normalize_email(email);
    if store.find_user_by_email(&email).await?.is_some() {
        return Ok(false);
    }

    let username = email.split('@').next().unwrap_or("admin").to_string();
    let admin = User::new(&username, &email, hash_password(password)?, Role::Admin);
    store.insert_user(&admin).await?;

    info!("🔐 Seed admin created: {}", email);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn signup_request(email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            username: "ada".into(),
            email: email.into(),
            password: password.into(),
            bio: None,
            profile_picture: None,
        }
    }

    #[test]
    fn test_signup_validation() {
        assert_eq!(
            validate_signup(&signup_request("  Ada@Example.com ", "longenough")).unwrap(),
            "ada@example.com"
        );
        assert!(matches!(
            validate_signup(&signup_request("ada@example.com", "short")),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_signup(&signup_request("not-an-email", "longenough")),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_seed_admin_only_once() {
        let store = MemoryStore::new();
        assert!(seed_admin(&store, "root@example.com", "password123").await.unwrap());
        assert!(!seed_admin(&store, "root@example.com", "password123").await.unwrap());

        let admin = store
            .find_user_by_email("root@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(verify_password("password123", &admin.password_hash));
    }
}
