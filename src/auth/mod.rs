//! Authentication Module
//! Mission: Credentials, roles, identity resolution and authorization guards

pub mod api;
pub mod error;
pub mod guards;
pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod roles;

pub use error::AccessError;
pub use guards::{authorize, require, Action};
pub use identity::IdentityResolver;
pub use jwt::JwtHandler;
pub use middleware::{require_principal, require_subject, Subject};
pub use models::Principal;
pub use roles::{capabilities_for, Capabilities, Capability, Role};
