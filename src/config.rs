//! Runtime configuration from flags and environment

use crate::auth::jwt::ACCESS_TOKEN_TTL_MINUTES;
use crate::generation::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

pub const DEV_JWT_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

#[derive(Parser, Debug, Clone)]
#[command(name = "newsroom")]
#[command(about = "Collaborative article platform API")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: String,

    /// SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = "newsroom.db")]
    pub database_path: PathBuf,

    /// Keep everything in memory (nothing survives a restart)
    #[arg(long, default_value = "false")]
    pub memory: bool,

    #[arg(long, env = "JWT_SECRET", default_value = DEV_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: String,

    /// Access token lifetime
    #[arg(long, env = "TOKEN_TTL_MINUTES", default_value_t = ACCESS_TOKEN_TTL_MINUTES)]
    pub token_ttl_minutes: i64,

    /// Enables POST /api/articles/generate when set
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_OPENAI_MODEL)]
    pub openai_model: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    pub openai_base_url: String,

    /// Admin account created at startup if missing
    #[arg(long, env = "SEED_ADMIN_EMAIL")]
    pub seed_admin_email: Option<String>,

    #[arg(long, env = "SEED_ADMIN_PASSWORD", hide_env_values = true)]
    pub seed_admin_password: Option<String>,
}

impl Config {
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_ttl_minutes.max(1))
    }

    /// Log anything that is fine for development but not for production
    pub fn warn_insecure_defaults(&self) {
        if self.jwt_secret == DEV_JWT_SECRET {
            warn!("⚠️  JWT_SECRET not set, using development secret. CHANGE IN PRODUCTION!");
        }
        if self.seed_admin_email.is_some() != self.seed_admin_password.is_some() {
            warn!("SEED_ADMIN_EMAIL and SEED_ADMIN_PASSWORD must be set together; skipping seed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["newsroom"]).unwrap();
        assert_eq!(config.token_ttl_minutes, 30);
        assert_eq!(config.token_ttl(), chrono::Duration::minutes(30));
        assert_eq!(config.openai_model, "gpt-4");
        assert!(!config.memory);
    }

    #[test]
    fn test_flags_override() {
        let config = Config::try_parse_from([
            "newsroom",
            "--memory",
            "--token-ttl-minutes",
            "5",
            "--bind-addr",
            "127.0.0.1:8080",
        ])
        .unwrap();
        assert!(config.memory);
        assert_eq!(config.token_ttl(), chrono::Duration::minutes(5));
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_ttl_never_zero() {
        let config =
            Config::try_parse_from(["newsroom", "--token-ttl-minutes", "0"]).unwrap();
        assert_eq!(config.token_ttl(), chrono::Duration::minutes(1));
    }
}
