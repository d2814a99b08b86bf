//! Newsroom - collaborative article platform API
//! Mission: Serve articles, comments and engagement behind role-checked identities

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use newsroom_backend::{
    auth::{api::seed_admin, JwtHandler},
    build_app,
    generation::{ArticleGenerator, OpenAiGenerator},
    store::{ContentStore, MemoryStore, SqliteStore},
    AppState, Config,
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::parse();
    config.warn_insecure_defaults();

    info!("🚀 Newsroom API starting");

    let store: Arc<dyn ContentStore> = if config.memory {
        info!("📦 Using in-memory store (nothing is persisted)");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(SqliteStore::open(&config.database_path)?)
    };

    if let (Some(email), Some(password)) = (&config.seed_admin_email, &config.seed_admin_password) {
        seed_admin(store.as_ref(), email, password)
            .await
            .context("Failed to seed admin account")?;
    }

    let jwt = Arc::new(JwtHandler::new(&config.jwt_secret).with_ttl(config.token_ttl()));
    info!(
        "🔐 Authentication initialized (token ttl {}m)",
        config.token_ttl().num_minutes()
    );

    let generator: Option<Arc<dyn ArticleGenerator>> = match &config.openai_api_key {
        Some(key) if !key.is_empty() => {
            info!("🤖 Article generation enabled ({})", config.openai_model);
            Some(Arc::new(OpenAiGenerator::new(
                key,
                &config.openai_model,
                &config.openai_base_url,
            )?))
        }
        _ => {
            info!("🤖 OPENAI_API_KEY not set, article generation disabled");
            None
        }
    };

    let app = build_app(AppState::new(store, jwt, generator));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsroom_backend=debug,newsroom=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate's own .env when run from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
