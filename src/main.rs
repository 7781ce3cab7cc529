use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use stay_pricing::api::{AppState, create_router};
use stay_pricing::booking::{CheckoutService, SandboxCollaborators};
use stay_pricing::config::ConfigLoader;

const DEFAULT_CONFIG_DIR: &str = "./config/rewak-studios";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_dir =
        env::var("STAY_PRICING_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let bind_addr = env::var("STAY_PRICING_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let webhook_secret = env::var("CARD_WEBHOOK_SECRET").ok();

    let config = Arc::new(
        ConfigLoader::load(&config_dir)
            .with_context(|| format!("failed to load property config from {}", config_dir))?,
    );
    tracing::info!(
        property = %config.property().code,
        rooms = config.config().rooms().len(),
        "Loaded property configuration"
    );

    if webhook_secret.as_deref().is_none_or(str::is_empty) {
        tracing::warn!("CARD_WEBHOOK_SECRET not set; card webhooks will be rejected");
    }

    // No live integrations yet; every collaborator runs in memory.
    let sandbox = SandboxCollaborators::new(config.clone());
    let checkout = CheckoutService::new(config, sandbox.collaborators());
    let router = create_router(AppState::new(checkout, webhook_secret));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!(addr = %bind_addr, "Listening");

    axum::serve(listener, router).await?;
    Ok(())
}
