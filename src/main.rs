//! Scroll Focus Feed — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scroll_focus_feed::api::{self, AppState};
use scroll_focus_feed::content::ContentCatalog;
use scroll_focus_feed::metrics::Metrics;
use scroll_focus_feed::profile::StubProfileSource;
// Trait methods (`name`) resolve through these imports.
use scroll_focus_feed::{ContentSource, ProfileSource};
use scroll_focus_feed::query::{
    start_hot_reload_thread, QueryEngine, QueryRulesHandle, DEFAULT_QUERY_RULES_PATH,
    ENV_QUERY_RULES_PATH,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments. This enables
    // QUERY_RULES_PATH / PORT overrides from .env.
    let _ = dotenvy::dotenv();

    init_tracing();

    // --- Query interpreter rules ---
    let engine = QueryEngine::from_toml()?;
    let rules = QueryRulesHandle::new(engine);

    // If hot reload is enabled, spawn background watcher
    let rules_path = std::env::var(ENV_QUERY_RULES_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_QUERY_RULES_PATH));
    start_hot_reload_thread(rules.clone(), rules_path);

    // --- Content + profile sources ---
    let profiles = Arc::new(StubProfileSource::load_from_file("profile.json"));
    let catalog = Arc::new(ContentCatalog::load_from_file("content.json"));
    let metrics = Metrics::init(catalog.len());
    info!(
        profiles = profiles.name(),
        content = catalog.name(),
        catalog = catalog.len(),
        "sources wired"
    );

    let state = AppState::new(profiles, catalog, rules);
    let app = api::router(state).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
