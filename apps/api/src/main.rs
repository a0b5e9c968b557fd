mod careers;
mod catalog;
mod clustering;
mod config;
mod embedding;
mod errors;
mod routes;
mod skills;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::careers::pipeline::CareerPipeline;
use crate::catalog::CareerCatalog;
use crate::clustering::partition::KMeansPartitioner;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Config first: a malformed variable stops startup before anything else runs
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillScope API v{}", env!("CARGO_PKG_VERSION"));

    let catalog = CareerCatalog::load(config.catalog_path.as_deref())?;
    info!(
        skills = catalog.skills.len(),
        rules = catalog.career_rules.len(),
        "Career catalog loaded"
    );
    let unreachable = catalog.unreachable_rule_skills();
    if !unreachable.is_empty() {
        warn!(
            "Career rule skills missing from the vocabulary, they can never be extracted: {}",
            unreachable.join(", ")
        );
    }

    let embedder = embedding::from_config(&config.embedding);
    info!(
        threshold = config.similarity_threshold,
        max_clusters = config.max_clusters,
        "Embedding backend: {}",
        embedder.name()
    );

    let pipeline = CareerPipeline::build(
        &config,
        &catalog,
        embedder,
        Arc::new(KMeansPartitioner::default()),
    )
    .await
    .context("failed to embed the skill vocabulary")?;

    let state = AppState {
        config: config.clone(),
        pipeline: Arc::new(pipeline),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
