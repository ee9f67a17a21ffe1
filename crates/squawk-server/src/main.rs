mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use squawk_api::{AppState, AppStateInner, auth::seed_admin};
use squawk_db::Database;
use squawk_gen::{HttpGenerator, MarkovGenerator, TextGenerator};

use crate::config::Config;

/// Prefix match: `squawk` covers this binary and every `squawk_*` crate.
const DEFAULT_LOG_FILTER: &str = "squawk=debug,squawk_db=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Database::open(&config.db_path)?;
    if config.admin_password == "admin" {
        warn!("SQUAWK_ADMIN_PASSWORD not set; admin account uses the default password");
    }
    seed_admin(&db, &config.admin_password)?;

    let generator: Arc<dyn TextGenerator> = match (&config.generator_url, config.generator_seed) {
        (Some(url), _) => Arc::new(HttpGenerator::new(url.clone())),
        (None, Some(seed)) => Arc::new(MarkovGenerator::with_seed(seed)),
        (None, None) => Arc::new(MarkovGenerator::new()),
    };
    info!(
        "Using {} generator, {:?} tally policy",
        generator.name(),
        config.tally_policy
    );

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        generator,
        jwt_secret: config.jwt_secret.clone(),
        session_days: config.session_days,
        tally_policy: config.tally_policy,
    });

    let app = squawk_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address().parse()?;
    info!("Squawk server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
