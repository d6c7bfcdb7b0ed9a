//! Votes API Main Entry Point
//!
//! Serves the vote endpoints over HTTP, backed by PostgreSQL or in-memory storage.

use dotenv::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use votes_api::config::create_cors_layer;
use votes_api::server::{self, state::AppState};
use votes_api::{AppConfig, Dependencies};

/// Initialize tracing/logging.
///
/// `LOG_FORMAT=json` switches to structured JSON output for log shippers.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("votes_api=info,votes_service=info,votes_repository=info,tower_http=info")
    });

    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();

        info!(
            service_name = "votes-api",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();

        info!(
            service_name = "votes-api",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    info!("Starting votes API");

    let config = AppConfig::from_env().inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    let deps = match Dependencies::new(&config).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e.into());
        }
    };

    let state = AppState::new(deps.service, config.identity_header.clone());
    let cors = create_cors_layer(&config.cors_allowed_origins, &config.identity_header);
    let app = server::create_app(state, cors);

    server::run_server(app, config.socket_addr()).await
}
