// Framework bootstrap for the arcade server runtime.

use crate::domain::PuzzleSource;
use crate::domain::tuning::VariantCatalog;
use crate::frameworks::config;
use crate::interface_adapters::clients::puzzle::PuzzleClient;
use crate::interface_adapters::net::{
    command_handler, create_session_handler, delete_session_handler, get_session_handler,
    ws_handler,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{DriverSettings, SessionRegistry};

use axum::{
    Router,
    routing::{get, post},
};
use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/sessions", post(create_session_handler))
        .route(
            "/sessions/{id}",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/sessions/{id}/commands", post(command_handler))
        .with_state(state)
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state().await?;
    let registry = state.registry.clone();
    let app = router(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        });

    // Stop every session driver before the runtime goes away.
    registry.shutdown().await;
    tracing::info!("server stopped");
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

async fn load_catalog() -> Result<VariantCatalog> {
    let catalog = VariantCatalog::presets();
    let Some(path) = config::tuning_file() else {
        return Ok(catalog);
    };

    let text = tokio::fs::read_to_string(&path).await.inspect_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to read tuning file");
    })?;
    let catalog = catalog.with_overrides_toml(&text).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "invalid tuning file");
        std::io::Error::new(std::io::ErrorKind::InvalidData, e)
    })?;
    tracing::info!(path = %path.display(), "tuning overrides loaded");
    Ok(catalog)
}

async fn build_state() -> Result<Arc<AppState>> {
    let catalog = load_catalog().await?;

    let puzzles: Option<Arc<dyn PuzzleSource>> = match config::puzzle_api_url() {
        Some(url) => {
            let timeout = config::puzzle_fetch_timeout();
            let client = PuzzleClient::new(url, timeout).map_err(|e| {
                std::io::Error::other(format!("failed to initialize puzzle client: {e}"))
            })?;
            tracing::debug!(
                puzzle_api_url = %client.url(),
                puzzle_fetch_timeout_ms = timeout.as_millis(),
                "puzzle client configured"
            );
            Some(Arc::new(client))
        }
        None => {
            tracing::info!("no puzzle endpoint configured; using the built-in puzzle");
            None
        }
    };

    let settings = DriverSettings {
        command_channel_capacity: config::COMMAND_CHANNEL_CAPACITY,
        tick_interval: config::tick_interval(),
        countdown_interval: config::countdown_interval(),
    };
    tracing::debug!(
        tick_ms = settings.tick_interval.as_millis(),
        countdown_ms = settings.countdown_interval.as_millis(),
        "driver settings"
    );

    let registry = Arc::new(SessionRegistry::new(
        settings,
        catalog,
        puzzles,
        config::rng_seed(),
    ));

    Ok(Arc::new(AppState { registry }))
}
