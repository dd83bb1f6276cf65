//! treemux demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum (TraceLayer, TimeoutLayer)
//!                         │
//!                         ▼
//!                     Dispatcher ── resolve ──▶ trie (static > param > wildcard)
//!                         │
//!          ┌──────────────┼───────────────┬────────────────┐
//!          ▼              ▼               ▼                ▼
//!       Matched        Redirect    MethodNotAllowed     NotFound
//!   bind Params →     301/307/308    405 + Allow       not_found
//!   root chain →
//!   group chain →
//!   route chain →
//!   handler
//! ```

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Json;
use clap::Parser;
use serde_json::json;
use tokio::net::TcpListener;

use treemux::config::{load_config, AppConfig};
use treemux::http::{access_log, handler_fn, request_id, HttpServer};
use treemux::lifecycle::{signals, Shutdown};
use treemux::observability::logging;
use treemux::routing::{Dispatcher, Options, RequestParamsExt, RouteRegistrar};

#[derive(Parser)]
#[command(name = "treemux")]
#[command(about = "Demo server for the treemux routing core", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("treemux v0.1.0 starting");

    tracing::info!(
        bind_address = %config.server.bind_address,
        request_timeout_secs = config.server.request_timeout_secs,
        safe_add_routes_while_running = config.router.safe_add_routes_while_running,
        "Configuration loaded"
    );

    let dispatcher = build_dispatcher(&config)?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config.server.clone(), dispatcher);
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_dispatcher(config: &AppConfig) -> Result<Dispatcher, Box<dyn std::error::Error>> {
    let options = Options {
        config: config.router.clone(),
        not_found: Some(handler_fn(|req: Request<Body>| async move {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "not found", "path": req.uri().path() })),
            )
        })),
    };

    let mut dispatcher = Dispatcher::new(options)?;
    dispatcher.use_middleware([request_id(), access_log()]);

    dispatcher.get("/health", handler_fn(|_req| async { "ok" }), &[])?;

    let api = dispatcher.group("/api/v1")?;
    api.get(
        "/users/:id",
        handler_fn(|req: Request<Body>| async move { Json(json!({ "id": req.param("id") })) }),
        &[],
    )?;
    api.get(
        "/files/*path",
        handler_fn(|req: Request<Body>| async move { Json(json!({ "path": req.param("path") })) }),
        &[],
    )?;
    api.options(
        "/users",
        handler_fn(|_req| async { StatusCode::NO_CONTENT }),
        &[],
    )?;

    Ok(dispatcher)
}
