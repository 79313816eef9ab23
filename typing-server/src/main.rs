//! # Typing SVG
//!
//! Serves animated typing cards over HTTP, or renders one to a file.

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use typing_core::RngSource;
use typing_server::cli::{Cli, Command, RenderArgs, ServeArgs};
use typing_server::{build_router, metrics, AppState};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,typing_server=debug,tower_http=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output (recommended for production).
/// Logs go to stderr so `render` can write the card to stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,typing_server=debug,tower_http=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    match Cli::parse().command {
        Command::Serve(args) => serve(args).await,
        Command::Render(args) => render(&args),
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let metrics_handle = metrics::init_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to initialize Prometheus metrics: {}", e))?;
    tracing::info!("Prometheus metrics initialized");

    let app = build_router(AppState::new(args.cache_max_age), Some(metrics_handle));

    let addr = args.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("Typing SVG server starting on http://{}", addr);
    tracing::info!("Try http://{}/api/typing?lines=Hello;World", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn render(args: &RenderArgs) -> anyhow::Result<()> {
    let params = args.typing_params();
    let config = params.config();
    let lines = params.lines();

    let svg = match args.seed {
        Some(seed) => typing_core::render_with(
            &config,
            &lines,
            &mut RngSource(StdRng::seed_from_u64(seed)),
        ),
        None => typing_core::render(&config, &lines),
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &svg)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = svg.len(), "card written");
        }
        None => std::io::stdout()
            .lock()
            .write_all(svg.as_bytes())
            .context("failed to write card to stdout")?,
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
