use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use recursos_api::{app, config, AppContext};

#[derive(Parser)]
#[command(name = "recursos-api")]
#[command(about = "REST backend for clientes, proveedores, productos, pedidos and usuarios")]
#[command(version)]
struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Keep data in memory instead of Postgres")]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = ServeArgs::parse();

    let mut config = config::config().clone();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting recursos-api in {:?} mode", config.environment);

    let port = config.api.port;
    let ctx = AppContext::connect(config, args.memory)
        .await
        .context("failed to open the document store")?;
    ctx.prepare().await.context("failed to prepare collections")?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(ctx.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    ctx.shutdown().await;
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
